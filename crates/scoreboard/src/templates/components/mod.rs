mod navbar;
mod notice;

pub use navbar::navbar;
pub use notice::{notice, view_gone};
