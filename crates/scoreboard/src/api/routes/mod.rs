pub mod pages;
pub mod system;
pub mod views;

pub use pages::*;
pub use system::*;
pub use views::*;
