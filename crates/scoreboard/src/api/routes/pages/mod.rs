mod public;

pub use public::*;
