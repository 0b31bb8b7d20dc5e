//! scoreboard-core: Wire types for the remote game API
//!
//! Games, contestants and leaderboard rows as the API returns them, the game
//! status lifecycle, and the local validation run before any form is submitted.

pub mod errors;
pub mod types;
pub mod validation;

pub use errors::*;
pub use types::*;
pub use validation::*;
