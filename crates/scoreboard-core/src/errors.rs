//! Shared error types

use thiserror::Error;

/// Errors raised before anything is sent to the game API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Message is shown to the user as-is
    #[error("{0}")]
    Validation(String),
}
