mod forms;
pub mod game_detail;
pub mod game_list;
pub mod leaderboard;
mod notice;
mod snapshot;
mod views;

pub use forms::*;
pub use game_detail::{GameDetailView, PendingTransition};
pub use game_list::GameListView;
pub use leaderboard::{LeaderboardFetch, LeaderboardScope, LeaderboardView, Removal};
pub use notice::*;
pub use snapshot::*;
pub use views::*;

use scoreboard_core::{CoreError, Transition};
use thiserror::Error;

use crate::infra::BackendError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] CoreError),
    #[error("{0}")]
    Backend(#[from] BackendError),
    #[error("cannot {0} a game that is {1}")]
    TransitionUnavailable(Transition, String),
    #[error("a status change is already in flight")]
    TransitionInFlight,
    #[error("no form is open")]
    FormNotOpen,
    #[error("form is already submitting")]
    FormBusy,
    #[error("view not found: {0}")]
    ViewNotFound(String),
}
