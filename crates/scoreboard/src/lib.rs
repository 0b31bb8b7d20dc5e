pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod startup;
pub mod templates;

pub use api::routes::*;
pub use config::*;
pub use domain::{
    Error as DomainError, GameDetailView, GameListView, LeaderboardScope, LeaderboardView,
    ViewRegistry,
};
pub use infra::{BackendClient, BackendError, GameApi};
#[cfg(any(feature = "dev-backend", debug_assertions))]
pub use infra::InMemoryBackend;
pub use startup::*;
