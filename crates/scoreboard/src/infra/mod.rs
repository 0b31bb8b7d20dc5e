pub mod backend;
#[cfg(any(feature = "dev-backend", debug_assertions))]
pub mod backend_mock;

pub use backend::{BackendClient, Error as BackendError, GameApi};
#[cfg(any(feature = "dev-backend", debug_assertions))]
pub use backend_mock::InMemoryBackend;
#[cfg(test)]
pub mod mock_api;
