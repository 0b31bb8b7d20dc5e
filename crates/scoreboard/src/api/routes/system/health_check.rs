use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use log::debug;

use crate::startup::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> StatusCode {
    debug!("health check, {} views mounted", state.views.len().await);
    StatusCode::OK
}
