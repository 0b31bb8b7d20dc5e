use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Html,
};
use log::warn;
use scoreboard_core::Transition;
use tokio::sync::Mutex;

use super::{render_fragment, ViewError};
use crate::{
    domain::{game_detail, Error, GameDetailView},
    startup::AppState,
    templates::fragments::game_details,
};

async fn render(view_id: &str, view: &Mutex<GameDetailView>) -> Html<String> {
    Html(game_details(view_id, &*view.lock().await).into_string())
}

pub async fn details_fragment(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.details(&view_id).await?;
    game_detail::sync(&view, state.api.as_ref()).await;
    let content = game_details(&view_id, &*view.lock().await);
    Ok(render_fragment(&headers, &state, "Game", content))
}

async fn run_transition(
    state: &AppState,
    view_id: &str,
    transition: Transition,
) -> Result<Html<String>, ViewError> {
    let view = state.views.details(view_id).await?;
    match game_detail::transition(
        &view,
        state.api.as_ref(),
        transition,
        state.view_settings.reconcile_after_transition,
    )
    .await
    {
        Ok(()) => {}
        // the rendered controls already reflect what is allowed
        Err(e @ (Error::TransitionUnavailable(..) | Error::TransitionInFlight)) => {
            warn!("view {}: {}", view_id, e);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(render(view_id, &view).await)
}

pub async fn details_start(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    run_transition(&state, &view_id, Transition::Start).await
}

pub async fn details_stop(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    run_transition(&state, &view_id, Transition::End).await
}

pub async fn details_dismiss_notice(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.details(&view_id).await?;
    view.lock().await.dismiss_notice();
    Ok(render(&view_id, &view).await)
}
