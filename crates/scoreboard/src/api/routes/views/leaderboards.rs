use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Html,
    Form,
};
use log::warn;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{log_handled, render_fragment, FormInput, ViewError};
use crate::{
    domain::{leaderboard, LeaderboardScope, LeaderboardView},
    startup::AppState,
    templates::fragments::leaderboard as leaderboard_fragment,
};

#[derive(Debug, Deserialize)]
pub struct ScopeInput {
    /// `global`, or `game` for the game the view was mounted for
    pub scope: String,
}

async fn render(view_id: &str, view: &Mutex<LeaderboardView>) -> Html<String> {
    Html(leaderboard_fragment(view_id, &*view.lock().await).into_string())
}

pub async fn leaderboard_view_fragment(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.leaderboard(&view_id).await?;
    leaderboard::sync(&view, state.api.as_ref()).await;
    let content = leaderboard_fragment(&view_id, &*view.lock().await);
    Ok(render_fragment(&headers, &state, "Leaderboard", content))
}

pub async fn leaderboard_refresh(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.leaderboard(&view_id).await?;
    leaderboard::refresh(&view, state.api.as_ref()).await;
    Ok(render(&view_id, &view).await)
}

pub async fn leaderboard_change_scope(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
    Form(input): Form<ScopeInput>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.leaderboard(&view_id).await?;
    let scope = {
        let view = view.lock().await;
        match input.scope.as_str() {
            "global" => Some(LeaderboardScope::Global),
            "game" => Some(view.home_scope().clone()),
            other => {
                warn!("unknown leaderboard scope {}", other);
                None
            }
        }
    };
    if let Some(scope) = scope {
        leaderboard::change_scope(&view, state.api.as_ref(), scope).await;
    }
    Ok(render(&view_id, &view).await)
}

pub async fn leaderboard_open_form(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.leaderboard(&view_id).await?;
    view.lock().await.open_form();
    Ok(render(&view_id, &view).await)
}

pub async fn leaderboard_close_form(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.leaderboard(&view_id).await?;
    view.lock().await.close_form();
    Ok(render(&view_id, &view).await)
}

pub async fn leaderboard_submit_form(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
    Form(input): Form<FormInput>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.leaderboard(&view_id).await?;
    log_handled(
        "leaderboard form",
        leaderboard::submit_form(&view, state.api.as_ref(), &input.value).await,
    );
    Ok(render(&view_id, &view).await)
}

pub async fn leaderboard_dismiss_form_error(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.leaderboard(&view_id).await?;
    view.lock().await.dismiss_form_error();
    Ok(render(&view_id, &view).await)
}

pub async fn leaderboard_remove_player(
    State(state): State<Arc<AppState>>,
    Path((view_id, player_id)): Path<(String, String)>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.leaderboard(&view_id).await?;
    leaderboard::remove_player(&view, state.api.as_ref(), &player_id).await;
    Ok(render(&view_id, &view).await)
}

pub async fn leaderboard_dismiss_notice(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.leaderboard(&view_id).await?;
    view.lock().await.dismiss_notice();
    Ok(render(&view_id, &view).await)
}
