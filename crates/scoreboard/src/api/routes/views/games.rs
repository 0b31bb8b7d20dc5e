use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Html,
    Form,
};
use tokio::sync::Mutex;

use super::{log_handled, render_fragment, FormInput, ViewError};
use crate::{
    domain::{game_list, GameListView},
    startup::AppState,
    templates::fragments::game_list as game_list_fragment,
};

async fn render(view_id: &str, view: &Mutex<GameListView>) -> Html<String> {
    Html(game_list_fragment(view_id, &*view.lock().await).into_string())
}

pub async fn games_fragment(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.games(&view_id).await?;
    game_list::sync(&view, state.api.as_ref()).await;
    let content = game_list_fragment(&view_id, &*view.lock().await);
    Ok(render_fragment(&headers, &state, "Games", content))
}

pub async fn games_open_form(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.games(&view_id).await?;
    view.lock().await.open_form();
    Ok(render(&view_id, &view).await)
}

pub async fn games_close_form(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.games(&view_id).await?;
    view.lock().await.close_form();
    Ok(render(&view_id, &view).await)
}

pub async fn games_submit_form(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
    Form(input): Form<FormInput>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.games(&view_id).await?;
    log_handled(
        "create game",
        game_list::submit_form(&view, state.api.as_ref(), &input.value).await,
    );
    Ok(render(&view_id, &view).await)
}

pub async fn games_dismiss_form_error(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.games(&view_id).await?;
    view.lock().await.dismiss_form_error();
    Ok(render(&view_id, &view).await)
}

pub async fn games_dismiss_notice(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let view = state.views.games(&view_id).await?;
    view.lock().await.dismiss_notice();
    Ok(render(&view_id, &view).await)
}
