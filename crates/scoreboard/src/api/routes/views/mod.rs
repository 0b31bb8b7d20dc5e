mod details;
mod games;
mod leaderboards;

pub use details::*;
pub use games::*;
pub use leaderboards::*;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use log::{debug, error, warn};
use maud::{html, Markup};
use serde::Deserialize;

use crate::{
    domain::Error,
    startup::AppState,
    templates::{
        components::view_gone,
        layouts::base::{base, PageConfig},
    },
};

/// Failure of a view request; only a missing view is not rendered as a notice
pub struct ViewError(pub Error);

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        match self.0 {
            Error::ViewNotFound(view_id) => {
                warn!("request for unknown view {}", view_id);
                (StatusCode::GONE, Html(view_gone().into_string())).into_response()
            }
            e => {
                error!("view request failed: {}", e);
                let body = html! {
                    div class="notification is-danger" {
                        button class="delete" onclick="this.parentElement.remove()" {}
                        "Something went wrong, please reload the page"
                    }
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Html(body.into_string())).into_response()
            }
        }
    }
}

impl From<Error> for ViewError {
    fn from(e: Error) -> Self {
        ViewError(e)
    }
}

/// Value of whichever creation form posted
#[derive(Debug, Deserialize)]
pub struct FormInput {
    #[serde(default, alias = "title", alias = "name", alias = "id")]
    pub value: String,
}

/// Errors the view already shows itself (inline form error, busy form)
fn log_handled(action: &str, result: Result<(), Error>) {
    if let Err(e) = result {
        debug!("{}: {}", action, e);
    }
}

/// Just the fragment for htmx, a full page when the url is opened directly
fn render_fragment(
    headers: &HeaderMap,
    state: &AppState,
    title: &str,
    content: Markup,
) -> Html<String> {
    let is_htmx = headers.get("HX-Request").is_some();

    if is_htmx {
        Html(content.into_string())
    } else {
        let config = PageConfig {
            title,
            api_base: &state.remote_url,
        };
        Html(base(&config, content).into_string())
    }
}

pub async fn unmount_view(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> StatusCode {
    match state.views.unmount(&view_id).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            debug!("unmount: {}", e);
            StatusCode::GONE
        }
    }
}
