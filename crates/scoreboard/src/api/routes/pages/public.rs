use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Html,
};
use log::info;

use crate::{
    domain::{game_detail, game_list, leaderboard, LeaderboardScope},
    startup::AppState,
    templates::{
        fragments::{
            game_details, game_list as game_list_fragment, leaderboard as leaderboard_fragment,
        },
        layouts::base::{base, PageConfig},
        pages::{game_page, home_page},
    },
};

/// List page: mounts a game list and the global leaderboard
pub async fn home_page_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let api = state.api.as_ref();
    let (games_id, games) = state.views.mount_games().await;
    let (board_id, board) = state.views.mount_leaderboard(LeaderboardScope::Global).await;
    info!("mounted list page views {} and {}", games_id, board_id);

    tokio::join!(game_list::sync(&games, api), leaderboard::sync(&board, api));

    let content = home_page(
        game_list_fragment(&games_id.to_string(), &*games.lock().await),
        leaderboard_fragment(&board_id.to_string(), &*board.lock().await),
    );
    let config = PageConfig {
        title: "Scoreboard",
        api_base: &state.remote_url,
    };
    Html(base(&config, content).into_string())
}

/// Detail page: mounts one game's details and its leaderboard
pub async fn game_page_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Html<String> {
    let api = state.api.as_ref();
    let (details_id, details) = state.views.mount_details(&game_id).await;
    let (board_id, board) = state
        .views
        .mount_leaderboard(LeaderboardScope::Game(game_id.clone()))
        .await;
    info!(
        "mounted game page views {} and {} for game {}",
        details_id, board_id, game_id
    );

    tokio::join!(
        game_detail::sync(&details, api),
        leaderboard::sync(&board, api)
    );

    let details = details.lock().await;
    let title = details
        .details()
        .map(|d| d.title.clone())
        .unwrap_or_else(|| String::from("Game"));
    let content = game_page(
        game_details(&details_id.to_string(), &details),
        leaderboard_fragment(&board_id.to_string(), &*board.lock().await),
    );
    let config = PageConfig {
        title: &title,
        api_base: &state.remote_url,
    };
    Html(base(&config, content).into_string())
}
