use std::sync::Arc;

use maplit::hashmap;
use reqwest::StatusCode;
use scoreboard::{GameApi, InMemoryBackend, ViewSettings};
use scoreboard_core::CreateGame;

use crate::helpers::{spawn_app, view_ids, TestApp};

async fn seeded_app() -> (TestApp, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::seeded().await);
    let app = spawn_app(backend.clone(), ViewSettings::default()).await;
    (app, backend)
}

#[tokio::test]
async fn health_check_works() {
    let (app, _) = seeded_app().await;

    let response = app.get("/api/v1/health_check").await;

    assert!(response.status().is_success());
}

#[tokio::test]
async fn home_page_mounts_games_and_global_leaderboard() {
    let (app, backend) = seeded_app().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains("Trivia Night"));
    assert!(html.contains("Speed Chess"));
    assert!(html.contains("status-dot is-green"));
    assert!(html.contains("alice"));
    assert_eq!(view_ids(&html).len(), 2);
    assert_eq!(app.views.len().await, 2);

    let calls = backend.calls().await;
    assert!(calls.contains(&String::from("GET /games")));
    assert!(calls.contains(&String::from("GET /leaderboard")));
}

#[tokio::test]
async fn creating_a_game_adds_it_to_the_list() {
    let (app, backend) = seeded_app().await;
    let html = app.get("/").await.text().await.unwrap();
    let games_view = view_ids(&html)[0].clone();
    let base = format!("/views/games/{}", games_view);
    backend.clear_calls().await;

    let opened = app.post(&format!("{}/form/open", base)).await;
    let opened = opened.text().await.unwrap();
    assert!(opened.contains("Create New Game"));

    let response = app
        .post_form(&format!("{}/form", base), &hashmap! {"title" => "Pub Quiz"})
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains("Pub Quiz"));
    assert!(html.contains("Trivia Night"));
    assert!(html.contains("0 Players"));
    assert!(!html.contains("Create New Game"));
    assert_eq!(backend.calls().await, vec!["POST /games"]);
}

#[tokio::test]
async fn blank_title_never_reaches_the_api() {
    let (app, backend) = seeded_app().await;
    let html = app.get("/").await.text().await.unwrap();
    let base = format!("/views/games/{}", view_ids(&html)[0]);
    app.post(&format!("{}/form/open", base)).await;
    backend.clear_calls().await;

    let html = app
        .post_form(&format!("{}/form", base), &hashmap! {"title" => "   "})
        .await
        .text()
        .await
        .unwrap();

    assert!(html.contains("Title cannot be empty"));
    assert!(backend.calls().await.is_empty());
}

#[tokio::test]
async fn player_name_with_space_is_rejected_inline() {
    let (app, backend) = seeded_app().await;
    let html = app.get("/").await.text().await.unwrap();
    let base = format!("/views/leaderboards/{}", view_ids(&html)[1]);
    app.post(&format!("{}/form/open", base)).await;
    backend.clear_calls().await;

    let html = app
        .post_form(&format!("{}/form", base), &hashmap! {"name" => "al ice"})
        .await
        .text()
        .await
        .unwrap();

    assert!(html.contains("Name cannot contain spaces"));
    assert!(backend.calls().await.is_empty());

    let html = app
        .post(&format!("{}/form/error/dismiss", base))
        .await
        .text()
        .await
        .unwrap();
    assert!(!html.contains("Name cannot contain spaces"));
    assert!(html.contains("Create New Player"));
}

#[tokio::test]
async fn starting_a_game_shows_stop_control() {
    let (app, backend) = seeded_app().await;
    let game = backend
        .create_game(CreateGame {
            title: String::from("Pub Quiz"),
        })
        .await
        .unwrap();

    let html = app
        .get(&format!("/game/{}", game.id))
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Pub Quiz"));
    assert!(html.contains("Start"));
    let details_view = view_ids(&html)[0].clone();
    backend.clear_calls().await;

    let html = app
        .post(&format!("/views/details/{}/start", details_view))
        .await
        .text()
        .await
        .unwrap();

    assert!(html.contains(&format!("/views/details/{}/stop", details_view)));
    assert!(!html.contains(&format!("/views/details/{}/start", details_view)));
    assert_eq!(
        backend.calls().await,
        vec![format!("PUT /games/{}/start", game.id)]
    );
}

#[tokio::test]
async fn game_page_leaderboard_switches_scope() {
    let (app, backend) = seeded_app().await;
    let game = backend
        .create_game(CreateGame {
            title: String::from("Pub Quiz"),
        })
        .await
        .unwrap();
    let html = app
        .get(&format!("/game/{}", game.id))
        .await
        .text()
        .await
        .unwrap();
    assert!(!html.contains("alice"));
    let base = format!("/views/leaderboards/{}", view_ids(&html)[1]);

    let html = app
        .post_form(&format!("{}/scope", base), &hashmap! {"scope" => "global"})
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("alice"));
    assert!(html.contains("DELETE"));

    let html = app
        .post_form(&format!("{}/scope", base), &hashmap! {"scope" => "game"})
        .await
        .text()
        .await
        .unwrap();
    assert!(!html.contains("alice"));
}

#[tokio::test]
async fn api_outage_becomes_a_notice() {
    let (app, backend) = seeded_app().await;
    backend.set_unreachable(true);

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains("Failed to load games"));
    assert!(html.contains("Failed to load leaderboard"));
}

#[tokio::test]
async fn unknown_view_is_gone() {
    let (app, _) = seeded_app().await;

    let response = app.post("/views/games/not-a-view/form/open").await;
    assert_eq!(response.status(), StatusCode::GONE);

    let response = app
        .get("/views/leaderboards/0190b2a4-7c1e-7000-8000-000000000000")
        .await;
    assert_eq!(response.status(), StatusCode::GONE);
}

#[tokio::test]
async fn unmounted_view_stops_answering() {
    let (app, _) = seeded_app().await;
    let html = app.get("/").await.text().await.unwrap();
    let games_view = view_ids(&html)[0].clone();

    let response = app.post(&format!("/views/{}/unmount", games_view)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.views.len().await, 1);

    let response = app
        .post(&format!("/views/games/{}/form/open", games_view))
        .await;
    assert_eq!(response.status(), StatusCode::GONE);

    let response = app.post(&format!("/views/{}/unmount", games_view)).await;
    assert_eq!(response.status(), StatusCode::GONE);
}

#[tokio::test]
async fn views_of_the_same_page_are_independent() {
    let (app, _) = seeded_app().await;
    let first = app.get("/").await.text().await.unwrap();
    let second = app.get("/").await.text().await.unwrap();
    let first = format!("/views/games/{}", view_ids(&first)[0]);
    let second = format!("/views/games/{}", view_ids(&second)[0]);

    app.post(&format!("{}/form/open", first)).await;
    let html = app.get(&second).await.text().await.unwrap();

    assert!(!html.contains("Create New Game"));
    assert_eq!(app.views.len().await, 4);
}
