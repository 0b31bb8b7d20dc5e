use axum::http::StatusCode;
use reqwest_middleware::reqwest::Url;
use scoreboard::GameApi;
use scoreboard_core::{CreateGame, CreatePlayer, GameStatus};
use serde_json::json;

use crate::helpers::{backend_client, init_logger, StubBackend};

#[tokio::test]
async fn create_game_posts_title_as_json() {
    init_logger();
    let stub = StubBackend::new();
    stub.respond(
        "POST",
        "/games",
        StatusCode::CREATED,
        r#"{"id": 7, "title": "Trivia Night", "status": "pending"}"#,
    )
    .await;
    let client = backend_client(&stub.serve().await);

    let game = client
        .create_game(CreateGame {
            title: String::from("Trivia Night"),
        })
        .await
        .expect("game created");

    assert_eq!(game.id, "7");
    assert_eq!(game.title, "Trivia Night");
    assert_eq!(game.status, GameStatus::Pending);
    assert_eq!(game.active_players, 0);

    let recorded = stub.recorded().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].path, "/games");
    assert_eq!(recorded[0].body, Some(json!({"title": "Trivia Night"})));
    assert_eq!(
        recorded[0].content_type.as_deref(),
        Some("application/json")
    );
}

#[tokio::test]
async fn every_operation_hits_its_endpoint() {
    init_logger();
    let stub = StubBackend::new();
    stub.respond("GET", "/games", StatusCode::OK, "[]").await;
    stub.respond(
        "GET",
        "/games/g1/details",
        StatusCode::OK,
        r#"{"game_id": "g1", "title": "Speed Chess", "status": "started", "popularity_index": null}"#,
    )
    .await;
    stub.respond("GET", "/leaderboard", StatusCode::OK, "[]").await;
    stub.respond("GET", "/leaderboard/games/g1", StatusCode::OK, "[]")
        .await;
    stub.respond(
        "POST",
        "/contestants/create",
        StatusCode::OK,
        r#"{"id": 12, "name": "alice"}"#,
    )
    .await;
    let client = backend_client(&stub.serve().await);

    client.list_games().await.expect("games listed");
    let details = client.game_details("g1").await.expect("details loaded");
    client.start_game("g1").await.expect("started");
    client.end_game("g1").await.expect("ended");
    client.global_leaderboard().await.expect("global leaderboard");
    client.game_leaderboard("g1").await.expect("game leaderboard");
    let player = client
        .create_player(CreatePlayer {
            name: String::from("alice"),
        })
        .await
        .expect("player created");
    client.join_game("g1", "12").await.expect("joined");
    client.exit_game("g1", "12").await.expect("exited");
    client.delete_player("12").await.expect("deleted");

    assert_eq!(details.game_id, "g1");
    assert_eq!(details.popularity_index, 0.0);
    assert_eq!(player.id, "12");
    assert_eq!(
        stub.calls().await,
        vec![
            "GET /games",
            "GET /games/g1/details",
            "PUT /games/g1/start",
            "PUT /games/g1/end",
            "GET /leaderboard",
            "GET /leaderboard/games/g1",
            "POST /contestants/create",
            "POST /games/g1/contestants/12/join",
            "PUT /games/g1/contestants/12/exit",
            "DELETE /contestants/12",
        ]
    );
    let recorded = stub.recorded().await;
    assert_eq!(recorded[6].body, Some(json!({"name": "alice"})));
    assert!(recorded
        .iter()
        .filter(|r| r.method != "POST" || r.path != "/contestants/create")
        .all(|r| r.body.is_none()));
}

#[tokio::test]
async fn transitions_ignore_response_body() {
    init_logger();
    let stub = StubBackend::new();
    stub.respond("PUT", "/games/g1/start", StatusCode::OK, "Game started")
        .await;
    let client = backend_client(&stub.serve().await);

    assert!(client.start_game("g1").await.is_ok());
}

#[tokio::test]
async fn non_success_status_is_reported_without_reading_body() {
    init_logger();
    let stub = StubBackend::new();
    stub.respond(
        "PUT",
        "/games/g1/end",
        StatusCode::CONFLICT,
        "game has not started",
    )
    .await;
    stub.respond("GET", "/games/missing/details", StatusCode::NOT_FOUND, "")
        .await;
    let client = backend_client(&stub.serve().await);

    let err = client.end_game("g1").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert!(!err.is_transport());

    let err = client.game_details("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    init_logger();
    let stub = StubBackend::new();
    stub.respond("GET", "/games", StatusCode::OK, "not json").await;
    let client = backend_client(&stub.serve().await);

    let err = client.list_games().await.unwrap_err();
    assert!(matches!(err, scoreboard::BackendError::Decode(_)));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    init_logger();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let client = backend_client(&Url::parse(&format!("http://{}", address)).unwrap());

    let err = client.list_games().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn ids_are_percent_encoded_and_base_prefix_kept() {
    init_logger();
    let stub = StubBackend::new();
    let base = stub.serve().await.join("/api/v1/").unwrap();
    let client = backend_client(&base);

    client.delete_player("a b/c").await.expect("deleted");

    assert_eq!(stub.calls().await, vec!["DELETE /api/v1/contestants/a%20b%2Fc"]);
}
