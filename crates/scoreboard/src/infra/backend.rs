use hyper::header::CONTENT_TYPE;
use log::{debug, error};
use mime::APPLICATION_JSON;
use reqwest_middleware::{
    self,
    reqwest::{Method, Response, StatusCode, Url},
    ClientWithMiddleware,
};
use scoreboard_core::{
    CreateGame, CreatePlayer, Game, GameDetails, LeaderboardEntry, Player,
};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("game api answered {status} to {context}")]
    Status { status: StatusCode, context: String },
    #[error("problem sending request to game api: {0}")]
    Send(#[from] reqwest_middleware::reqwest::Error),
    #[error("problem sending request to game api: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
    #[error("unexpected response body from game api: {0}")]
    Decode(String),
    #[error("invalid game api url: {0}")]
    Url(String),
}

impl Error {
    /// The request never got an HTTP answer
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Send(_) | Error::Middleware(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Every call the front end makes against the remote game API.
/// No retries, no caching: one call, one request.
#[async_trait::async_trait]
pub trait GameApi: Send + Sync {
    async fn list_games(&self) -> Result<Vec<Game>, Error>;
    async fn create_game(&self, game: CreateGame) -> Result<Game, Error>;
    async fn game_details(&self, game_id: &str) -> Result<GameDetails, Error>;
    async fn start_game(&self, game_id: &str) -> Result<(), Error>;
    async fn end_game(&self, game_id: &str) -> Result<(), Error>;
    async fn global_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, Error>;
    async fn game_leaderboard(&self, game_id: &str) -> Result<Vec<LeaderboardEntry>, Error>;
    async fn create_player(&self, player: CreatePlayer) -> Result<Player, Error>;
    async fn join_game(&self, game_id: &str, player_id: &str) -> Result<(), Error>;
    async fn exit_game(&self, game_id: &str, player_id: &str) -> Result<(), Error>;
    async fn delete_player(&self, player_id: &str) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct BackendClient {
    pub base_url: Url,
    pub client: ClientWithMiddleware,
}

impl BackendClient {
    pub fn new(client: ClientWithMiddleware, base_url: &Url) -> Self {
        Self {
            base_url: base_url.to_owned(),
            client,
        }
    }

    /// Appends percent-encoded path segments to the base url, keeping any prefix it has
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_request_internal(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        context: &str,
    ) -> Result<Response, Error> {
        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, APPLICATION_JSON.to_string());

        if let Some(b) = body {
            request = request.body(b);
        }

        let response = request.send().await.map_err(|e| {
            error!("error sending to game api: {}", e);
            Error::Middleware(e)
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            // failure bodies are never shown to the user
            debug!("game api answered {} to {}", status, context);
            Err(Error::Status {
                status,
                context: context.to_owned(),
            })
        }
    }

    pub async fn send_request<T>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        context: &str,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let response = self
            .send_request_internal(method, url, body, context)
            .await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(|e| {
            error!("failed to decode response to {}: {}", context, e);
            Error::Decode(e.to_string())
        })
    }

    pub async fn send_request_ignore_body(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        context: &str,
    ) -> Result<(), Error> {
        self.send_request_internal(method, url, body, context)
            .await?;

        Ok(())
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(value).map_err(|e| Error::Decode(format!("failed to serialize: {}", e)))
}

#[async_trait::async_trait]
impl GameApi for BackendClient {
    async fn list_games(&self) -> Result<Vec<Game>, Error> {
        let url = self.endpoint(&["games"])?;
        self.send_request(Method::GET, url, None, "list games")
            .await
    }

    async fn create_game(&self, game: CreateGame) -> Result<Game, Error> {
        debug!("creating game: {:?}", game);
        let url = self.endpoint(&["games"])?;
        let body = to_body(&game)?;
        self.send_request(Method::POST, url, Some(body), "create game")
            .await
    }

    async fn game_details(&self, game_id: &str) -> Result<GameDetails, Error> {
        let url = self.endpoint(&["games", game_id, "details"])?;
        self.send_request(Method::GET, url, None, "game details")
            .await
    }

    async fn start_game(&self, game_id: &str) -> Result<(), Error> {
        let url = self.endpoint(&["games", game_id, "start"])?;
        self.send_request_ignore_body(Method::PUT, url, None, "start game")
            .await
    }

    async fn end_game(&self, game_id: &str) -> Result<(), Error> {
        let url = self.endpoint(&["games", game_id, "end"])?;
        self.send_request_ignore_body(Method::PUT, url, None, "end game")
            .await
    }

    async fn global_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, Error> {
        let url = self.endpoint(&["leaderboard"])?;
        self.send_request(Method::GET, url, None, "global leaderboard")
            .await
    }

    async fn game_leaderboard(&self, game_id: &str) -> Result<Vec<LeaderboardEntry>, Error> {
        let url = self.endpoint(&["leaderboard", "games", game_id])?;
        self.send_request(Method::GET, url, None, "game leaderboard")
            .await
    }

    async fn create_player(&self, player: CreatePlayer) -> Result<Player, Error> {
        debug!("creating player: {:?}", player);
        let url = self.endpoint(&["contestants", "create"])?;
        let body = to_body(&player)?;
        self.send_request(Method::POST, url, Some(body), "create player")
            .await
    }

    async fn join_game(&self, game_id: &str, player_id: &str) -> Result<(), Error> {
        let url = self.endpoint(&["games", game_id, "contestants", player_id, "join"])?;
        self.send_request_ignore_body(Method::POST, url, None, "join game")
            .await
    }

    async fn exit_game(&self, game_id: &str, player_id: &str) -> Result<(), Error> {
        let url = self.endpoint(&["games", game_id, "contestants", player_id, "exit"])?;
        self.send_request_ignore_body(Method::PUT, url, None, "exit game")
            .await
    }

    async fn delete_player(&self, player_id: &str) -> Result<(), Error> {
        let url = self.endpoint(&["contestants", player_id])?;
        self.send_request_ignore_body(Method::DELETE, url, None, "delete player")
            .await
    }
}
