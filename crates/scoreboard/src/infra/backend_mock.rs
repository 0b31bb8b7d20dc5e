use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use reqwest_middleware::reqwest::StatusCode;
use scoreboard_core::{
    CreateGame, CreatePlayer, Game, GameDetails, GameStatus, LeaderboardEntry, Player,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};
use tokio::sync::RwLock;

use super::backend::{Error, GameApi};

const LEADERBOARD_LIMIT: usize = 100;
/// Oldest calls are forgotten past this many
const CALL_LOG_LIMIT: usize = 1000;

struct GameRecord {
    title: String,
    status: GameStatus,
    started_at: Option<String>,
    ended_at: Option<String>,
}

struct Session {
    game_id: u64,
    contestant_id: u64,
    score: f64,
    upvotes: u64,
    exited: bool,
}

#[derive(Default)]
struct State {
    next_id: u64,
    games: BTreeMap<u64, GameRecord>,
    contestants: BTreeMap<u64, String>,
    sessions: Vec<Session>,
    calls: VecDeque<String>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn active_players(&self, game_id: u64) -> u64 {
        self.sessions
            .iter()
            .filter(|s| s.game_id == game_id && !s.exited)
            .count() as u64
    }

    fn upvotes(&self, game_id: u64) -> u64 {
        self.sessions
            .iter()
            .filter(|s| s.game_id == game_id)
            .map(|s| s.upvotes)
            .sum()
    }

    fn game_id(&self, raw: &str) -> Result<u64, Error> {
        raw.parse::<u64>()
            .ok()
            .filter(|id| self.games.contains_key(id))
            .ok_or_else(|| status(StatusCode::NOT_FOUND, "game not found"))
    }

    fn contestant_id(&self, raw: &str) -> Result<u64, Error> {
        raw.parse::<u64>()
            .ok()
            .filter(|id| self.contestants.contains_key(id))
            .ok_or_else(|| status(StatusCode::NOT_FOUND, "contestant not found"))
    }
}

fn status(status: StatusCode, context: &str) -> Error {
    Error::Status {
        status,
        context: context.to_owned(),
    }
}

fn now() -> String {
    OffsetDateTime::now_utc()
        .format(&Iso8601::DEFAULT)
        .unwrap_or_default()
}

/// In-process stand-in for the remote game API.
///
/// Follows the same rules as the real service: games only accept players while
/// started, start/end only from pending/started, names and titles are unique,
/// unknown ids answer 404. The latest calls are recorded as `METHOD /path`.
#[derive(Default)]
pub struct InMemoryBackend {
    state: RwLock<State>,
    unreachable: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A few games and players so a fresh dev server has something to show
    pub async fn seeded() -> Self {
        let backend = Self::new();
        let mut state = backend.state.write().await;
        let trivia = state.next_id();
        state.games.insert(
            trivia,
            GameRecord {
                title: String::from("Trivia Night"),
                status: GameStatus::Started,
                started_at: Some(now()),
                ended_at: None,
            },
        );
        let chess = state.next_id();
        state.games.insert(
            chess,
            GameRecord {
                title: String::from("Speed Chess"),
                status: GameStatus::Pending,
                started_at: None,
                ended_at: None,
            },
        );
        for (name, score) in [("alice", 42.0), ("bob", 17.5), ("carol", 30.0)] {
            let id = state.next_id();
            state.contestants.insert(id, name.to_string());
            state.sessions.push(Session {
                game_id: trivia,
                contestant_id: id,
                score,
                upvotes: 1,
                exited: false,
            });
        }
        drop(state);
        backend
    }

    /// Simulate the API being down: every call fails before reaching it
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Calls seen so far, oldest first
    pub async fn calls(&self) -> Vec<String> {
        self.state.read().await.calls.iter().cloned().collect()
    }

    pub async fn clear_calls(&self) {
        self.state.write().await.calls.clear();
    }

    /// Scores are written by game servers, not by this front end
    pub async fn record_score(
        &self,
        game_id: &str,
        player_id: &str,
        score: f64,
    ) -> Result<(), Error> {
        let mut state = self.state.write().await;
        let game_id = state.game_id(game_id)?;
        let contestant_id = state.contestant_id(player_id)?;
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.game_id == game_id && s.contestant_id == contestant_id)
            .ok_or_else(|| status(StatusCode::NOT_FOUND, "contestant not in this game"))?;
        session.score = score;
        Ok(())
    }

    async fn begin(&self, call: String) -> Result<tokio::sync::RwLockWriteGuard<'_, State>, Error> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::Middleware(reqwest_middleware::Error::Middleware(
                anyhow::anyhow!("connection refused: {}", call),
            )));
        }
        let mut state = self.state.write().await;
        if state.calls.len() == CALL_LOG_LIMIT {
            state.calls.pop_front();
        }
        state.calls.push_back(call);
        Ok(state)
    }
}

#[async_trait]
impl GameApi for InMemoryBackend {
    async fn list_games(&self) -> Result<Vec<Game>, Error> {
        let state = self.begin(String::from("GET /games")).await?;
        let mut games: Vec<Game> = state
            .games
            .iter()
            .map(|(id, game)| Game {
                id: id.to_string(),
                title: game.title.clone(),
                status: game.status,
                active_players: state.active_players(*id),
                popularity_index: None,
            })
            .collect();
        games.sort_by_key(|game| {
            let priority = match game.status {
                GameStatus::Started => 0,
                GameStatus::Pending => 1,
                GameStatus::Ended => 2,
                GameStatus::Unknown => 3,
            };
            (priority, game.active_players)
        });
        Ok(games)
    }

    async fn create_game(&self, game: CreateGame) -> Result<Game, Error> {
        let mut state = self.begin(String::from("POST /games")).await?;
        if state.games.values().any(|g| g.title == game.title) {
            return Err(status(StatusCode::BAD_REQUEST, "create game"));
        }
        let id = state.next_id();
        state.games.insert(
            id,
            GameRecord {
                title: game.title.clone(),
                status: GameStatus::Pending,
                started_at: None,
                ended_at: None,
            },
        );
        Ok(Game {
            id: id.to_string(),
            title: game.title,
            status: GameStatus::Pending,
            active_players: 0,
            popularity_index: None,
        })
    }

    async fn game_details(&self, game_id: &str) -> Result<GameDetails, Error> {
        let state = self.begin(format!("GET /games/{}/details", game_id)).await?;
        let id = state.game_id(game_id)?;
        let game = &state.games[&id];

        let w2 = state.active_players(id) as f64;
        let w3 = state.upvotes(id) as f64;
        let max_w2 = state
            .games
            .keys()
            .map(|g| state.active_players(*g))
            .max()
            .filter(|max| *max > 0)
            .unwrap_or(1) as f64;
        let max_w3 = state
            .games
            .keys()
            .map(|g| state.upvotes(*g))
            .max()
            .filter(|max| *max > 0)
            .unwrap_or(1) as f64;
        // no clock history here, so the "yesterday" terms stay at zero
        let popularity_index = 0.2 * (w2 / max_w2) + 0.25 * (w3 / max_w3);

        Ok(GameDetails {
            game_id: id.to_string(),
            title: game.title.clone(),
            status: game.status,
            started_at: game.started_at.clone(),
            ended_at: game.ended_at.clone(),
            w1: 0.0,
            w2,
            w3,
            w4: 0.0,
            w5: 0.0,
            popularity_index: (popularity_index * 10_000.0).round() / 10_000.0,
        })
    }

    async fn start_game(&self, game_id: &str) -> Result<(), Error> {
        let mut state = self.begin(format!("PUT /games/{}/start", game_id)).await?;
        let id = state.game_id(game_id)?;
        let game = state
            .games
            .get_mut(&id)
            .ok_or_else(|| status(StatusCode::NOT_FOUND, "game not found"))?;
        if game.status != GameStatus::Pending {
            return Err(status(StatusCode::BAD_REQUEST, "start game"));
        }
        game.status = GameStatus::Started;
        game.started_at = Some(now());
        Ok(())
    }

    async fn end_game(&self, game_id: &str) -> Result<(), Error> {
        let mut state = self.begin(format!("PUT /games/{}/end", game_id)).await?;
        let id = state.game_id(game_id)?;
        let game = state
            .games
            .get_mut(&id)
            .ok_or_else(|| status(StatusCode::NOT_FOUND, "game not found"))?;
        if game.status != GameStatus::Started {
            return Err(status(StatusCode::BAD_REQUEST, "end game"));
        }
        game.status = GameStatus::Ended;
        game.ended_at = Some(now());
        Ok(())
    }

    async fn global_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, Error> {
        let state = self.begin(String::from("GET /leaderboard")).await?;
        let mut totals: HashMap<u64, f64> = HashMap::new();
        for session in &state.sessions {
            *totals.entry(session.contestant_id).or_default() += session.score;
        }
        let mut rows: Vec<LeaderboardEntry> = totals
            .into_iter()
            .filter_map(|(id, score)| {
                state.contestants.get(&id).map(|name| LeaderboardEntry {
                    id: id.to_string(),
                    name: name.clone(),
                    score,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        rows.truncate(LEADERBOARD_LIMIT);
        Ok(rows)
    }

    async fn game_leaderboard(&self, game_id: &str) -> Result<Vec<LeaderboardEntry>, Error> {
        let state = self
            .begin(format!("GET /leaderboard/games/{}", game_id))
            .await?;
        // unknown games just have an empty board
        let Ok(id) = game_id.parse::<u64>() else {
            return Ok(vec![]);
        };
        let mut rows: Vec<LeaderboardEntry> = state
            .sessions
            .iter()
            .filter(|s| s.game_id == id && !s.exited)
            .filter_map(|s| {
                state.contestants.get(&s.contestant_id).map(|name| LeaderboardEntry {
                    id: s.contestant_id.to_string(),
                    name: name.clone(),
                    score: s.score,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.score.total_cmp(&a.score));
        rows.truncate(LEADERBOARD_LIMIT);
        Ok(rows)
    }

    async fn create_player(&self, player: CreatePlayer) -> Result<Player, Error> {
        let mut state = self.begin(String::from("POST /contestants/create")).await?;
        if state.contestants.values().any(|name| *name == player.name) {
            return Err(status(StatusCode::BAD_REQUEST, "create player"));
        }
        let id = state.next_id();
        state.contestants.insert(id, player.name.clone());
        Ok(Player {
            id: id.to_string(),
            name: player.name,
        })
    }

    async fn join_game(&self, game_id: &str, player_id: &str) -> Result<(), Error> {
        let mut state = self
            .begin(format!(
                "POST /games/{}/contestants/{}/join",
                game_id, player_id
            ))
            .await?;
        let game_id = state.game_id(game_id)?;
        let contestant_id = state.contestant_id(player_id)?;
        if state.games[&game_id].status != GameStatus::Started {
            return Err(status(StatusCode::BAD_REQUEST, "game can not be joined"));
        }
        state.sessions.push(Session {
            game_id,
            contestant_id,
            score: 0.0,
            upvotes: 0,
            exited: false,
        });
        Ok(())
    }

    async fn exit_game(&self, game_id: &str, player_id: &str) -> Result<(), Error> {
        let mut state = self
            .begin(format!(
                "PUT /games/{}/contestants/{}/exit",
                game_id, player_id
            ))
            .await?;
        let (Ok(game_id), Ok(contestant_id)) = (game_id.parse::<u64>(), player_id.parse::<u64>())
        else {
            return Err(status(StatusCode::NOT_FOUND, "contestant not in this game"));
        };
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.game_id == game_id && s.contestant_id == contestant_id)
            .ok_or_else(|| status(StatusCode::NOT_FOUND, "contestant not in this game"))?;
        session.exited = true;
        Ok(())
    }

    async fn delete_player(&self, player_id: &str) -> Result<(), Error> {
        let mut state = self
            .begin(format!("DELETE /contestants/{}", player_id))
            .await?;
        let id = state.contestant_id(player_id)?;
        state.contestants.remove(&id);
        state.sessions.retain(|s| s.contestant_id != id);
        Ok(())
    }
}
