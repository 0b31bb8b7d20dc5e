use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lifecycle of a game as reported by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Pending,
    Started,
    Ended,
    /// Anything the API sends that we don't know about; rendered like pending, no actions
    #[serde(other)]
    Unknown,
}

impl GameStatus {
    /// The one transition a game in this status can take, if any
    pub fn transition(self) -> Option<Transition> {
        match self {
            GameStatus::Pending => Some(Transition::Start),
            GameStatus::Started => Some(Transition::End),
            GameStatus::Ended | GameStatus::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Pending => "pending",
            GameStatus::Started => "started",
            GameStatus::Ended => "ended",
            GameStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit status change requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Start,
    End,
}

impl Transition {
    /// Status a game must be in for this transition to be offered
    pub fn from_status(self) -> GameStatus {
        match self {
            Transition::Start => GameStatus::Pending,
            Transition::End => GameStatus::Started,
        }
    }

    /// Status the game ends up in once the transition went through
    pub fn target(self) -> GameStatus {
        match self {
            Transition::Start => GameStatus::Started,
            Transition::End => GameStatus::Ended,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Start => write!(f, "start"),
            Transition::End => write!(f, "end"),
        }
    }
}

/// Game as listed by `GET /games` and returned by `POST /games`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: GameStatus,
    /// Missing from the create response, a new game has nobody in it
    #[serde(default)]
    pub active_players: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity_index: Option<f64>,
}

/// Single game record from `GET /games/{id}/details`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetails {
    #[serde(alias = "id", deserialize_with = "opaque_id")]
    pub game_id: String,
    pub title: String,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    /// Distinct players yesterday
    #[serde(default)]
    pub w1: f64,
    /// Players in the game right now
    #[serde(default)]
    pub w2: f64,
    /// Upvotes across all sessions
    #[serde(default)]
    pub w3: f64,
    /// Longest session yesterday, in seconds
    #[serde(default)]
    pub w4: f64,
    /// Sessions played yesterday
    #[serde(default)]
    pub w5: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub popularity_index: f64,
}

impl GameDetails {
    pub fn active_players(&self) -> u64 {
        self.w2.max(0.0) as u64
    }

    pub fn upvotes(&self) -> u64 {
        self.w3.max(0.0) as u64
    }
}

/// Contestant as returned by `POST /contestants/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub name: String,
}

/// One row of a global or per-game leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGame {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlayer {
    pub name: String,
}

/// Ids are opaque to us, but the API hands out integers
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl serde::de::Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or integer id")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}
