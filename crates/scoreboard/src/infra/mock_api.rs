use async_trait::async_trait;
use mockall::mock;
use scoreboard_core::{CreateGame, CreatePlayer, Game, GameDetails, LeaderboardEntry, Player};

use super::backend::{Error, GameApi};

mock! {
    pub GameApi {}
    #[async_trait]
    impl GameApi for GameApi {
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
}
