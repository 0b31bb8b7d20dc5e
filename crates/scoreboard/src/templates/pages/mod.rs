pub mod game;
pub mod home;

pub use game::game_page;
pub use home::home_page;
