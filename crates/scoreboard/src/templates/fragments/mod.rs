pub mod creation_form;
pub mod game_details;
pub mod game_list;
pub mod leaderboard;

pub use creation_form::creation_form;
pub use game_details::game_details;
pub use game_list::{game_list, game_row};
pub use leaderboard::{leaderboard, leaderboard_row};

use reqwest_middleware::reqwest::Url;

/// Absolute shell path with every segment percent-encoded
pub fn encoded_path(segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return String::from("/");
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_string()
}
