use maud::{html, Markup};

/// Game list beside the global leaderboard
pub fn home_page(game_list: Markup, leaderboard: Markup) -> Markup {
    html! {
        div class="columns" {
            div class="column is-half" {
                (game_list)
            }
            div class="column is-half" {
                (leaderboard)
            }
        }
    }
}
