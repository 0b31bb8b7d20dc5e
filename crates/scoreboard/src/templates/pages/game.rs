use maud::{html, Markup};

/// One game's details beside its leaderboard
pub fn game_page(details: Markup, leaderboard: Markup) -> Markup {
    html! {
        a class="button is-small is-light mb-4" href="/" { "← All games" }
        div class="columns" {
            div class="column is-half" {
                (details)
            }
            div class="column is-half" {
                (leaderboard)
            }
        }
    }
}
