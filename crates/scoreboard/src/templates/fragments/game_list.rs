use maud::{html, Markup};
use scoreboard_core::{Game, GameStatus};

use crate::{domain::GameListView, templates::components::notice};

use super::{creation_form, encoded_path};

pub fn status_dot_class(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Started => "status-dot is-green",
        GameStatus::Ended => "status-dot is-red",
        GameStatus::Pending | GameStatus::Unknown => "status-dot is-gray",
    }
}

/// Game list view, swapped as a whole by every control inside it
pub fn game_list(view_id: &str, view: &GameListView) -> Markup {
    let base_url = format!("/views/games/{}", view_id);
    let target = format!("#games-{}", view_id);
    html! {
        div id=(format!("games-{}", view_id)) class="box" data-view-id=(view_id) {
            div class="level" {
                div class="level-left" {
                    h4 class="title is-4" { "Games" }
                }
                div class="level-right" {
                    @if view.form().is_none() {
                        button class="button is-primary"
                               hx-post=(format!("{}/form/open", base_url))
                               hx-target=(target)
                               hx-swap="outerHTML" {
                            "Create Game"
                        }
                    }
                }
            }

            @if let Some(n) = view.notice() {
                (notice(n, &format!("{}/notice/dismiss", base_url), &target))
            }

            @if let Some(form) = view.form() {
                (creation_form(&base_url, &target, form))
            }

            @if view.games().is_empty() && view.is_loaded() {
                p class="has-text-grey" { "No games yet" }
            }

            div id="gameList" {
                @for game in view.games() {
                    (game_row(game))
                }
            }
        }
    }
}

pub fn game_row(game: &Game) -> Markup {
    html! {
        a class="box game-row" href=(encoded_path(&["game", &game.id])) data-game-id=(game.id) {
            div class="level is-mobile" {
                div class="level-left" {
                    span class=(status_dot_class(game.status)) title=(game.status.as_str()) {}
                    span class="ml-2" { (game.title) }
                }
                div class="level-right" {
                    span class="tag is-light" { (game.active_players) " Players" }
                }
            }
        }
    }
}
