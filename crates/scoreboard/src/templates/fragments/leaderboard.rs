use maud::{html, Markup};
use scoreboard_core::LeaderboardEntry;

use crate::{
    domain::{LeaderboardScope, LeaderboardView},
    templates::components::notice,
};

use super::{creation_form, encoded_path};

/// Leaderboard view for either scope
pub fn leaderboard(view_id: &str, view: &LeaderboardView) -> Markup {
    let base_url = format!("/views/leaderboards/{}", view_id);
    let target = format!("#leaderboard-{}", view_id);
    let scope = view.scope();
    let (title, open_label) = match scope {
        LeaderboardScope::Global => ("Leaderboard", "Create Player"),
        LeaderboardScope::Game(_) => ("Game Leaderboard", "Add player"),
    };
    let remove_label = match scope {
        LeaderboardScope::Global => "DELETE",
        LeaderboardScope::Game(_) => "EXIT",
    };

    html! {
        div id=(format!("leaderboard-{}", view_id)) class="box" data-view-id=(view_id) {
            div class="level" {
                div class="level-left" {
                    h4 class="title is-4" { (title) }
                }
                div class="level-right" {
                    div class="buttons" {
                        button class="button is-light"
                               hx-post=(format!("{}/refresh", base_url))
                               hx-target=(target)
                               hx-swap="outerHTML" {
                            "Refresh"
                        }
                        @if view.form().is_none() {
                            button class="button is-primary"
                                   hx-post=(format!("{}/form/open", base_url))
                                   hx-target=(target)
                                   hx-swap="outerHTML" {
                                (open_label)
                            }
                        }
                    }
                }
            }

            // only a game page can move between its own board and the global one
            @if let LeaderboardScope::Game(_) = view.home_scope() {
                div class="tabs is-small" {
                    ul {
                        li class=[matches!(scope, LeaderboardScope::Game(_)).then_some("is-active")] {
                            a hx-post=(format!("{}/scope", base_url))
                              hx-vals=(r#"{"scope": "game"}"#)
                              hx-target=(target)
                              hx-swap="outerHTML" {
                                "This game"
                            }
                        }
                        li class=[matches!(scope, LeaderboardScope::Global).then_some("is-active")] {
                            a hx-post=(format!("{}/scope", base_url))
                              hx-vals=(r#"{"scope": "global"}"#)
                              hx-target=(target)
                              hx-swap="outerHTML" {
                                "Global"
                            }
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

            table class="table is-fullwidth is-striped is-hoverable" {
                thead {
                    tr {
                        th { "Player" }
                        th { "Score" }
                        th {}
                    }
                }
                tbody {
                    @for entry in view.entries() {
                        (leaderboard_row(&base_url, &target, remove_label, entry))
                    }
                }
            }
        }
    }
}

pub fn leaderboard_row(
    base_url: &str,
    target: &str,
    remove_label: &str,
    entry: &LeaderboardEntry,
) -> Markup {
    let remove_url = format!(
        "{}{}",
        base_url,
        encoded_path(&["players", &entry.id, "remove"])
    );
    html! {
        tr data-player-id=(entry.id) {
            td { (entry.name) " (" (entry.id) ")" }
            td { (format_score(entry.score)) }
            td class="has-text-right" {
                button class="button is-danger is-small is-outlined"
                       hx-post=(remove_url)
                       hx-target=(target)
                       hx-swap="outerHTML" {
                    (remove_label)
                }
            }
        }
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{}", score)
    }
}
