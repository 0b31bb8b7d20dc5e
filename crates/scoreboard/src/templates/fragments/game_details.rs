use maud::{html, Markup};
use scoreboard_core::Transition;
use time::{
    format_description::{well_known::Iso8601, FormatItem},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

use crate::{domain::GameDetailView, templates::components::notice};

use super::game_list::status_dot_class;

const DISPLAY_TIME: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

pub fn game_details(view_id: &str, view: &GameDetailView) -> Markup {
    let base_url = format!("/views/details/{}", view_id);
    let target = format!("#details-{}", view_id);
    html! {
        div id=(format!("details-{}", view_id)) class="box" data-view-id=(view_id) {
            div class="level" {
                div class="level-left" {
                    a class="button is-light" href="/" { "Back to Games" }
                }
            }

            @if let Some(n) = view.notice() {
                (notice(n, &format!("{}/notice/dismiss", base_url), &target))
            }

            @if let Some(details) = view.details() {
                div class="level" {
                    div class="level-left" {
                        span class=(status_dot_class(details.status)) {}
                        h3 class="title is-3 ml-2" { (details.title) }
                    }
                    div class="level-right" {
                        span class="tag is-medium" { (details.status.as_str()) }
                        @if view.awaiting_reconcile() {
                            span class="tag is-light ml-2" { "unconfirmed" }
                        }
                    }
                }

                table class="table is-fullwidth" {
                    tbody {
                        tr {
                            th { "Popularity Index" }
                            td { (format!("{:.2}", details.popularity_index)) }
                        }
                        tr {
                            th { "Active Players" }
                            td { (details.active_players()) }
                        }
                        tr {
                            th { "Upvotes" }
                            td { (details.upvotes()) }
                        }
                        @if let Some(started_at) = &details.started_at {
                            tr {
                                th { "Started" }
                                td { (display_time(started_at)) }
                            }
                        }
                        @if let Some(ended_at) = &details.ended_at {
                            tr {
                                th { "Ended" }
                                td { (display_time(ended_at)) }
                            }
                        }
                    }
                }

                @if let Some(transition) = view.pending() {
                    button class="button is-loading" disabled {
                        (control_label(transition))
                    }
                } @else if let Some(transition) = view.available_transition() {
                    button class=(control_class(transition))
                           hx-post=(format!("{}/{}", base_url, control_path(transition)))
                           hx-target=(target)
                           hx-swap="outerHTML" {
                        (control_label(transition))
                    }
                }
            }
        }
    }
}

fn control_label(transition: Transition) -> &'static str {
    match transition {
        Transition::Start => "Start",
        Transition::End => "Stop",
    }
}

fn control_path(transition: Transition) -> &'static str {
    match transition {
        Transition::Start => "start",
        Transition::End => "stop",
    }
}

fn control_class(transition: Transition) -> &'static str {
    match transition {
        Transition::Start => "button is-success",
        Transition::End => "button is-danger",
    }
}

/// Timestamps come as ISO-8601 text, with or without an offset; shown in UTC
fn display_time(raw: &str) -> String {
    if let Ok(at) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
        if let Ok(shown) = at.to_offset(UtcOffset::UTC).format(DISPLAY_TIME) {
            return format!("{} UTC", shown);
        }
    }
    PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
        .ok()
        .and_then(|at| at.format(DISPLAY_TIME).ok())
        .unwrap_or_else(|| raw.to_string())
}
