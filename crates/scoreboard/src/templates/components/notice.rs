use maud::{html, Markup};

use crate::domain::{Notice, NoticeLevel};

fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "notification is-success",
        NoticeLevel::Warning => "notification is-warning",
        NoticeLevel::Error => "notification is-danger",
    }
}

/// Dismissible notice; dismissing clears it on the server and re-renders the view
pub fn notice(notice: &Notice, dismiss_url: &str, target: &str) -> Markup {
    html! {
        div class=(level_class(notice.level)) {
            button class="delete"
                   hx-post=(dismiss_url)
                   hx-target=(target)
                   hx-swap="outerHTML" {}
            (notice.message)
        }
    }
}

/// Rendered in place of a view the server no longer holds
pub fn view_gone() -> Markup {
    html! {
        div class="notification is-warning" {
            p { "This page has expired." }
            a class="button is-light mt-3" href="" onclick="location.reload(); return false;" {
                "Reload the page"
            }
        }
    }
}
