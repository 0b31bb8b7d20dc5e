use maud::{html, Markup};

pub fn navbar() -> Markup {
    html! {
        div class="container" {
            nav class="navbar is-light" role="navigation" aria-label="main navigation" {
                div class="navbar-brand" {
                    a class="navbar-item" href="/" {
                        strong { "Scoreboard" }
                    }
                }
                div class="navbar-menu" {
                    div class="navbar-start" {
                        a class="navbar-item" href="/" { "Games" }
                    }
                }
            }
        }
    }
}
