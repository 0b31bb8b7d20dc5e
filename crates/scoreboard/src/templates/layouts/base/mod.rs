use maud::{html, Markup, DOCTYPE};

use crate::templates::components::navbar;

pub struct PageConfig<'a> {
    pub title: &'a str,
    pub api_base: &'a str,
}

pub fn base(config: &PageConfig, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                base href="/";
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.title) }

                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bulma@1.0.2/css/bulma.min.css";
                link rel="stylesheet" href="/ui/styles.css";

                script src="https://unpkg.com/htmx.org@1.9.10" {}
            }
            body data-api-base=(config.api_base) {
                (navbar())

                section class="section pt-3" {
                    div class="container" {
                        div id="main-content" {
                            (content)
                        }
                    }
                }

                // Views live on the server until the page says they are gone; an expired
                // view answers 410 with a reload prompt that replaces it. A page kept in
                // the back/forward cache still owns its views.
                script {
                    (maud::PreEscaped(r#"
                    document.body.addEventListener('htmx:beforeSwap', function(e) {
                        if (e.detail.xhr.status === 410) {
                            e.detail.shouldSwap = true;
                            e.detail.isError = false;
                        }
                    });
                    window.addEventListener('pagehide', function(event) {
                        if (event.persisted) {
                            return;
                        }
                        document.querySelectorAll('[data-view-id]').forEach(function(el) {
                            navigator.sendBeacon('/views/' + el.dataset.viewId + '/unmount');
                        });
                    });
                    "#))
                }
            }
        }
    }
}
