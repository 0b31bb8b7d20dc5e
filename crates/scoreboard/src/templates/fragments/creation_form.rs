use maud::{html, Markup};

use crate::domain::CreationForm;

/// Inline creation form; every control re-renders the owning view into `target`
pub fn creation_form(base_url: &str, target: &str, form: &CreationForm) -> Markup {
    let kind = form.kind();
    html! {
        form class="box"
             hx-post=(format!("{}/form", base_url))
             hx-target=(target)
             hx-swap="outerHTML" {
            div class="field" {
                label class="label" for=(kind.field_name()) { (kind.label()) }
                div class="control" {
                    input class="input"
                          type="text"
                          id=(kind.field_name())
                          name=(kind.field_name())
                          placeholder=(kind.placeholder())
                          value=(form.value())
                          disabled[form.is_submitting()];
                }
            }

            @if let Some(error) = form.error() {
                div class="notification is-danger is-light" {
                    button type="button"
                           class="delete"
                           hx-post=(format!("{}/form/error/dismiss", base_url))
                           hx-target=(target)
                           hx-swap="outerHTML" {}
                    (error)
                }
            }

            div class="field is-grouped" {
                div class="control" {
                    button type="submit"
                           class=(if form.is_submitting() { "button is-primary is-loading" } else { "button is-primary" })
                           disabled[form.is_submitting()] {
                        (kind.submit_label())
                    }
                }
                div class="control" {
                    button type="button"
                           class="button is-light"
                           hx-post=(format!("{}/form/close", base_url))
                           hx-target=(target)
                           hx-swap="outerHTML" {
                        "Cancel"
                    }
                }
            }
        }
    }
}
