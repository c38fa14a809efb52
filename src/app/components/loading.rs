//! Loading indicator.

use dioxus::prelude::*;

#[component]
pub fn LoadingIndicator() -> Element {
    rsx! {
        div { class: "status-indicator", role: "status", "aria-busy": "true",
            span { class: "spinner" }
            " Loading"
        }
    }
}
