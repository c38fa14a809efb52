//! Theme toggle for light/dark modes.

use dioxus::prelude::*;

use crate::app::theme::use_theme;

/// Flips the theme. The change travels over the theme bus, so every
/// watcher in the app sees it, and is persisted for the next load.
#[component]
pub fn ThemeToggle() -> Element {
    let theme = use_theme();
    let next = theme.get().toggled();
    let label = format!("Switch to {}", next.as_str());

    rsx! {
        button {
            class: "btn btn-ghost btn-sm",
            onclick: move |_| theme.set(next),
            "{label}"
        }
    }
}
