//! Configuration error alert.

use dioxus::prelude::*;

/// Shown instead of the loading indicator when config errors are enabled
/// and the config document could not be loaded.
#[component]
pub fn ConfigErrorAlert(
    /// Location of the config document
    location: String,
    /// Error detail
    message: String,
) -> Element {
    rsx! {
        div { class: "card bg-error/10 border-error text-error p-3 mb-4", role: "alert",
            strong { "Configuration error" }
            p {
                "Error loading configuration from \""
                a { href: "{location}", class: "font-semibold", "{location}" }
                "\""
            }
            small { class: "text-muted", "{message}" }
        }
    }
}
