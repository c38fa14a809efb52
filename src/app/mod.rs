//! Dioxus application entry point.
//!
//! [`AppConfigured`] is the render boundary of the bootstrap: it runs the
//! bootstrap once on mount, provides the merged config as context, and
//! picks between the loading indicator, the protected app and nothing.

use dioxus::prelude::*;
use tokio_util::sync::CancellationToken;

pub mod api;
pub mod components;
pub mod identity;
pub mod theme;

use crate::bootstrap::{AppConfig, ShellView};
use crate::config::CONFIG_DOCUMENT_PATH;
use components::{ConfigErrorAlert, LoadingIndicator, ThemeToggle};
use theme::use_theme_provider;

/// Bootstrap results shared via context
#[derive(Clone, Copy)]
pub struct ShellContext {
    pub view: Signal<ShellView>,
    /// Merged configuration, read-only for descendants
    pub config: Signal<Option<AppConfig>>,
}

/// Run the bootstrap for the lifetime of the calling component
pub fn use_shell_provider() -> ShellContext {
    let view = use_signal(|| ShellView::Loading);
    let config = use_signal(|| None::<AppConfig>);
    let ctx = ShellContext { view, config };
    use_context_provider(|| ctx);

    let teardown = use_hook(CancellationToken::new);
    {
        let teardown = teardown.clone();
        use_drop(move || teardown.cancel());
    }

    #[cfg(target_arch = "wasm32")]
    {
        use_hook(move || {
            spawn(async move {
                let bootstrap = browser::bootstrap().with_teardown(teardown.clone());
                let report = bootstrap.run().await;
                if teardown.is_cancelled() {
                    return;
                }
                let (mut view, mut config) = (view, config);
                config.set(report.config);
                view.set(report.view);
            })
        });
    }

    ctx
}

/// Merged configuration of the running app (None until loaded)
pub fn use_app_config() -> Signal<Option<AppConfig>> {
    use_context::<ShellContext>().config
}

/// Root of the authenticated application tree
#[component]
pub fn AppConfigured(children: Element) -> Element {
    let theme = use_theme_provider();
    let shell = use_shell_provider();
    let mode = theme.get().as_str();

    match (shell.view)() {
        ShellView::Loading => rsx! {
            div { class: "shell-center", "data-theme": mode,
                LoadingIndicator {}
            }
        },
        ShellView::ConfigError(message) => rsx! {
            div { class: "shell-center", "data-theme": mode,
                ConfigErrorAlert { location: CONFIG_DOCUMENT_PATH.to_string(), message: message }
            }
        },
        ShellView::Protected => rsx! {
            div { class: "shell-root", "data-theme": mode, {children} }
        },
        ShellView::Blank => rsx! {
            div { class: "shell-root", "data-theme": mode }
        },
    }
}

/// Root app component
#[component]
pub fn App() -> Element {
    rsx! {
        AppConfigured { Home {} }
    }
}

/// Minimal landing page behind the identity gate
#[component]
fn Home() -> Element {
    let config = use_app_config();
    let region = config
        .read()
        .as_ref()
        .and_then(|c| c.federated_params().ok())
        .map(|p| p.region)
        .unwrap_or_default();

    rsx! {
        main { class: "max-w-7xl mx-auto px-4 mt-4",
            header { class: "flex justify-between items-center",
                h1 { "Signed in" }
                ThemeToggle {}
            }
            small { class: "text-muted", "Region: {region}" }
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::api::BrowserConfigSource;
    use super::identity::{BrowserNavigator, LocalStorageSessionStore};
    use crate::bootstrap::Bootstrap;
    use crate::config::{BootstrapOptions, FederatedParams, CONFIG_DOCUMENT_PATH};
    use crate::identity::HostedUiClient;

    pub type BrowserBootstrap =
        Bootstrap<BrowserConfigSource, HostedUiClient<LocalStorageSessionStore, BrowserNavigator>>;

    /// Bootstrap wired to the browser's fetch, localStorage and location
    pub fn bootstrap() -> BrowserBootstrap {
        Bootstrap::new(
            BrowserConfigSource::new(CONFIG_DOCUMENT_PATH),
            FederatedParams::from_build_env(),
            HostedUiClient::new(LocalStorageSessionStore, BrowserNavigator),
            BootstrapOptions::from_build_env(),
        )
    }
}
