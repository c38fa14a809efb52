//! Application bootstrap: config load → identity gate → view selection.
//!
//! [`Bootstrap`] sequences the [`ConfigLoader`] and the [`AuthController`]
//! and owns the teardown guard. Once torn down, results that are still in
//! flight are dropped instead of mutating state; nothing is cancelled.

pub mod auth;
pub mod loader;
pub mod status;

pub use auth::{AuthController, IdentityClient, Session, SessionOutcome, UnauthenticatedReason};
pub use loader::{AppConfig, ConfigLoader, ConfigSource, AUTH_KEY, DIRECT_ACCESS_FIELDS};
#[cfg(feature = "server")]
pub use loader::HttpConfigSource;
pub use status::{BootstrapStatus, Effect, StatusMachine, TransitionRule};

use std::cell::{Cell, OnceCell, RefCell};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::bus::{SharedBus, ShellEvent};
use crate::config::{BootstrapOptions, FederatedParams};
use crate::error::BootstrapError;

/// What the render layer should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellView {
    /// Loading indicator
    Loading,
    /// Config document could not be loaded (only when enabled in options)
    ConfigError(String),
    /// The protected application
    Protected,
    /// Nothing: a sign-in redirect is under way
    Blank,
}

impl ShellView {
    /// An unauthenticated verdict from an unconfigured identity client has no
    /// redirect behind it, so the loading indicator stays up.
    pub fn select(
        status: BootstrapStatus,
        load_error: Option<&BootstrapError>,
        show_config_errors: bool,
        identity_configured: bool,
    ) -> Self {
        match (status, load_error) {
            (BootstrapStatus::Loading, Some(err)) if show_config_errors => {
                ShellView::ConfigError(err.to_string())
            }
            (BootstrapStatus::Loading, _) => ShellView::Loading,
            (BootstrapStatus::Authenticated, _) => ShellView::Protected,
            (BootstrapStatus::Unauthenticated, _) if !identity_configured => ShellView::Loading,
            (BootstrapStatus::Unauthenticated, _) => ShellView::Blank,
        }
    }
}

/// Snapshot handed to the render layer after [`Bootstrap::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapReport {
    pub status: BootstrapStatus,
    pub view: ShellView,
    pub config: Option<AppConfig>,
    pub load_error: Option<BootstrapError>,
}

pub struct Bootstrap<S, C> {
    loader: ConfigLoader<S>,
    auth: AuthController<C>,
    options: BootstrapOptions,
    teardown: CancellationToken,
    started: Cell<bool>,
    config: OnceCell<AppConfig>,
    load_error: RefCell<Option<BootstrapError>>,
    events: Option<SharedBus>,
}

impl<S: ConfigSource, C: IdentityClient> Bootstrap<S, C> {
    pub fn new(source: S, params: FederatedParams, client: C, options: BootstrapOptions) -> Self {
        let auth = AuthController::new(client, options.provider.clone());
        Self {
            loader: ConfigLoader::new(source, params),
            auth,
            options,
            teardown: CancellationToken::new(),
            started: Cell::new(false),
            config: OnceCell::new(),
            load_error: RefCell::new(None),
            events: None,
        }
    }

    pub fn with_events(self, events: SharedBus) -> Self {
        Self {
            loader: self.loader.with_events(events.clone()),
            auth: self.auth.with_events(events.clone()),
            events: Some(events),
            ..self
        }
    }

    /// Share a teardown token with the owner of this bootstrap (e.g. a component)
    pub fn with_teardown(mut self, token: CancellationToken) -> Self {
        self.teardown = token;
        self
    }

    pub fn teardown_token(&self) -> CancellationToken {
        self.teardown.clone()
    }

    /// Stop applying results. In-flight work keeps running and is ignored.
    pub fn tear_down(&self) {
        self.teardown.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_cancelled()
    }

    pub fn status(&self) -> BootstrapStatus {
        self.auth.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<BootstrapStatus> {
        self.auth.subscribe_status()
    }

    pub fn auth(&self) -> &AuthController<C> {
        &self.auth
    }

    /// The merged configuration, once published
    pub fn config(&self) -> Option<&AppConfig> {
        self.config.get()
    }

    pub fn load_error(&self) -> Option<BootstrapError> {
        self.load_error.borrow().clone()
    }

    pub fn view(&self) -> ShellView {
        ShellView::select(
            self.status(),
            self.load_error.borrow().as_ref(),
            self.options.show_config_errors,
            self.auth.is_configured(),
        )
    }

    pub fn report(&self) -> BootstrapReport {
        BootstrapReport {
            status: self.status(),
            view: self.view(),
            config: self.config().cloned(),
            load_error: self.load_error(),
        }
    }

    /// Run the whole sequence once. Later calls just return the current report.
    pub async fn run(&self) -> BootstrapReport {
        if self.started.replace(true) {
            tracing::warn!("Bootstrap already started; ignoring second run");
            return self.report();
        }

        if let Err(e) = self.options.validate() {
            tracing::error!("Bootstrap options rejected: {}", e);
            if let Some(events) = &self.events {
                events.publish(ShellEvent::ConfigFailed {
                    location: self.loader.location().to_string(),
                    reason: e.to_string(),
                });
            }
            *self.load_error.borrow_mut() = Some(e);
            return self.report();
        }

        let loaded = self.loader.load().await;
        if self.is_torn_down() {
            self.ignore_late("config");
            return self.report();
        }

        let config = match loaded {
            Ok(config) => self.config.get_or_init(|| config),
            Err(e) => {
                if !self.options.show_config_errors {
                    tracing::warn!(
                        "Staying on the loading indicator; config errors are not displayed"
                    );
                }
                *self.load_error.borrow_mut() = Some(e);
                return self.report();
            }
        };

        let outcome = self.auth.authenticate(config).await;
        if self.is_torn_down() {
            self.ignore_late("session");
            return self.report();
        }

        if let Err(e) = self.auth.apply(&outcome) {
            tracing::warn!("Dropped session outcome: {}", e);
        }
        self.report()
    }

    fn ignore_late(&self, stage: &str) {
        tracing::debug!("Shell torn down; ignoring late {} result", stage);
        if let Some(events) = &self.events {
            events.publish(ShellEvent::LateResultIgnored {
                stage: stage.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_selection() {
        let err = BootstrapError::MalformedDocument("eof".to_string());

        assert_eq!(
            ShellView::select(BootstrapStatus::Loading, None, true, true),
            ShellView::Loading
        );
        assert_eq!(
            ShellView::select(BootstrapStatus::Loading, Some(&err), false, true),
            ShellView::Loading
        );
        assert_eq!(
            ShellView::select(BootstrapStatus::Loading, Some(&err), true, true),
            ShellView::ConfigError("Malformed configuration document: eof".to_string())
        );
        assert_eq!(
            ShellView::select(BootstrapStatus::Authenticated, None, false, true),
            ShellView::Protected
        );
        assert_eq!(
            ShellView::select(BootstrapStatus::Unauthenticated, None, false, true),
            ShellView::Blank
        );
        assert_eq!(
            ShellView::select(BootstrapStatus::Unauthenticated, None, false, false),
            ShellView::Loading
        );
    }
}
