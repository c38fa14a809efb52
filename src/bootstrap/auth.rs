//! Identity gate: configure the identity client once, check for a session,
//! and redirect to federated sign-in when there is none.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::watch;

use super::loader::AppConfig;
use super::status::{BootstrapStatus, Effect, StatusMachine, TransitionRule};
use crate::bus::{SharedBus, ShellEvent};
use crate::error::{BootstrapError, TransitionError};

/// An authenticated session as reported by the identity client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub id_token: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Why the session check came back negative
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    NotConfigured,
    ConfigureFailed(String),
    NoSession,
    SessionExpired,
    QueryFailed(String),
}

impl From<BootstrapError> for UnauthenticatedReason {
    fn from(err: BootstrapError) -> Self {
        match err {
            BootstrapError::NotConfigured => UnauthenticatedReason::NotConfigured,
            BootstrapError::NoSession => UnauthenticatedReason::NoSession,
            BootstrapError::SessionExpired => UnauthenticatedReason::SessionExpired,
            other => UnauthenticatedReason::QueryFailed(other.to_string()),
        }
    }
}

/// Result of the session check. Any doubt lands in `Unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Authenticated(Session),
    Unauthenticated(UnauthenticatedReason),
}

impl SessionOutcome {
    pub fn status(&self) -> BootstrapStatus {
        match self {
            SessionOutcome::Authenticated(_) => BootstrapStatus::Authenticated,
            SessionOutcome::Unauthenticated(_) => BootstrapStatus::Unauthenticated,
        }
    }
}

/// Federated identity client (hosted UI, token storage, redirects).
#[async_trait(?Send)]
pub trait IdentityClient {
    /// Apply the merged configuration. Called at most once.
    fn configure(&self, config: &AppConfig) -> Result<(), BootstrapError>;

    /// The currently valid session, if any.
    async fn current_authenticated_session(&self) -> Result<Session, BootstrapError>;

    /// Navigate away to the identity provider's sign-in.
    fn begin_federated_sign_in(&self, provider: &str) -> Result<(), BootstrapError>;
}

#[async_trait(?Send)]
impl<C: IdentityClient + ?Sized> IdentityClient for Rc<C> {
    fn configure(&self, config: &AppConfig) -> Result<(), BootstrapError> {
        (**self).configure(config)
    }

    async fn current_authenticated_session(&self) -> Result<Session, BootstrapError> {
        (**self).current_authenticated_session().await
    }

    fn begin_federated_sign_in(&self, provider: &str) -> Result<(), BootstrapError> {
        (**self).begin_federated_sign_in(provider)
    }
}

/// Drives the identity client through configure → session check → redirect.
pub struct AuthController<C> {
    client: C,
    provider: String,
    machine: RefCell<StatusMachine>,
    status_tx: watch::Sender<BootstrapStatus>,
    events: Option<SharedBus>,
}

impl<C: IdentityClient> AuthController<C> {
    pub fn new(client: C, provider: impl Into<String>) -> Self {
        let (status_tx, _) = watch::channel(BootstrapStatus::Loading);
        Self {
            client,
            provider: provider.into(),
            machine: RefCell::new(StatusMachine::new()),
            status_tx,
            events: None,
        }
    }

    /// Replace the default redirect-on-unauthenticated rule set
    pub fn with_rules(self, rules: Vec<TransitionRule>) -> Self {
        self.machine.replace(StatusMachine::with_rules(rules));
        self
    }

    pub fn with_events(mut self, events: SharedBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn status(&self) -> BootstrapStatus {
        self.machine.borrow().status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<BootstrapStatus> {
        self.status_tx.subscribe()
    }

    pub fn is_configured(&self) -> bool {
        self.machine.borrow().is_configured()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Step 1: configure the identity client. Exactly once.
    pub fn initialize(&self, config: &AppConfig) -> Result<(), BootstrapError> {
        if self.is_configured() {
            return Err(BootstrapError::AlreadyConfigured);
        }
        match self.client.configure(config) {
            Ok(()) => {
                self.machine.borrow_mut().mark_configured();
                tracing::debug!("Identity client configured");
                self.publish(ShellEvent::IdentityConfigured);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Identity client configuration failed: {}", e);
                self.publish(ShellEvent::IdentityConfigureFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Step 2: ask the client for a session. Never queries an unconfigured client.
    pub async fn check_session(&self) -> SessionOutcome {
        if !self.is_configured() {
            return SessionOutcome::Unauthenticated(UnauthenticatedReason::NotConfigured);
        }
        match self.client.current_authenticated_session().await {
            Ok(session) => SessionOutcome::Authenticated(session),
            Err(e) => {
                tracing::info!("Authentication check error: {}", e);
                SessionOutcome::Unauthenticated(e.into())
            }
        }
    }

    /// Steps 1 and 2, with a configure failure folded into the outcome.
    pub async fn authenticate(&self, config: &AppConfig) -> SessionOutcome {
        if let Err(e) = self.initialize(config) {
            return SessionOutcome::Unauthenticated(UnauthenticatedReason::ConfigureFailed(
                e.to_string(),
            ));
        }
        self.check_session().await
    }

    /// Step 3: record the outcome and run the effects of the transition.
    pub fn apply(&self, outcome: &SessionOutcome) -> Result<BootstrapStatus, TransitionError> {
        let to = outcome.status();
        let (from, effects) = {
            let mut machine = self.machine.borrow_mut();
            let from = machine.status();
            (from, machine.transition(to)?)
        };

        if from != to {
            self.status_tx.send_replace(to);
            match outcome {
                SessionOutcome::Authenticated(session) => {
                    tracing::info!("Authenticated as {}", session.username);
                }
                SessionOutcome::Unauthenticated(reason) => {
                    tracing::info!("No authenticated user ({:?})", reason);
                }
            }
            self.publish(ShellEvent::StatusChanged { from, to });
        }

        for effect in effects {
            self.run_effect(effect);
        }
        Ok(to)
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::FederatedSignIn => {
                tracing::info!("Initiating federated sign-in via {}", self.provider);
                match self.client.begin_federated_sign_in(&self.provider) {
                    Ok(()) => self.publish(ShellEvent::SignInRedirect {
                        provider: self.provider.clone(),
                    }),
                    Err(e) => {
                        tracing::error!("Federated sign-in failed: {}", e);
                        self.publish(ShellEvent::SignInRedirectFailed {
                            provider: self.provider.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    fn publish(&self, event: ShellEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::loader::merge_document;
    use crate::bus::{create_bus, drain};
    use crate::config::federated::sample_params;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct ScriptedClient {
        fail_configure: bool,
        session: Option<Session>,
        configure_calls: Cell<usize>,
        session_calls: Cell<usize>,
        redirects: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl IdentityClient for ScriptedClient {
        fn configure(&self, _config: &AppConfig) -> Result<(), BootstrapError> {
            self.configure_calls.set(self.configure_calls.get() + 1);
            if self.fail_configure {
                Err(BootstrapError::InvalidAuthBlock("bad".to_string()))
            } else {
                Ok(())
            }
        }

        async fn current_authenticated_session(&self) -> Result<Session, BootstrapError> {
            self.session_calls.set(self.session_calls.get() + 1);
            self.session.clone().ok_or(BootstrapError::NoSession)
        }

        fn begin_federated_sign_in(&self, provider: &str) -> Result<(), BootstrapError> {
            self.redirects.borrow_mut().push(provider.to_string());
            Ok(())
        }
    }

    fn config() -> AppConfig {
        merge_document(serde_json::json!({}), &sample_params()).unwrap()
    }

    fn session() -> Session {
        Session {
            username: "ada".to_string(),
            id_token: "id".to_string(),
            access_token: "access".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn test_session_resolves_to_authenticated() {
        let client = Rc::new(ScriptedClient {
            session: Some(session()),
            ..Default::default()
        });
        let auth = AuthController::new(Rc::clone(&client), "Corp-OIDC");

        let outcome = auth.authenticate(&config()).await;
        assert_eq!(auth.apply(&outcome), Ok(BootstrapStatus::Authenticated));

        assert!(client.redirects.borrow().is_empty());
        assert_eq!(*auth.subscribe_status().borrow(), BootstrapStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_missing_session_redirects_once() {
        let client = Rc::new(ScriptedClient::default());
        let events = create_bus();
        let mut rx = events.subscribe();
        let auth = AuthController::new(Rc::clone(&client), "Corp-OIDC").with_events(events);

        let outcome = auth.authenticate(&config()).await;
        assert_eq!(
            outcome,
            SessionOutcome::Unauthenticated(UnauthenticatedReason::NoSession)
        );
        auth.apply(&outcome).unwrap();
        auth.apply(&outcome).unwrap();

        assert_eq!(*client.redirects.borrow(), vec!["Corp-OIDC".to_string()]);
        assert_eq!(
            drain(&mut rx),
            vec![
                ShellEvent::IdentityConfigured,
                ShellEvent::StatusChanged {
                    from: BootstrapStatus::Loading,
                    to: BootstrapStatus::Unauthenticated
                },
                ShellEvent::SignInRedirect {
                    provider: "Corp-OIDC".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_configure_failure_skips_session_and_redirect() {
        let client = Rc::new(ScriptedClient {
            fail_configure: true,
            ..Default::default()
        });
        let auth = AuthController::new(Rc::clone(&client), "Corp-OIDC");

        let outcome = auth.authenticate(&config()).await;
        assert!(matches!(
            outcome,
            SessionOutcome::Unauthenticated(UnauthenticatedReason::ConfigureFailed(_))
        ));
        assert_eq!(auth.apply(&outcome), Ok(BootstrapStatus::Unauthenticated));

        assert_eq!(client.session_calls.get(), 0);
        assert!(client.redirects.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_check_session_requires_configure() {
        let client = Rc::new(ScriptedClient::default());
        let auth = AuthController::new(Rc::clone(&client), "Corp-OIDC");

        assert_eq!(
            auth.check_session().await,
            SessionOutcome::Unauthenticated(UnauthenticatedReason::NotConfigured)
        );
        assert_eq!(client.session_calls.get(), 0);
    }

    #[test]
    fn test_configure_exactly_once() {
        let client = Rc::new(ScriptedClient::default());
        let auth = AuthController::new(Rc::clone(&client), "Corp-OIDC");

        assert!(auth.initialize(&config()).is_ok());
        assert_eq!(
            auth.initialize(&config()),
            Err(BootstrapError::AlreadyConfigured)
        );
        assert_eq!(client.configure_calls.get(), 1);
    }

    #[test]
    fn test_error_maps_to_reason() {
        assert_eq!(
            UnauthenticatedReason::from(BootstrapError::SessionExpired),
            UnauthenticatedReason::SessionExpired
        );
        assert!(matches!(
            UnauthenticatedReason::from(BootstrapError::Storage("quota".into())),
            UnauthenticatedReason::QueryFailed(msg) if msg.contains("quota")
        ));
    }
}
