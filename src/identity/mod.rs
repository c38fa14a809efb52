//! Hosted-UI identity client.
//!
//! Implements [`IdentityClient`] on top of two small seams: a
//! [`SessionStore`] holding whatever session the token exchange left behind,
//! and a [`Navigator`] that performs the sign-in redirect.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, OnceLock, PoisonError};
use url::Url;

use crate::bootstrap::{AppConfig, IdentityClient, Session};
use crate::config::FederatedParams;
use crate::error::BootstrapError;

/// Session persistence owned by the token exchange.
pub trait SessionStore {
    fn load(&self) -> Result<Option<Session>, BootstrapError>;
}

/// Performs a full-page navigation.
pub trait Navigator {
    fn navigate(&self, url: &Url) -> Result<(), BootstrapError>;
}

/// Build the hosted-UI authorize URL that starts a federated sign-in.
pub fn authorize_url(params: &FederatedParams, provider: &str) -> Result<Url, BootstrapError> {
    let base = format!("https://{}/oauth2/authorize", params.oauth.domain);
    let scope = params.oauth.scope.join(" ");
    Url::parse_with_params(
        &base,
        &[
            ("identity_provider", provider),
            ("redirect_uri", params.oauth.redirect_sign_in.as_str()),
            ("response_type", params.oauth.response_type.as_str()),
            ("client_id", params.user_pool_web_client_id.as_str()),
            ("scope", scope.as_str()),
        ],
    )
    .map_err(|e| BootstrapError::InvalidAuthBlock(format!("oauth.domain: {}", e)))
}

pub struct HostedUiClient<S, N> {
    params: OnceLock<FederatedParams>,
    sessions: S,
    navigator: N,
}

impl<S: SessionStore, N: Navigator> HostedUiClient<S, N> {
    pub fn new(sessions: S, navigator: N) -> Self {
        Self {
            params: OnceLock::new(),
            sessions,
            navigator,
        }
    }

    pub fn params(&self) -> Option<&FederatedParams> {
        self.params.get()
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }
}

#[async_trait(?Send)]
impl<S: SessionStore, N: Navigator> IdentityClient for HostedUiClient<S, N> {
    fn configure(&self, config: &AppConfig) -> Result<(), BootstrapError> {
        let params = config.federated_params()?;
        params.validate()?;
        tracing::debug!(
            "Hosted UI configured for pool {} in {}",
            params.user_pool_id,
            params.region
        );
        self.params
            .set(params)
            .map_err(|_| BootstrapError::AlreadyConfigured)
    }

    async fn current_authenticated_session(&self) -> Result<Session, BootstrapError> {
        if self.params.get().is_none() {
            return Err(BootstrapError::NotConfigured);
        }
        let session = self.sessions.load()?.ok_or(BootstrapError::NoSession)?;
        if session.is_expired_at(Utc::now()) {
            return Err(BootstrapError::SessionExpired);
        }
        Ok(session)
    }

    fn begin_federated_sign_in(&self, provider: &str) -> Result<(), BootstrapError> {
        let params = self.params.get().ok_or(BootstrapError::NotConfigured)?;
        let url = authorize_url(params, provider)?;
        self.navigator.navigate(&url)
    }
}

/// In-process session store (SSR and tests)
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    pub fn store(&self, session: Session) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, BootstrapError> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

/// Remembers navigations instead of performing them
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<Url> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) -> Result<(), BootstrapError> {
        tracing::debug!("Navigation recorded: {}", url);
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
        Ok(())
    }
}
