//! Configuration loading: fetch the deployment's config document and merge
//! the federated identity parameters into it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bus::{SharedBus, ShellEvent};
use crate::config::FederatedParams;
use crate::error::BootstrapError;

/// Credential fields that would allow direct (non-federated) pool access.
/// They are always removed from the fetched document.
pub const DIRECT_ACCESS_FIELDS: &[&str] = &[
    "aws_cognito_identity_pool_id",
    "aws_user_pools_id",
    "aws_user_pools_web_client_id",
];

/// Key under which the identity-client block is injected
pub const AUTH_KEY: &str = "Auth";

/// Merged configuration. Only ever constructed complete; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppConfig(Map<String, Value>);

impl AppConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Typed view of the injected `Auth` block
    pub fn federated_params(&self) -> Result<FederatedParams, BootstrapError> {
        let auth = self
            .get(AUTH_KEY)
            .ok_or_else(|| BootstrapError::InvalidAuthBlock("missing".to_string()))?;
        serde_json::from_value(auth.clone())
            .map_err(|e| BootstrapError::InvalidAuthBlock(e.to_string()))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Where the raw config document comes from.
#[async_trait(?Send)]
pub trait ConfigSource {
    /// Human-readable location, used in logs and error messages
    fn location(&self) -> &str;

    async fn fetch_document(&self) -> Result<Value, BootstrapError>;
}

/// Strip direct-access credentials and inject the federated block.
pub fn merge_document(
    document: Value,
    params: &FederatedParams,
) -> Result<AppConfig, BootstrapError> {
    let mut map = match document {
        Value::Object(map) => map,
        other => {
            return Err(BootstrapError::MalformedDocument(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    for field in DIRECT_ACCESS_FIELDS {
        if map.remove(*field).is_some() {
            tracing::debug!("Removed direct-access field {} from config document", field);
        }
    }

    let auth = serde_json::to_value(params)
        .map_err(|e| BootstrapError::InvalidAuthBlock(e.to_string()))?;
    map.insert(AUTH_KEY.to_string(), auth);

    Ok(AppConfig(map))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Produces the merged [`AppConfig`] exactly once per application load.
pub struct ConfigLoader<S> {
    source: S,
    params: FederatedParams,
    events: Option<SharedBus>,
}

impl<S: ConfigSource> ConfigLoader<S> {
    pub fn new(source: S, params: FederatedParams) -> Self {
        Self {
            source,
            params,
            events: None,
        }
    }

    pub fn with_events(mut self, events: SharedBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn location(&self) -> &str {
        self.source.location()
    }

    /// Fetch and merge. Either a complete configuration or an error; never a partial one.
    pub async fn load(&self) -> Result<AppConfig, BootstrapError> {
        let location = self.source.location().to_string();
        match self.fetch_and_merge().await {
            Ok(config) => {
                tracing::info!("Configuration loaded from {}", location);
                self.publish(ShellEvent::ConfigLoaded { location });
                Ok(config)
            }
            Err(e) => {
                tracing::error!("Configuration load failed: {}", e);
                self.publish(ShellEvent::ConfigFailed {
                    location,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn fetch_and_merge(&self) -> Result<AppConfig, BootstrapError> {
        self.params.validate()?;
        let document = self.source.fetch_document().await?;
        merge_document(document, &self.params)
    }

    fn publish(&self, event: ShellEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

/// Fetches the config document over HTTP (native builds)
#[cfg(feature = "server")]
pub struct HttpConfigSource {
    url: String,
    http: reqwest::Client,
}

#[cfg(feature = "server")]
impl HttpConfigSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }
}

#[cfg(feature = "server")]
#[async_trait(?Send)]
impl ConfigSource for HttpConfigSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch_document(&self) -> Result<Value, BootstrapError> {
        let fetch_err = |reason: String| BootstrapError::Fetch {
            location: self.url.clone(),
            reason,
        };

        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {}", status)));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| BootstrapError::MalformedDocument(e.to_string()))
    }
}
