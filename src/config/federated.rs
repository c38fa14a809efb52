//! Statically configured identity-client parameters.
//!
//! These are compiled into the bundle by `build.rs` (`FSH_AUTH_*`) and always
//! win over whatever the fetched config document says.

use serde::{Deserialize, Serialize};

use crate::error::BootstrapError;

/// OAuth block of the identity-client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthParams {
    pub domain: String,
    pub scope: Vec<String>,
    pub redirect_sign_in: String,
    pub redirect_sign_out: String,
    #[serde(default = "default_response_type")]
    pub response_type: String,
}

fn default_response_type() -> String {
    "code".to_string()
}

/// Identity-client block injected under `Auth` in the merged configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedParams {
    pub region: String,
    pub user_pool_id: String,
    pub user_pool_web_client_id: String,
    pub oauth: OAuthParams,
}

impl FederatedParams {
    /// Parameters baked in at compile time.
    pub fn from_build_env() -> Self {
        Self {
            region: env!("FSH_AUTH_REGION").to_string(),
            user_pool_id: env!("FSH_AUTH_USER_POOL_ID").to_string(),
            user_pool_web_client_id: env!("FSH_AUTH_USER_POOL_WEB_CLIENT_ID").to_string(),
            oauth: OAuthParams {
                domain: env!("FSH_AUTH_OAUTH_DOMAIN").to_string(),
                scope: env!("FSH_AUTH_OAUTH_SCOPE")
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
                redirect_sign_in: env!("FSH_AUTH_REDIRECT_SIGN_IN").to_string(),
                redirect_sign_out: env!("FSH_AUTH_REDIRECT_SIGN_OUT").to_string(),
                response_type: env!("FSH_AUTH_RESPONSE_TYPE").to_string(),
            },
        }
    }

    /// Every field the identity client needs must be present.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        let required = [
            ("region", &self.region),
            ("userPoolId", &self.user_pool_id),
            ("userPoolWebClientId", &self.user_pool_web_client_id),
            ("oauth.domain", &self.oauth.domain),
            ("oauth.redirectSignIn", &self.oauth.redirect_sign_in),
            ("oauth.redirectSignOut", &self.oauth.redirect_sign_out),
            ("oauth.responseType", &self.oauth.response_type),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(BootstrapError::MissingFederatedParam(name));
            }
        }
        if self.oauth.scope.is_empty() {
            return Err(BootstrapError::MissingFederatedParam("oauth.scope"));
        }
        Ok(())
    }
}

/// Bootstrap behavior switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Identity provider named in the federated sign-in redirect
    pub provider: String,
    /// Show an error alert instead of the loading indicator when the config
    /// document cannot be loaded. Off by default: a failed load keeps the
    /// loading indicator up indefinitely.
    pub show_config_errors: bool,
}

impl BootstrapOptions {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            show_config_errors: false,
        }
    }

    /// Options baked in at compile time.
    pub fn from_build_env() -> Self {
        Self {
            provider: env!("FSH_FEDERATED_PROVIDER").to_string(),
            show_config_errors: matches!(env!("FSH_SHOW_CONFIG_ERRORS"), "true" | "1"),
        }
    }

    /// The sign-in redirect needs a named identity provider.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        if self.provider.trim().is_empty() {
            return Err(BootstrapError::MissingFederatedParam("provider"));
        }
        Ok(())
    }

    pub fn with_config_errors(mut self, show: bool) -> Self {
        self.show_config_errors = show;
        self
    }
}

#[cfg(test)]
pub(crate) fn sample_params() -> FederatedParams {
    FederatedParams {
        region: "eu-west-1".to_string(),
        user_pool_id: "eu-west-1_Abc123".to_string(),
        user_pool_web_client_id: "client-123".to_string(),
        oauth: OAuthParams {
            domain: "shell.auth.eu-west-1.amazoncognito.com".to_string(),
            scope: vec!["email".into(), "openid".into(), "profile".into()],
            redirect_sign_in: "https://app.example.com/".to_string(),
            redirect_sign_out: "https://app.example.com/signed-out".to_string(),
            response_type: "code".to_string(),
        },
    }
}
