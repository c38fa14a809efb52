//! Browser collaborators for the hosted-UI identity client.

use url::Url;

use crate::bootstrap::Session;
use crate::error::BootstrapError;
use crate::identity::{Navigator, SessionStore};

/// localStorage key the token exchange writes the session to
pub const SESSION_STORAGE_KEY: &str = "fsh-session";

/// Reads the session JSON left in localStorage by the token exchange
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageSessionStore;

impl SessionStore for LocalStorageSessionStore {
    fn load(&self) -> Result<Option<Session>, BootstrapError> {
        let Some(raw) = read_local_storage(SESSION_STORAGE_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt entry is treated as signed out, never as signed in
                tracing::warn!("Ignoring unreadable stored session: {}", e);
                Ok(None)
            }
        }
    }
}

/// Navigates the current tab
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    #[cfg(target_arch = "wasm32")]
    fn navigate(&self, url: &Url) -> Result<(), BootstrapError> {
        let window =
            web_sys::window().ok_or_else(|| BootstrapError::Navigation("No window".to_string()))?;
        window
            .location()
            .assign(url.as_str())
            .map_err(|e| BootstrapError::Navigation(format!("{:?}", e)))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn navigate(&self, url: &Url) -> Result<(), BootstrapError> {
        Err(BootstrapError::Navigation(format!(
            "cannot navigate to {} outside the browser",
            url
        )))
    }
}

#[cfg(target_arch = "wasm32")]
fn read_local_storage(key: &str) -> Result<Option<String>, BootstrapError> {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| BootstrapError::Storage("localStorage unavailable".to_string()))?;
    storage
        .get_item(key)
        .map_err(|e| BootstrapError::Storage(format!("{:?}", e)))
}

#[cfg(not(target_arch = "wasm32"))]
fn read_local_storage(_key: &str) -> Result<Option<String>, BootstrapError> {
    Ok(None)
}
