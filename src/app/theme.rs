//! Theme context with localStorage persistence.
//!
//! Mounts a [`ThemeWatcher`] on the global theme bus for the lifetime of the
//! root component and mirrors its value into a signal.

use dioxus::prelude::*;
use std::rc::Rc;

use crate::theme::{ThemeBus, ThemeMode, ThemeStore, ThemeWatcher};

#[cfg(target_arch = "wasm32")]
const THEME_STORAGE_KEY: &str = "fsh-theme";

/// Global theme state shared via context
#[derive(Clone, Copy)]
pub struct ThemeContext {
    pub current: Signal<ThemeMode>,
}

impl ThemeContext {
    /// Get current theme
    pub fn get(&self) -> ThemeMode {
        (self.current)()
    }

    /// Persist a new theme and announce it on the theme bus.
    /// The watcher picks it up from the bus like any other signal.
    pub fn set(&self, mode: ThemeMode) {
        if let Err(e) = theme_store().save(mode) {
            tracing::warn!("Failed to persist theme: {}", e);
        }
        ThemeBus::global().publish_mode(mode);
    }
}

/// Initialize theme context provider - call once at app root
pub fn use_theme_provider() -> ThemeContext {
    // Dropped with the component, which unsubscribes from the bus
    let watcher = use_hook(|| {
        Rc::new(ThemeWatcher::mount(
            ThemeBus::global(),
            theme_store().as_ref(),
            None,
        ))
    });
    let current = use_signal(|| watcher.current_theme());

    use_hook(|| {
        let mut changes = watcher.subscribe();
        spawn(async move {
            let mut current = current;
            while changes.changed().await.is_ok() {
                let mode = *changes.borrow_and_update();
                current.set(mode);
            }
        })
    });

    let ctx = ThemeContext { current };
    use_context_provider(|| ctx);
    ctx
}

/// Get theme context - use in any component
pub fn use_theme() -> ThemeContext {
    use_context::<ThemeContext>()
}

/// Preference store for the current target
pub fn theme_store() -> Box<dyn ThemeStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(LocalStorageThemeStore)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(crate::theme::FileThemeStore::in_config_dir())
    }
}

// ============ WASM-only helpers ============

#[cfg(target_arch = "wasm32")]
pub struct LocalStorageThemeStore;

#[cfg(target_arch = "wasm32")]
impl ThemeStore for LocalStorageThemeStore {
    fn load(&self) -> ThemeMode {
        if let Some(window) = web_sys::window() {
            if let Ok(Some(storage)) = window.local_storage() {
                if let Ok(Some(value)) = storage.get_item(THEME_STORAGE_KEY) {
                    return ThemeMode::parse(&value);
                }
            }
        }
        ThemeMode::default()
    }

    fn save(&self, mode: ThemeMode) -> Result<(), crate::error::BootstrapError> {
        use crate::error::BootstrapError;

        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| BootstrapError::Storage("localStorage unavailable".to_string()))?;
        storage
            .set_item(THEME_STORAGE_KEY, mode.as_str())
            .map_err(|e| BootstrapError::Storage(format!("{:?}", e)))
    }
}
