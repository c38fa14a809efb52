//! Persisted theme preference.

use std::sync::{Mutex, PoisonError};

use super::ThemeMode;
use crate::error::BootstrapError;

/// Key-value store holding the user's theme preference.
pub trait ThemeStore {
    /// Stored preference, or light when nothing usable is stored.
    fn load(&self) -> ThemeMode;

    fn save(&self, mode: ThemeMode) -> Result<(), BootstrapError>;
}

/// In-process store (SSR and tests)
#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    mode: Mutex<ThemeMode>,
}

impl MemoryThemeStore {
    pub fn new(mode: ThemeMode) -> Self {
        Self {
            mode: Mutex::new(mode),
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> ThemeMode {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, mode: ThemeMode) -> Result<(), BootstrapError> {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner) = mode;
        Ok(())
    }
}

/// Plain-text file holding `light` or `dark`
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileThemeStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `theme` file inside the federated-shell config directory
    pub fn in_config_dir() -> Self {
        Self::new(crate::config::get_config_file_path("theme"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ThemeStore for FileThemeStore {
    fn load(&self) -> ThemeMode {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => ThemeMode::parse(content.trim()),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read theme preference {}: {}", self.path.display(), e);
                }
                ThemeMode::default()
            }
        }
    }

    fn save(&self, mode: ThemeMode) -> Result<(), BootstrapError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BootstrapError::Storage(e.to_string()))?;
        }
        std::fs::write(&self.path, mode.as_str()).map_err(|e| BootstrapError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryThemeStore::default();
        assert_eq!(store.load(), ThemeMode::Light);
        store.save(ThemeMode::Dark).unwrap();
        assert_eq!(store.load(), ThemeMode::Dark);
    }

    #[test]
    fn test_file_store_missing_file_is_light() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileThemeStore::new(dir.path().join("theme"));
        assert_eq!(store.load(), ThemeMode::Light);
    }

    #[test]
    fn test_file_store_persists_and_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("theme");
        let store = FileThemeStore::new(&path);

        store.save(ThemeMode::Dark).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "dark");
        assert_eq!(FileThemeStore::new(&path).load(), ThemeMode::Dark);
    }

    #[test]
    fn test_file_store_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme");
        std::fs::write(&path, "  purple\n").unwrap();
        assert_eq!(FileThemeStore::new(&path).load(), ThemeMode::Light);
    }
}
