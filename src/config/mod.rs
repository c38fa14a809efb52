//! Configuration management
//!
//! Two kinds of configuration live here:
//! - [`FederatedParams`] / [`BootstrapOptions`]: identity-client parameters
//!   compiled into the bundle and injected into the fetched config document
//! - [`ShellSettings`]: runtime settings of the development host (server only)

pub(crate) mod federated;

pub use federated::{BootstrapOptions, FederatedParams, OAuthParams};

#[cfg(feature = "server")]
use anyhow::Result;
#[cfg(feature = "server")]
use serde::Deserialize;

/// Well-known location of the configuration document
pub const CONFIG_DOCUMENT_PATH: &str = "/aws-exports.json";

/// Get config directory (FSH_CONFIG_DIR, XDG_CONFIG_HOME or platform default)
pub fn get_config_dir() -> std::path::PathBuf {
    if let Ok(dir) = std::env::var("FSH_CONFIG_DIR") {
        return std::path::PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home)
                .join("Library/Application Support/federated-shell");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return std::path::PathBuf::from(xdg).join("federated-shell");
        }
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home).join(".config/federated-shell");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return std::path::PathBuf::from(appdata).join("federated-shell");
        }
    }

    // Fallback to current directory
    std::path::PathBuf::from(".")
}

/// Get the path for a file in the config directory
pub fn get_config_file_path(filename: &str) -> std::path::PathBuf {
    get_config_dir().join(filename)
}

#[cfg(feature = "server")]
#[derive(Debug, Clone, Deserialize)]
pub struct ShellSettings {
    #[serde(default = "default_port")]
    pub port: u16,

    /// File served at [`CONFIG_DOCUMENT_PATH`]
    #[serde(default = "default_document_path")]
    pub document_path: std::path::PathBuf,

    /// Compiled web bundle served for every other path
    #[serde(default = "default_assets_dir")]
    pub assets_dir: std::path::PathBuf,
}

#[cfg(feature = "server")]
fn default_port() -> u16 {
    8080
}

#[cfg(feature = "server")]
fn default_document_path() -> std::path::PathBuf {
    get_config_file_path("aws-exports.json")
}

#[cfg(feature = "server")]
fn default_assets_dir() -> std::path::PathBuf {
    std::path::PathBuf::from("target/dx/federated-shell/release/web/public")
}

#[cfg(feature = "server")]
pub fn load_settings() -> Result<ShellSettings> {
    let config_dir = get_config_dir();

    let mut builder = ::config::Config::builder()
        // Start with defaults
        .set_default("port", i64::from(default_port()))?
        // Load from config file if it exists
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // Override with environment variables (FSH_PORT, FSH_DOCUMENT_PATH, etc.)
        .add_source(
            ::config::Environment::with_prefix("FSH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    // PORT is honoured for container platforms; FSH_PORT wins when both are set
    if std::env::var("FSH_PORT").is_err() {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                builder = builder.set_override("port", i64::from(port_num))?;
            }
        }
    }

    let settings = builder.build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        for key in ["FSH_PORT", "PORT", "FSH_DOCUMENT_PATH", "FSH_ASSETS_DIR"] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        env::set_var("FSH_CONFIG_DIR", dir.path());

        let settings = load_settings().expect("settings should load");

        env::remove_var("FSH_CONFIG_DIR");

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.document_path, dir.path().join("aws-exports.json"));
    }

    #[test]
    #[serial]
    fn test_config_file_and_env_layering() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "port = 9001\ndocument_path = \"/srv/exports.json\"\n",
        )
        .unwrap();
        env::set_var("FSH_CONFIG_DIR", dir.path());
        env::set_var("FSH_ASSETS_DIR", "/srv/public");

        let settings = load_settings().expect("settings should load");

        env::remove_var("FSH_CONFIG_DIR");
        clear_env();

        assert_eq!(settings.port, 9001);
        assert_eq!(
            settings.document_path,
            std::path::PathBuf::from("/srv/exports.json")
        );
        assert_eq!(settings.assets_dir, std::path::PathBuf::from("/srv/public"));
    }

    #[test]
    #[serial]
    fn test_port_precedence() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        env::set_var("FSH_CONFIG_DIR", dir.path());

        env::set_var("PORT", "3000");
        assert_eq!(load_settings().unwrap().port, 3000);

        env::set_var("FSH_PORT", "4000");
        assert_eq!(load_settings().unwrap().port, 4000);

        env::remove_var("FSH_CONFIG_DIR");
        clear_env();
    }
}
