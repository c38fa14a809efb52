//! Federated Shell
//!
//! Bootstrap layer of a single-page app behind federated sign-in.
//!
//! This library provides:
//! - Config document loading with federated identity parameters injected
//! - An identity gate that redirects to the identity provider when signed out
//! - A theme channel shared by every component of the app
//! - A Dioxus root component wiring the above to the render layer
//! - A development host serving the config document (server feature)

pub mod app;
pub mod bootstrap;
pub mod bus;
pub mod config;
pub mod error;
pub mod identity;
pub mod theme;

#[cfg(feature = "server")]
pub mod api;

pub use bootstrap::{Bootstrap, BootstrapReport, BootstrapStatus, ShellView};
pub use error::{BootstrapError, TransitionError};
pub use theme::{ThemeBus, ThemeMode, ThemeWatcher};
