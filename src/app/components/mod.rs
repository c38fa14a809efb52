//! Shared UI components for the shell.

pub mod error_alert;
pub mod loading;
pub mod theme;

pub use error_alert::ConfigErrorAlert;
pub use loading::LoadingIndicator;
pub use theme::ThemeToggle;
