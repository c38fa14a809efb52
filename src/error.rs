//! Error types for the bootstrap sequence.

use crate::bootstrap::status::BootstrapStatus;

/// Failures raised by the bootstrap collaborators.
///
/// None of these escape the bootstrap: the orchestrator folds each one into
/// a [`BootstrapStatus`] or a recorded load error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootstrapError {
    // ── Configuration ───────────────────────────────────────────────────
    #[error("Failed to fetch configuration from {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("Malformed configuration document: {0}")]
    MalformedDocument(String),

    #[error("Federated parameter `{0}` is not set")]
    MissingFederatedParam(&'static str),

    // ── Identity client ─────────────────────────────────────────────────
    #[error("Identity client is already configured")]
    AlreadyConfigured,

    #[error("Identity client is not configured")]
    NotConfigured,

    #[error("Invalid Auth block: {0}")]
    InvalidAuthBlock(String),

    #[error("No authenticated session")]
    NoSession,

    #[error("Session expired")]
    SessionExpired,

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// A status change the state machine refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid bootstrap transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: BootstrapStatus,
    pub to: BootstrapStatus,
}
