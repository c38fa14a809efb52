//! Lifecycle event bus
//!
//! Uses tokio::sync::broadcast for pub/sub pattern. Every step of the
//! bootstrap (config load, identity setup, status changes, redirects, theme
//! changes) is published here so it can be observed without touching the
//! state machines themselves.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::bootstrap::status::BootstrapStatus;
use crate::theme::ThemeMode;

/// Event types that can be published on the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ShellEvent {
    // Configuration events
    ConfigLoaded { location: String },
    ConfigFailed { location: String, reason: String },

    // Identity client events
    IdentityConfigured,
    IdentityConfigureFailed { reason: String },
    StatusChanged { from: BootstrapStatus, to: BootstrapStatus },
    SignInRedirect { provider: String },
    SignInRedirectFailed { provider: String, reason: String },

    /// A result arrived after the shell was torn down and was dropped
    LateResultIgnored { stage: String },

    // Theme events
    ThemeChanged { mode: ThemeMode },
}

/// Event bus handle for publishing and subscribing
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ShellEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ShellEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events
    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.sender.subscribe()
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    /// Default capacity (64 events); the bootstrap emits only a handful
    fn default() -> Self {
        Self::new(64)
    }
}

/// Shared event bus wrapped in Arc for sharing between collaborators
pub type SharedBus = Arc<EventBus>;

/// Create a new shared event bus
pub fn create_bus() -> SharedBus {
    Arc::new(EventBus::default())
}

/// Drain every event currently queued on a receiver (test and diagnostics helper)
pub fn drain(rx: &mut broadcast::Receiver<ShellEvent>) -> Vec<ShellEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
