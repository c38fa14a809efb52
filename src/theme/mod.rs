//! Theme channel and watcher.
//!
//! The theme is propagated through a process-wide [`ThemeBus`]: any part of
//! the application may publish a raw signal value, and a [`ThemeWatcher`]
//! turns those values into a [`ThemeMode`] that the render layer reads.

mod store;

pub use store::{MemoryThemeStore, ThemeStore};
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileThemeStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use tokio::sync::watch;

use crate::bus::{SharedBus, ShellEvent};

/// Render mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Derive a mode from a raw signal value: only `"dark"` selects dark.
    pub fn parse(s: &str) -> Self {
        match s {
            "dark" => ThemeMode::Dark,
            _ => ThemeMode::Light,
        }
    }

    /// Same as [`ThemeMode::parse`], with an absent signal meaning light.
    pub fn from_signal(value: Option<&str>) -> Self {
        value.map(Self::parse).unwrap_or_default()
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<BTreeMap<u64, Listener>>,
}

/// Publish/subscribe channel for the raw theme signal.
#[derive(Clone, Default)]
pub struct ThemeBus {
    inner: Arc<Listeners>,
}

impl ThemeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus shared by every component of the application.
    pub fn global() -> &'static ThemeBus {
        static GLOBAL: OnceLock<ThemeBus> = OnceLock::new();
        GLOBAL.get_or_init(ThemeBus::new)
    }

    /// Register a callback; it stays registered until the returned guard is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver a signal value to every subscriber, synchronously.
    pub fn publish(&self, value: &str) {
        // Snapshot so callbacks may subscribe or unsubscribe re-entrantly
        let listeners: Vec<Listener> = self
            .inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    pub fn publish_mode(&self, mode: ThemeMode) {
        self.publish(mode.as_str());
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Registration on a [`ThemeBus`]. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    bus: Weak<Listeners>,
}

impl Subscription {
    /// Explicit form of dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}

/// Keeps a [`ThemeMode`] in sync with the theme bus for as long as it lives.
pub struct ThemeWatcher {
    current: Arc<watch::Sender<ThemeMode>>,
    _subscription: Subscription,
}

impl ThemeWatcher {
    /// Start watching: seed from the persisted preference, then follow the bus.
    pub fn mount(bus: &ThemeBus, store: &dyn ThemeStore, events: Option<SharedBus>) -> Self {
        let initial = store.load();
        let (tx, _) = watch::channel(initial);
        let current = Arc::new(tx);

        let sender = Arc::clone(&current);
        let subscription = bus.subscribe(move |value| {
            let mode = ThemeMode::parse(value);
            let changed = sender.send_if_modified(|current| {
                if *current == mode {
                    false
                } else {
                    *current = mode;
                    true
                }
            });
            if changed {
                tracing::debug!("Theme changed to {}", mode.as_str());
                if let Some(events) = &events {
                    events.publish(ShellEvent::ThemeChanged { mode });
                }
            }
        });

        tracing::debug!("Theme watcher mounted (initial: {})", initial.as_str());
        Self {
            current,
            _subscription: subscription,
        }
    }

    pub fn current_theme(&self) -> ThemeMode {
        *self.current.borrow()
    }

    /// Change notifications; fires once per actual mode change.
    pub fn subscribe(&self) -> watch::Receiver<ThemeMode> {
        self.current.subscribe()
    }

    /// Stop watching. Equivalent to dropping the watcher.
    pub fn unmount(self) {}
}
