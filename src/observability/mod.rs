//! 可观测性模块：类型化生命周期事件的总线与内置观察者。
//!
//! # Observability Module
//!
//! Typed lifecycle events fanned out to independent observers. The bus
//! delivers sequentially in registration order and isolates observer
//! failures: one broken observer never prevents delivery to the rest and
//! never affects the triggering request's outcome.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Event`] | Closed set of lifecycle events |
//! | [`ObservabilityBus`] | Fan-out with failure isolation |
//! | [`Observer`] | Capability implemented by any backend |
//! | [`observers::LoggingObserver`] | Leveled `tracing` log lines |
//! | [`observers::MetricsObserver`] | Aggregated usage metrics |
//! | [`observers::CallbackObserver`] | User-supplied async callbacks |

pub mod events;
pub mod observers;

pub use events::{
    ChatCompleteEvent, ChatErrorEvent, ChatStartEvent, Event, RetryEvent, StreamChunkEvent,
};
pub use observers::Observer;

use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Observability configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Global kill switch; when false, `emit` is a no-op.
    pub enabled: bool,
    /// Message content is never placed in events; this flag is reserved for
    /// observers that want to attach content at their own layer. Off by
    /// default.
    pub capture_content: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capture_content: false,
        }
    }
}

impl ObservabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_capture_content(mut self, capture_content: bool) -> Self {
        self.capture_content = capture_content;
        self
    }
}

/// Fan-out of lifecycle events to registered observers.
///
/// The bus holds non-owning handles: it invokes observers but does not
/// control their lifecycle. Registration order is delivery order.
pub struct ObservabilityBus {
    config: ObservabilityConfig,
    observers: RwLock<Vec<Arc<dyn Observer>>>,
}

impl ObservabilityBus {
    pub fn new(config: ObservabilityConfig) -> Self {
        Self {
            config,
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ObservabilityConfig {
        &self.config
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().unwrap().len()
    }

    /// Registers an observer; re-registering the same instance is a no-op.
    pub fn add_observer(&self, observer: Arc<dyn Observer>) {
        let mut observers = self.observers.write().unwrap();
        if !observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            observers.push(observer);
        }
    }

    /// Removes an observer by instance identity.
    pub fn remove_observer(&self, observer: &Arc<dyn Observer>) {
        self.observers
            .write()
            .unwrap()
            .retain(|o| !Arc::ptr_eq(o, observer));
    }

    pub fn clear_observers(&self) {
        self.observers.write().unwrap().clear();
    }

    /// Delivers the event to every observer in registration order. Observer
    /// errors are discarded so a broken observer cannot block the rest or
    /// leak into the caller's request outcome.
    pub async fn emit(&self, event: &Event) {
        if !self.config.enabled {
            return;
        }
        let snapshot: Vec<Arc<dyn Observer>> = self.observers.read().unwrap().clone();
        for observer in snapshot {
            if let Err(error) = observer.on_event(event).await {
                debug!(
                    request_id = event.request_id(),
                    event_kind = event.kind(),
                    error = %error,
                    "observer failed, continuing delivery"
                );
            }
        }
    }

    /// Unique id correlating all events of one call: `req_` + 12 hex chars.
    pub fn generate_request_id() -> String {
        format!("req_{}", &Uuid::new_v4().simple().to_string()[..12])
    }
}

impl Default for ObservabilityBus {
    fn default() -> Self {
        Self::new(ObservabilityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_format() {
        let id = ObservabilityBus::generate_request_id();
        assert!(id.starts_with("req_"));
        assert_eq!(id.len(), "req_".len() + 12);
        assert!(id["req_".len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn duplicate_registration_ignored() {
        let bus = ObservabilityBus::default();
        let observer: Arc<dyn Observer> = Arc::new(observers::MetricsObserver::new());
        bus.add_observer(observer.clone());
        bus.add_observer(observer.clone());
        assert_eq!(bus.observer_count(), 1);

        bus.remove_observer(&observer);
        assert_eq!(bus.observer_count(), 0);
    }
}
