//! Built-in observers.

use crate::observability::events::Event;
use crate::Result;
use async_trait::async_trait;

mod callback;
mod logging;
mod metrics;

pub use callback::CallbackObserver;
pub use logging::LoggingObserver;
pub use metrics::{MetricsObserver, UsageMetrics};

/// Capability implemented by any event backend.
///
/// The bus only sees this one method; logging, metrics and tracing backends
/// plug in without the core knowing their identity. Errors returned here are
/// discarded by the bus.
#[async_trait]
pub trait Observer: Send + Sync {
    async fn on_event(&self, event: &Event) -> Result<()>;
}
