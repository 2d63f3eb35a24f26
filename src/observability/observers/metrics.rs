//! Aggregated usage metrics.

use super::Observer;
use crate::observability::events::Event;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Aggregated usage counters across calls.
///
/// Counters only increase between [`MetricsObserver::reset`] calls; average
/// latency is recomputed from a running sum and count rather than stored
/// per sample.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageMetrics {
    pub total_requests: u64,
    pub total_tokens: u64,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    pub total_errors: u64,
    pub total_retries: u64,
    pub requests_by_provider: HashMap<String, u64>,
    pub tokens_by_provider: HashMap<String, u64>,
    pub errors_by_type: HashMap<String, u64>,
    pub latency_sum_ms: f64,
    pub latency_count: u64,
}

impl UsageMetrics {
    pub fn avg_latency_ms(&self) -> f64 {
        if self.latency_count == 0 {
            0.0
        } else {
            self.latency_sum_ms / self.latency_count as f64
        }
    }
}

/// Accumulates [`UsageMetrics`] under a mutex.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    metrics: Mutex<UsageMetrics>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clones the current aggregate.
    pub async fn snapshot(&self) -> UsageMetrics {
        self.metrics.lock().await.clone()
    }

    pub async fn reset(&self) {
        *self.metrics.lock().await = UsageMetrics::default();
    }
}

#[async_trait]
impl Observer for MetricsObserver {
    async fn on_event(&self, event: &Event) -> Result<()> {
        let mut metrics = self.metrics.lock().await;
        match event {
            Event::ChatStart(e) => {
                metrics.total_requests += 1;
                *metrics
                    .requests_by_provider
                    .entry(e.provider.clone())
                    .or_insert(0) += 1;
            }
            Event::ChatComplete(e) => {
                let usage = e.token_usage;
                metrics.total_tokens += u64::from(usage.total_tokens);
                metrics.total_prompt_tokens += u64::from(usage.prompt_tokens);
                metrics.total_completion_tokens += u64::from(usage.completion_tokens);
                *metrics
                    .tokens_by_provider
                    .entry(e.provider.clone())
                    .or_insert(0) += u64::from(usage.total_tokens);
                metrics.latency_sum_ms += e.latency_ms;
                metrics.latency_count += 1;
            }
            Event::ChatError(e) => {
                metrics.total_errors += 1;
                *metrics
                    .errors_by_type
                    .entry(e.error_type.clone())
                    .or_insert(0) += 1;
            }
            Event::Retry(_) => {
                metrics.total_retries += 1;
            }
            Event::StreamChunk(_) => {}
        }
        Ok(())
    }
}
