//! Structured log lines per event.

use super::Observer;
use crate::observability::events::Event;
use crate::Result;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// Writes one leveled `tracing` line per event: info for start/complete,
/// error for failures, warn for retries, debug for stream chunks.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observer for LoggingObserver {
    async fn on_event(&self, event: &Event) -> Result<()> {
        match event {
            Event::ChatStart(e) => {
                info!(
                    request_id = %e.request_id,
                    provider = %e.provider,
                    model = e.model.as_deref().unwrap_or("default"),
                    message_count = e.message_count,
                    has_tools = e.has_tools,
                    "chat started"
                );
            }
            Event::ChatComplete(e) => {
                info!(
                    request_id = %e.request_id,
                    provider = %e.provider,
                    model = %e.model,
                    latency_ms = e.latency_ms,
                    total_tokens = e.token_usage.total_tokens,
                    prompt_tokens = e.token_usage.prompt_tokens,
                    completion_tokens = e.token_usage.completion_tokens,
                    finish_reason = %e.finish_reason,
                    tool_calls = e.tool_calls_count,
                    "chat completed"
                );
            }
            Event::ChatError(e) => {
                error!(
                    request_id = %e.request_id,
                    provider = %e.provider,
                    error_type = %e.error_type,
                    error_message = %e.error_message,
                    latency_ms = e.latency_ms,
                    retryable = e.retryable,
                    "chat failed"
                );
            }
            Event::Retry(e) => {
                warn!(
                    request_id = %e.request_id,
                    provider = %e.provider,
                    attempt = e.attempt,
                    max_attempts = e.max_attempts,
                    delay_ms = e.delay_ms,
                    error_type = %e.error_type,
                    "retrying chat call"
                );
            }
            Event::StreamChunk(e) => {
                debug!(
                    request_id = %e.request_id,
                    provider = %e.provider,
                    chunk_index = e.chunk_index,
                    has_content = e.has_content,
                    has_tool_call = e.has_tool_call,
                    "stream chunk"
                );
            }
        }
        Ok(())
    }
}
