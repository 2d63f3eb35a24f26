//! 编排客户端：将缓存、限流、重试与事件总线组合到每次调用的控制流中。
//!
//! # Client Module
//!
//! The orchestrating client owns one cache, one rate limiter, one retry
//! policy and one observability bus per configured provider, and threads
//! every outbound call through them:
//!
//! 1. cache lookup - a hit returns without touching the provider
//! 2. rate limiter admission (may suspend, or raise when waiting is off)
//! 3. retry loop around the provider call, emitting retry events
//! 4. cache store + completion event on success, error event on failure
//!
//! The client never swallows provider errors; only the retry policy
//! intercepts them, and only to retry or wrap exhaustion.

mod builder;
mod provider;

pub use builder::ClientBuilder;
pub use provider::{ChunkStream, Provider};

use crate::cache::{CacheConfig, CacheKey, ResponseCache};
use crate::observability::{
    ChatCompleteEvent, ChatErrorEvent, ChatStartEvent, Event, ObservabilityBus, RetryEvent,
    StreamChunkEvent,
};
use crate::resilience::retry::RetryPolicy;
use crate::resilience::RateLimiter;
use crate::types::{ChatRequest, ChatResponse, Message};
use crate::{Error, Result};
use futures::StreamExt;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Per-message token overhead added on top of the character heuristic.
const MESSAGE_OVERHEAD: u64 = 4;

/// Unified client for one provider.
///
/// Construct through [`ClientBuilder`]; each instance owns its resilience
/// components, so clients for different providers share no state and no
/// locks.
pub struct Client {
    provider: Arc<dyn Provider>,
    cache: Arc<dyn ResponseCache>,
    cache_config: CacheConfig,
    limiter: Arc<dyn RateLimiter>,
    retry: RetryPolicy,
    bus: Arc<ObservabilityBus>,
}

impl Client {
    pub(crate) fn new(
        provider: Arc<dyn Provider>,
        cache: Arc<dyn ResponseCache>,
        cache_config: CacheConfig,
        limiter: Arc<dyn RateLimiter>,
        retry: RetryPolicy,
        bus: Arc<ObservabilityBus>,
    ) -> Self {
        Self {
            provider,
            cache,
            cache_config,
            limiter,
            retry,
            bus,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.default_model()
    }

    pub fn observability(&self) -> &Arc<ObservabilityBus> {
        &self.bus
    }

    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }

    pub async fn rate_limit_stats(&self) -> crate::resilience::RateLimitStats {
        self.limiter.stats().await
    }

    /// Convenience for a single user message.
    pub async fn chat_text(&self, content: impl Into<String>) -> Result<ChatResponse> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::Validation("message must not be empty".into()));
        }
        let request = ChatRequest::new(vec![Message::user(content)])?;
        self.chat(&request).await
    }

    /// Send a chat request through the full resilience control flow.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let request_id = ObservabilityBus::generate_request_id();
        let started = Instant::now();
        let provider_name = self.provider.name().to_string();
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string());

        self.bus
            .emit(&Event::ChatStart(ChatStartEvent {
                timestamp: SystemTime::now(),
                request_id: request_id.clone(),
                provider: provider_name.clone(),
                model: Some(model.clone()),
                message_count: request.messages.len(),
                has_tools: request.has_tools(),
            }))
            .await;

        let key = if self.should_cache(request) {
            Some(CacheKey::create(
                &provider_name,
                &model,
                &request.messages,
                request.tools.as_deref(),
                request.response_format.as_ref(),
            )?)
        } else {
            None
        };

        if let Some(ref key) = key {
            if let Some(response) = self.cache.get(key).await {
                self.emit_complete(&request_id, started, &response).await;
                return Ok(response);
            }
        }

        match self.execute(request, &request_id, &provider_name).await {
            Ok(response) => {
                if let Some(ref key) = key {
                    self.cache.set(key, response.clone(), None).await;
                }
                self.emit_complete(&request_id, started, &response).await;
                Ok(response)
            }
            Err(error) => {
                self.emit_error(&request_id, &provider_name, started, &error)
                    .await;
                Err(error)
            }
        }
    }

    /// Send a streaming chat request. The stream short-circuits neither the
    /// cache nor the retry policy (chunks are consumed as they arrive and
    /// cannot be replayed); admission control and events still apply.
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream> {
        let request_id = ObservabilityBus::generate_request_id();
        let started = Instant::now();
        let provider_name = self.provider.name().to_string();
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string());

        self.bus
            .emit(&Event::ChatStart(ChatStartEvent {
                timestamp: SystemTime::now(),
                request_id: request_id.clone(),
                provider: provider_name.clone(),
                model: Some(model),
                message_count: request.messages.len(),
                has_tools: request.has_tools(),
            }))
            .await;

        if let Err(error) = self.limiter.acquire(estimate_tokens(request)).await {
            self.emit_error(&request_id, &provider_name, started, &error)
                .await;
            return Err(error);
        }

        let stream = match self.provider.chat_stream(request).await {
            Ok(stream) => stream,
            Err(error) => {
                self.emit_error(&request_id, &provider_name, started, &error)
                    .await;
                return Err(error);
            }
        };

        let bus = self.bus.clone();
        let mut chunk_index = 0u64;
        let instrumented = stream.then(move |item| {
            let bus = bus.clone();
            let request_id = request_id.clone();
            let provider = provider_name.clone();
            let index = chunk_index;
            chunk_index += 1;
            async move {
                if let Ok(ref chunk) = item {
                    bus.emit(&Event::StreamChunk(StreamChunkEvent {
                        timestamp: SystemTime::now(),
                        request_id,
                        provider,
                        chunk_index: index,
                        has_content: chunk.has_content(),
                        has_tool_call: chunk.has_tool_call(),
                    }))
                    .await;
                }
                item
            }
        });
        Ok(Box::pin(instrumented))
    }

    async fn execute(
        &self,
        request: &ChatRequest,
        request_id: &str,
        provider_name: &str,
    ) -> Result<ChatResponse> {
        self.limiter.acquire(estimate_tokens(request)).await?;

        let provider = self.provider.clone();
        let bus = self.bus.clone();
        let request = request.clone();
        let rid = request_id.to_string();
        let pname = provider_name.to_string();

        let response = self
            .retry
            .run_with_hook(
                provider_name,
                move || {
                    let provider = provider.clone();
                    let request = request.clone();
                    async move { provider.chat(&request).await }
                },
                move |notice| {
                    let bus = bus.clone();
                    let request_id = rid.clone();
                    let provider = pname.clone();
                    async move {
                        bus.emit(&Event::Retry(RetryEvent {
                            timestamp: SystemTime::now(),
                            request_id,
                            provider,
                            attempt: notice.attempt,
                            max_attempts: notice.max_attempts,
                            delay_ms: notice.delay.as_secs_f64() * 1000.0,
                            error_type: notice.error_type.to_string(),
                        }))
                        .await;
                    }
                },
            )
            .await?;

        // Post-hoc correction hook; accounting happened at acquire time.
        self.limiter
            .release(u64::from(response.usage.total_tokens))
            .await;
        Ok(response)
    }

    fn should_cache(&self, request: &ChatRequest) -> bool {
        if !self.cache_config.enabled {
            return false;
        }
        // The cache only sees keys; determinism gating happens here where
        // the request parameters are visible.
        if self.cache_config.require_deterministic && request.temperature > 0.0 {
            return false;
        }
        true
    }

    async fn emit_complete(&self, request_id: &str, started: Instant, response: &ChatResponse) {
        self.bus
            .emit(&Event::ChatComplete(ChatCompleteEvent {
                timestamp: SystemTime::now(),
                request_id: request_id.to_string(),
                provider: response.provider.clone(),
                model: response.model.clone(),
                latency_ms: started.elapsed().as_secs_f64() * 1000.0,
                token_usage: response.usage,
                finish_reason: response.finish_reason.clone(),
                tool_calls_count: response.tool_calls.len(),
            }))
            .await;
    }

    async fn emit_error(
        &self,
        request_id: &str,
        provider_name: &str,
        started: Instant,
        error: &Error,
    ) {
        let retryable = crate::resilience::retry::is_retryable(error, self.retry.config());
        self.bus
            .emit(&Event::ChatError(ChatErrorEvent {
                timestamp: SystemTime::now(),
                request_id: request_id.to_string(),
                provider: provider_name.to_string(),
                error_type: error.error_type().to_string(),
                error_message: error.to_string(),
                latency_ms: started.elapsed().as_secs_f64() * 1000.0,
                retryable,
            }))
            .await;
    }
}

/// Pre-call token estimate for the tokens-per-minute budget. The exact count
/// is only known after the call completes, so this is a character heuristic
/// plus a fixed per-message overhead.
fn estimate_tokens(request: &ChatRequest) -> u64 {
    request
        .messages
        .iter()
        .map(|m| m.content.len() as u64 / 4 + MESSAGE_OVERHEAD)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_estimate_scales_with_content() {
        let short = ChatRequest::new(vec![Message::user("hi")]).unwrap();
        let long = ChatRequest::new(vec![Message::user("x".repeat(400))]).unwrap();
        assert!(estimate_tokens(&long) > estimate_tokens(&short));
        assert_eq!(estimate_tokens(&short), MESSAGE_OVERHEAD);
        assert_eq!(estimate_tokens(&long), 100 + MESSAGE_OVERHEAD);
    }
}
