//! Observability Usage Example
//!
//! Wires a client against an in-process provider and shows the three
//! built-in observers side by side: structured log lines, aggregated
//! metrics and user callbacks.
//!
//! Usage:
//!   RUST_LOG=info cargo run --example observability_usage

use async_trait::async_trait;
use forge_llm::observability::observers::{CallbackObserver, LoggingObserver, MetricsObserver};
use forge_llm::types::{ChatRequest, ChatResponse, Message, TokenUsage};
use forge_llm::{ClientBuilder, Error, Provider, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Provider that fails once with a transient error, then answers.
struct FlakyEchoProvider {
    calls: AtomicU32,
}

#[async_trait]
impl Provider for FlakyEchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn default_model(&self) -> &str {
        "echo-1"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(Error::Api {
                provider: "echo".into(),
                status: Some(503),
                message: "simulated overload".into(),
                retryable: true,
            });
        }
        let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        ChatResponse::new(format!("echo: {last}"), "echo-1", "echo", TokenUsage::new(8, 8))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let metrics = Arc::new(MetricsObserver::new());
    let callbacks = CallbackObserver::new()
        .on_retry(|e| async move {
            println!(
                "[callback] retry {}/{} after {:.0}ms ({})",
                e.attempt, e.max_attempts, e.delay_ms, e.error_type
            );
        })
        .on_complete(|e| async move {
            println!(
                "[callback] completed in {:.1}ms with {} tokens",
                e.latency_ms, e.token_usage.total_tokens
            );
        });

    let client = ClientBuilder::new()
        .with_provider(Arc::new(FlakyEchoProvider {
            calls: AtomicU32::new(0),
        }))
        .with_retry_config(
            forge_llm::resilience::RetryConfig::new()
                .with_max_retries(2)
                .with_base_delay(Duration::from_millis(100)),
        )
        .add_observer(Arc::new(LoggingObserver::new()))
        .add_observer(metrics.clone())
        .add_observer(Arc::new(callbacks))
        .build()?;

    // First call: transient failure, one retry, then success.
    let response = client.chat_text("hello observers").await?;
    println!("response: {}", response.content);

    // Second identical call at temperature 0 would be served from cache;
    // the default request is non-deterministic, so it reaches the provider.
    let request = ChatRequest::new(vec![Message::user("hello observers")])?
        .with_temperature(0.0);
    client.chat(&request).await?;
    client.chat(&request).await?;

    let snapshot = metrics.snapshot().await;
    println!("\naggregated metrics:");
    println!("  requests:    {}", snapshot.total_requests);
    println!("  retries:     {}", snapshot.total_retries);
    println!("  tokens:      {}", snapshot.total_tokens);
    println!("  avg latency: {:.1}ms", snapshot.avg_latency_ms());
    println!(
        "  cache stats: {} hits / {} misses",
        client.cache_stats().hits,
        client.cache_stats().misses
    );
    Ok(())
}
