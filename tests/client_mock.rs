//! End-to-end control flow through the client with a scripted provider.

use async_trait::async_trait;
use forge_llm::cache::CacheConfig;
use forge_llm::observability::Observer;
use forge_llm::resilience::{RateLimitConfig, RetryConfig};
use forge_llm::types::{ChatChunk, ChatRequest, ChatResponse, Message, TokenUsage};
use forge_llm::{
    ChunkStream, ClientBuilder, Error, Event, Provider, Result,
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted provider: fails the first `fail_times` calls, then succeeds.
struct MockProvider {
    calls: AtomicU32,
    fail_times: u32,
    failure: fn() -> Error,
}

impl MockProvider {
    fn ok() -> Self {
        Self::failing(0, || unreachable!())
    }

    fn failing(fail_times: u32, failure: fn() -> Error) -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_times,
            failure,
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-large"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_times {
            return Err((self.failure)());
        }
        let model = request.model.clone().unwrap_or_else(|| "mock-large".into());
        ChatResponse::new("pong", model, "mock", TokenUsage::new(12, 3))
    }

    async fn chat_stream(&self, _request: &ChatRequest) -> Result<ChunkStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let chunks = vec![
            Ok(ChatChunk::content("po")),
            Ok(ChatChunk::content("ng")),
            Ok(ChatChunk {
                finish_reason: Some("stop".into()),
                usage: Some(TokenUsage::new(12, 3)),
                ..ChatChunk::default()
            }),
        ];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.kind()).collect()
    }
}

#[async_trait]
impl Observer for RecordingObserver {
    async fn on_event(&self, event: &Event) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn deterministic_request() -> ChatRequest {
    ChatRequest::new(vec![Message::user("ping")])
        .unwrap()
        .with_temperature(0.0)
}

fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::new()
        .with_max_retries(max_retries)
        .with_base_delay(Duration::from_millis(1))
        .with_jitter(false)
}

#[tokio::test]
async fn identical_deterministic_calls_hit_the_cache() {
    let provider = Arc::new(MockProvider::ok());
    let client = ClientBuilder::new()
        .with_provider(provider.clone())
        .build()
        .unwrap();

    let request = deterministic_request();
    let first = client.chat(&request).await.unwrap();
    let second = client.chat(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.call_count(), 1, "second call served from cache");
    assert_eq!(client.cache_stats().hits, 1);
}

#[tokio::test]
async fn non_deterministic_requests_bypass_the_cache() {
    let provider = Arc::new(MockProvider::ok());
    let client = ClientBuilder::new()
        .with_provider(provider.clone())
        .build()
        .unwrap();

    let request = ChatRequest::new(vec![Message::user("ping")]).unwrap();
    client.chat(&request).await.unwrap();
    client.chat(&request).await.unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(client.cache_stats().hits, 0);
}

#[tokio::test]
async fn cache_disabled_through_config() {
    let provider = Arc::new(MockProvider::ok());
    let client = ClientBuilder::new()
        .with_provider(provider.clone())
        .with_cache_config(CacheConfig::default().with_require_deterministic(false))
        .without_cache()
        .build()
        .unwrap();

    let request = deterministic_request();
    client.chat(&request).await.unwrap();
    client.chat(&request).await.unwrap();
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn transient_failure_retried_with_events() {
    let provider = Arc::new(MockProvider::failing(1, || Error::Api {
        provider: "mock".into(),
        status: Some(503),
        message: "overloaded".into(),
        retryable: true,
    }));
    let recording = Arc::new(RecordingObserver::default());
    let client = ClientBuilder::new()
        .with_provider(provider.clone())
        .with_retry_config(fast_retry(3))
        .add_observer(recording.clone())
        .build()
        .unwrap();

    let response = client.chat(&deterministic_request()).await.unwrap();
    assert_eq!(response.content, "pong");
    assert_eq!(provider.call_count(), 2);
    assert_eq!(recording.kinds(), vec!["chat_start", "retry", "chat_complete"]);
}

#[tokio::test]
async fn authentication_fails_once_and_emits_error() {
    let provider = Arc::new(MockProvider::failing(u32::MAX, || Error::Authentication {
        provider: "mock".into(),
        message: "invalid key".into(),
    }));
    let recording = Arc::new(RecordingObserver::default());
    let client = ClientBuilder::new()
        .with_provider(provider.clone())
        .with_retry_config(fast_retry(5))
        .add_observer(recording.clone())
        .build()
        .unwrap();

    let result = client.chat(&deterministic_request()).await;
    assert!(matches!(result.unwrap_err(), Error::Authentication { .. }));
    assert_eq!(provider.call_count(), 1);
    assert_eq!(recording.kinds(), vec!["chat_start", "chat_error"]);

    let events = recording.events.lock().unwrap();
    match &events[1] {
        Event::ChatError(e) => {
            assert_eq!(e.error_type, "authentication");
            assert!(!e.retryable);
        }
        other => panic!("expected ChatError, got {other:?}"),
    }
}

#[tokio::test]
async fn exhaustion_surfaces_retry_exhausted() {
    let provider = Arc::new(MockProvider::failing(u32::MAX, || Error::Timeout {
        provider: "mock".into(),
        message: "deadline".into(),
    }));
    let client = ClientBuilder::new()
        .with_provider(provider.clone())
        .with_retry_config(fast_retry(2))
        .build()
        .unwrap();

    let result = client.chat(&deterministic_request()).await;
    match result.unwrap_err() {
        Error::RetryExhausted { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn limiter_raises_when_waiting_disabled() {
    let provider = Arc::new(MockProvider::ok());
    let recording = Arc::new(RecordingObserver::default());
    let client = ClientBuilder::new()
        .with_provider(provider.clone())
        .without_cache()
        .with_rate_limit_config(
            RateLimitConfig::new()
                .with_requests_per_minute(1)
                .with_burst_allowance(0)
                .with_wait_on_limit(false),
        )
        .add_observer(recording.clone())
        .build()
        .unwrap();

    let request = deterministic_request();
    client.chat(&request).await.unwrap();
    let result = client.chat(&request).await;
    assert!(matches!(
        result.unwrap_err(),
        Error::RateLimitExceeded { .. }
    ));
    // The provider was only reached once; the limiter stopped the second.
    assert_eq!(provider.call_count(), 1);
    assert_eq!(
        recording.kinds(),
        vec!["chat_start", "chat_complete", "chat_start", "chat_error"]
    );
}

#[tokio::test]
async fn chat_text_rejects_empty_input() {
    let client = ClientBuilder::new()
        .with_provider(Arc::new(MockProvider::ok()))
        .build()
        .unwrap();
    assert!(matches!(
        client.chat_text("   ").await.unwrap_err(),
        Error::Validation(_)
    ));
}

#[tokio::test]
async fn streaming_emits_chunk_events() {
    let provider = Arc::new(MockProvider::ok());
    let recording = Arc::new(RecordingObserver::default());
    let client = ClientBuilder::new()
        .with_provider(provider.clone())
        .add_observer(recording.clone())
        .build()
        .unwrap();

    let request = ChatRequest::new(vec![Message::user("ping")]).unwrap();
    let mut stream = client.chat_stream(&request).await.unwrap();

    let mut content = String::new();
    while let Some(chunk) = stream.next().await {
        if let Some(delta) = chunk.unwrap().delta {
            content.push_str(&delta);
        }
    }
    assert_eq!(content, "pong");

    let events = recording.events.lock().unwrap();
    let chunk_indices: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            Event::StreamChunk(c) => Some(c.chunk_index),
            _ => None,
        })
        .collect();
    assert_eq!(chunk_indices, vec![0, 1, 2]);
    assert_eq!(events[0].kind(), "chat_start");
}
