//! Lifecycle events emitted around provider calls.
//!
//! Events never carry message content: payloads are counts, ids and timings
//! only, so any observer backend can receive them without a privacy review.

use crate::types::TokenUsage;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Emitted when a chat call begins (before cache and admission checks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStartEvent {
    pub timestamp: SystemTime,
    pub request_id: String,
    pub provider: String,
    pub model: Option<String>,
    pub message_count: usize,
    pub has_tools: bool,
}

/// Emitted when a chat call completes successfully (including cache hits).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompleteEvent {
    pub timestamp: SystemTime,
    pub request_id: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: f64,
    pub token_usage: TokenUsage,
    pub finish_reason: String,
    pub tool_calls_count: usize,
}

/// Emitted when a chat call fails after the retry policy gives up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatErrorEvent {
    pub timestamp: SystemTime,
    pub request_id: String,
    pub provider: String,
    pub error_type: String,
    pub error_message: String,
    pub latency_ms: f64,
    pub retryable: bool,
}

/// Emitted before each backoff sleep between attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryEvent {
    pub timestamp: SystemTime,
    pub request_id: String,
    pub provider: String,
    /// 1-based attempt number that just failed.
    pub attempt: u32,
    pub max_attempts: u32,
    pub delay_ms: f64,
    pub error_type: String,
}

/// Emitted per streaming chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunkEvent {
    pub timestamp: SystemTime,
    pub request_id: String,
    pub provider: String,
    pub chunk_index: u64,
    pub has_content: bool,
    pub has_tool_call: bool,
}

/// The closed set of lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum Event {
    ChatStart(ChatStartEvent),
    ChatComplete(ChatCompleteEvent),
    ChatError(ChatErrorEvent),
    Retry(RetryEvent),
    StreamChunk(StreamChunkEvent),
}

impl Event {
    pub fn request_id(&self) -> &str {
        match self {
            Event::ChatStart(e) => &e.request_id,
            Event::ChatComplete(e) => &e.request_id,
            Event::ChatError(e) => &e.request_id,
            Event::Retry(e) => &e.request_id,
            Event::StreamChunk(e) => &e.request_id,
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            Event::ChatStart(e) => &e.provider,
            Event::ChatComplete(e) => &e.provider,
            Event::ChatError(e) => &e.provider,
            Event::Retry(e) => &e.provider,
            Event::StreamChunk(e) => &e.provider,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::ChatStart(_) => "chat_start",
            Event::ChatComplete(_) => "chat_complete",
            Event::ChatError(_) => "chat_error",
            Event::Retry(_) => "retry",
            Event::StreamChunk(_) => "stream_chunk",
        }
    }
}

impl From<ChatStartEvent> for Event {
    fn from(e: ChatStartEvent) -> Self {
        Event::ChatStart(e)
    }
}

impl From<ChatCompleteEvent> for Event {
    fn from(e: ChatCompleteEvent) -> Self {
        Event::ChatComplete(e)
    }
}

impl From<ChatErrorEvent> for Event {
    fn from(e: ChatErrorEvent) -> Self {
        Event::ChatError(e)
    }
}

impl From<RetryEvent> for Event {
    fn from(e: RetryEvent) -> Self {
        Event::Retry(e)
    }
}

impl From<StreamChunkEvent> for Event {
    fn from(e: StreamChunkEvent) -> Self {
        Event::StreamChunk(e)
    }
}
