//! The consumed provider interface.

use crate::types::{ChatChunk, ChatRequest, ChatResponse};
use crate::{BoxStream, Error, Result};
use async_trait::async_trait;

/// Stream of chat chunks from a provider adapter.
pub type ChunkStream = BoxStream<'static, ChatChunk>;

/// What the resilience layer expects from a provider adapter.
///
/// Adapters own the HTTP work and the vendor wire formats; errors they
/// return must classify through [`crate::Error`] (authentication,
/// rate-limited with an optional hint, timeout, api with a retryable flag).
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn default_model(&self) -> &str;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Streaming variant; adapters that cannot stream keep the default.
    async fn chat_stream(&self, _request: &ChatRequest) -> Result<ChunkStream> {
        Err(Error::Configuration(format!(
            "provider '{}' does not support streaming",
            self.name()
        )))
    }
}
