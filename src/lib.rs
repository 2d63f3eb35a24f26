//! # forge-llm
//!
//! 统一多厂商 LLM 客户端的弹性核心：响应缓存、限流、重试与可观测性。
//!
//! Resilience core for a unified multi-provider LLM client. Every outbound
//! provider call passes through four independent components before and after
//! the provider adapter does its HTTP work:
//!
//! - **Response cache** - content-addressable TTL + LRU cache that
//!   short-circuits identical deterministic calls ([`cache`] module)
//! - **Rate limiter** - per-provider sliding-window admission control with
//!   burst allowance ([`resilience::rate_limiter`])
//! - **Retry policy** - failure classification and exponential backoff with
//!   jitter, honoring server-supplied retry hints ([`resilience::retry`])
//! - **Observability bus** - typed lifecycle events fanned out to isolated
//!   observers ([`observability`])
//!
//! The components are composed by [`Client`], which owns one instance of each
//! per configured provider. This layer performs no HTTP I/O itself and knows
//! nothing about vendor wire formats; providers plug in through the
//! [`Provider`] trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forge_llm::{ChatRequest, ClientBuilder, Message};
//! use forge_llm::observability::observers::LoggingObserver;
//! use std::sync::Arc;
//!
//! # async fn run(provider: Arc<dyn forge_llm::Provider>) -> forge_llm::Result<()> {
//! let client = ClientBuilder::new()
//!     .with_provider(provider)
//!     .add_observer(Arc::new(LoggingObserver::new()))
//!     .build()?;
//!
//! let request = ChatRequest::new(vec![Message::user("Hello!")])?;
//! let response = client.chat(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Domain records (messages, tool calls, responses) |
//! | [`cache`] | Response caching with TTL and LRU eviction |
//! | [`resilience`] | Rate limiting and retry policies |
//! | [`observability`] | Lifecycle events, bus and built-in observers |
//! | [`client`] | Orchestrating client and builder |

pub mod cache;
pub mod client;
pub mod observability;
pub mod resilience;
pub mod types;

// Re-export main types for convenience
pub use client::{ChunkStream, Client, ClientBuilder, Provider};
pub use observability::{Event, ObservabilityBus, ObservabilityConfig, Observer};
pub use types::{
    message::{Message, MessageRole, TokenUsage},
    request::ChatRequest,
    response::{ChatChunk, ChatResponse},
    tool::{ToolCall, ToolDefinition},
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream of fallible items
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorKind, LimitType};
