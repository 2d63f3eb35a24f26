//! 响应缓存模块：基于内容指纹的 TTL + LRU 缓存，避免重复调用相同的确定性请求。
//!
//! # Response Caching Module
//!
//! Content-addressable caching for chat responses. A request is fingerprinted
//! into a [`CacheKey`] (provider, model and stable hashes of its messages,
//! tools and response format); identical deterministic requests then
//! short-circuit without touching the provider.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheKey`] | Immutable request fingerprint |
//! | [`ResponseCache`] | Trait implemented by every cache variant |
//! | [`InMemoryCache`] | TTL + LRU in-memory implementation |
//! | [`NoOpCache`] | Pass-through for disabled caching |
//! | [`CacheConfig`] | Cache behavior and limits |
//! | [`CacheStats`] | Hit/miss/eviction counters |
//!
//! Entries expire after their TTL and are evicted least-recently-used first
//! once `max_entries` is reached. Responses carrying tool calls are not
//! stored unless `cache_tool_calls` is set; tool-call responses are
//! side-effecting artifacts.

mod key;
mod memory;

pub use key::CacheKey;
pub use memory::{CacheConfig, CacheStats, InMemoryCache, NoOpCache, ResponseCache};
