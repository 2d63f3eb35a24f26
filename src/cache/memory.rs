//! Cache implementations.

use super::key::CacheKey;
use crate::types::ChatResponse;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Configuration for the response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub default_ttl: Duration,
    pub max_entries: usize,
    /// Responses carrying tool calls are side-effecting; skip them unless
    /// explicitly opted in.
    pub cache_tool_calls: bool,
    /// Only cache requests with temperature 0. Enforced by the client, which
    /// sees the request parameters; the cache only sees keys.
    pub require_deterministic: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: Duration::from_secs(300),
            max_entries: 1000,
            cache_tool_calls: false,
            require_deterministic: true,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_cache_tool_calls(mut self, cache_tool_calls: bool) -> Self {
        self.cache_tool_calls = cache_tool_calls;
        self
    }

    pub fn with_require_deterministic(mut self, require_deterministic: bool) -> Self {
        self.require_deterministic = require_deterministic;
        self
    }
}

/// Monotonic cache usage counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheEntry {
    response: ChatResponse,
    created_at: Instant,
    ttl: Duration,
    hit_count: u64,
}

impl CacheEntry {
    fn new(response: ChatResponse, ttl: Duration) -> Self {
        Self {
            response,
            created_at: Instant::now(),
            ttl,
            hit_count: 0,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Uniform interface over the cache variants so callers never branch on
/// whether caching is enabled.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the cached response only if present and not expired.
    async fn get(&self, key: &CacheKey) -> Option<ChatResponse>;

    /// Stores a response; a no-op when the cache is disabled or the response
    /// carries tool calls without `cache_tool_calls`.
    async fn set(&self, key: &CacheKey, response: ChatResponse, ttl: Option<Duration>);

    async fn delete(&self, key: &CacheKey) -> bool;

    async fn clear(&self);

    fn stats(&self) -> CacheStats;
}

/// In-memory TTL + LRU cache.
///
/// One mutex guards the map, the access-order queue and the counters; the
/// lock is never held across an await point.
pub struct InMemoryCache {
    config: CacheConfig,
    inner: Mutex<Inner>,
}

struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// Front is least recently used; every hit or insert moves the key to
    /// the back.
    access_order: VecDeque<String>,
    stats: CacheStats,
}

impl InMemoryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                access_order: VecDeque::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl Inner {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
        self.access_order.push_back(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
    }

    fn evict_oldest(&mut self) -> bool {
        match self.access_order.pop_front() {
            Some(oldest) => {
                if self.entries.remove(&oldest).is_some() {
                    self.stats.evictions += 1;
                }
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ResponseCache for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<ChatResponse> {
        if !self.config.enabled {
            return None;
        }
        let key_str = key.to_string();
        let mut inner = self.inner.lock().unwrap();

        let expired = match inner.entries.get(&key_str) {
            None => {
                inner.stats.misses += 1;
                return None;
            }
            Some(entry) => entry.is_expired(),
        };

        if expired {
            inner.remove(&key_str);
            inner.stats.expirations += 1;
            inner.stats.misses += 1;
            return None;
        }

        inner.touch(&key_str);
        inner.stats.hits += 1;
        inner.entries.get_mut(&key_str).map(|entry| {
            entry.hit_count += 1;
            entry.response.clone()
        })
    }

    async fn set(&self, key: &CacheKey, response: ChatResponse, ttl: Option<Duration>) {
        if !self.config.enabled {
            return;
        }
        if !self.config.cache_tool_calls && response.has_tool_calls() {
            return;
        }
        let key_str = key.to_string();
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let mut inner = self.inner.lock().unwrap();

        while inner.entries.len() >= self.config.max_entries {
            if !inner.evict_oldest() {
                break;
            }
        }
        inner.entries.insert(key_str.clone(), CacheEntry::new(response, ttl));
        inner.touch(&key_str);
    }

    async fn delete(&self, key: &CacheKey) -> bool {
        let key_str = key.to_string();
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.contains_key(&key_str) {
            inner.remove(&key_str);
            true
        } else {
            false
        }
    }

    async fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.access_order.clear();
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        CacheStats {
            total_entries: inner.entries.len(),
            ..inner.stats.clone()
        }
    }
}

/// Pass-through cache for disabled caching.
#[derive(Debug, Default)]
pub struct NoOpCache;

impl NoOpCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResponseCache for NoOpCache {
    async fn get(&self, _key: &CacheKey) -> Option<ChatResponse> {
        None
    }

    async fn set(&self, _key: &CacheKey, _response: ChatResponse, _ttl: Option<Duration>) {}

    async fn delete(&self, _key: &CacheKey) -> bool {
        false
    }

    async fn clear(&self) {}

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_zero_without_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_calculation() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn config_builders() {
        let config = CacheConfig::new()
            .with_default_ttl(Duration::from_secs(60))
            .with_max_entries(10)
            .with_cache_tool_calls(true);
        assert_eq!(config.default_ttl, Duration::from_secs(60));
        assert_eq!(config.max_entries, 10);
        assert!(config.cache_tool_calls);
        assert!(config.enabled);
    }

    #[test]
    fn entry_expiry_is_derived() {
        let response = crate::types::ChatResponse::new(
            "hi",
            "m",
            "p",
            crate::types::TokenUsage::default(),
        )
        .unwrap();
        let entry = CacheEntry::new(response, Duration::from_secs(60));
        assert!(!entry.is_expired());

        let entry = CacheEntry {
            created_at: Instant::now() - Duration::from_secs(2),
            ttl: Duration::from_secs(1),
            ..entry
        };
        assert!(entry.is_expired());
    }
}
