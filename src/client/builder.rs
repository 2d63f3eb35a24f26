//! Client assembly.

use super::provider::Provider;
use super::Client;
use crate::cache::{CacheConfig, InMemoryCache, NoOpCache, ResponseCache};
use crate::observability::{ObservabilityBus, ObservabilityConfig, Observer};
use crate::resilience::rate_limiter::{
    default_rate_limits, NoOpRateLimiter, RateLimitConfig, RateLimiter, SlidingWindowRateLimiter,
};
use crate::resilience::retry::{RetryConfig, RetryPolicy};
use crate::{Error, Result};
use std::sync::Arc;

/// Builds a [`Client`] from per-component configuration.
///
/// Defaults: in-memory cache, rate limits from the published preset table
/// for the provider's name, default retry policy, enabled bus with no
/// observers.
pub struct ClientBuilder {
    provider: Option<Arc<dyn Provider>>,
    cache_config: CacheConfig,
    rate_limit_config: Option<RateLimitConfig>,
    rate_limiting_enabled: bool,
    retry_config: RetryConfig,
    observability_config: ObservabilityConfig,
    observers: Vec<Arc<dyn Observer>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            cache_config: CacheConfig::default(),
            rate_limit_config: None,
            rate_limiting_enabled: true,
            retry_config: RetryConfig::default(),
            observability_config: ObservabilityConfig::default(),
            observers: Vec::new(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_config.enabled = false;
        self
    }

    /// Overrides the preset table for this provider.
    pub fn with_rate_limit_config(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit_config = Some(config);
        self
    }

    pub fn without_rate_limiting(mut self) -> Self {
        self.rate_limiting_enabled = false;
        self
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    pub fn with_observability_config(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = config;
        self
    }

    pub fn add_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> Result<Client> {
        let provider = self
            .provider
            .ok_or_else(|| Error::Configuration("a provider is required".into()))?;

        let cache: Arc<dyn ResponseCache> = if self.cache_config.enabled {
            Arc::new(InMemoryCache::new(self.cache_config.clone()))
        } else {
            Arc::new(NoOpCache)
        };

        let limiter: Arc<dyn RateLimiter> = if self.rate_limiting_enabled {
            let config = self
                .rate_limit_config
                .unwrap_or_else(|| default_rate_limits(provider.name()));
            Arc::new(SlidingWindowRateLimiter::new(provider.name(), config))
        } else {
            Arc::new(NoOpRateLimiter)
        };

        let bus = Arc::new(ObservabilityBus::new(self.observability_config));
        for observer in self.observers {
            bus.add_observer(observer);
        }

        Ok(Client::new(
            provider,
            cache,
            self.cache_config,
            limiter,
            RetryPolicy::new(self.retry_config),
            bus,
        ))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
