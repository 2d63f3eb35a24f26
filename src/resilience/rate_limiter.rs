//! Per-provider sliding-window rate limiting.

use crate::{Error, LimitType, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(86_400);

/// Configuration for rate limiting one provider.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub tokens_per_minute: Option<u64>,
    pub requests_per_day: Option<u64>,
    /// Extra requests allowed per minute to absorb short spikes.
    pub burst_allowance: u32,
    /// Sleep until the window frees up instead of raising.
    pub wait_on_limit: bool,
    pub max_wait_seconds: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            tokens_per_minute: None,
            requests_per_day: None,
            burst_allowance: 5,
            wait_on_limit: true,
            max_wait_seconds: 60.0,
        }
    }
}

impl RateLimitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = rpm;
        self
    }

    pub fn with_tokens_per_minute(mut self, tpm: u64) -> Self {
        self.tokens_per_minute = Some(tpm);
        self
    }

    pub fn with_requests_per_day(mut self, rpd: u64) -> Self {
        self.requests_per_day = Some(rpd);
        self
    }

    pub fn with_burst_allowance(mut self, burst: u32) -> Self {
        self.burst_allowance = burst;
        self
    }

    pub fn with_wait_on_limit(mut self, wait: bool) -> Self {
        self.wait_on_limit = wait;
        self
    }

    pub fn with_max_wait_seconds(mut self, seconds: f64) -> Self {
        self.max_wait_seconds = seconds;
        self
    }
}

/// Rate limiting counters and wait accounting.
#[derive(Debug, Clone, Default)]
pub struct RateLimitStats {
    pub requests_this_minute: u64,
    pub requests_this_day: u64,
    pub tokens_this_minute: u64,
    pub waits_triggered: u64,
    pub total_wait_time_ms: f64,
    pub limits_exceeded: u64,
}

impl RateLimitStats {
    pub fn avg_wait_time_ms(&self) -> f64 {
        if self.waits_triggered == 0 {
            0.0
        } else {
            self.total_wait_time_ms / self.waits_triggered as f64
        }
    }
}

/// Sliding window that resets wholesale once its duration elapses.
#[derive(Debug)]
struct RequestWindow {
    window_start: Instant,
    count: u64,
    tokens: u64,
}

impl RequestWindow {
    fn new(window_start: Instant) -> Self {
        Self {
            window_start,
            count: 0,
            tokens: 0,
        }
    }

    fn remaining(&self, duration: Duration, now: Instant) -> Duration {
        duration.saturating_sub(now.duration_since(self.window_start))
    }
}

/// Admission control ahead of a provider call.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Blocks (or raises [`Error::RateLimitExceeded`]) until the call is
    /// admitted under all configured limits. `tokens` is the pre-call
    /// estimate used against the tokens-per-minute budget.
    async fn acquire(&self, tokens: u64) -> Result<()>;

    /// Post-hoc token correction hook. Accounting happens at acquire time,
    /// so the base implementations treat this as a no-op.
    async fn release(&self, tokens_used: u64);

    async fn stats(&self) -> RateLimitStats;

    async fn reset(&self);
}

struct State {
    minute: RequestWindow,
    day: RequestWindow,
    stats: RateLimitStats,
}

impl State {
    fn new(now: Instant) -> Self {
        Self {
            minute: RequestWindow::new(now),
            day: RequestWindow::new(now),
            stats: RateLimitStats::default(),
        }
    }
}

/// Sliding-window rate limiter for a single provider.
///
/// Windows hard-reset when their duration elapses rather than decaying
/// continuously, which biases slightly in favor of the caller at window
/// boundaries. One mutex guards both windows and the counters; it is held
/// across the admission sleep, so same-provider acquires are serialized.
pub struct SlidingWindowRateLimiter {
    provider: String,
    config: RateLimitConfig,
    state: Mutex<State>,
}

impl SlidingWindowRateLimiter {
    pub fn new(provider: impl Into<String>, config: RateLimitConfig) -> Self {
        Self {
            provider: provider.into(),
            config,
            state: Mutex::new(State::new(Instant::now())),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Either raises (wait disabled) or sleeps for the capped window
    /// remainder. The caller resets the breached window afterwards, so the
    /// re-check after waiting passes by construction.
    async fn limit_exceeded(
        &self,
        st: &mut State,
        limit_type: LimitType,
        current: u64,
        limit: u64,
        window_remaining: Duration,
    ) -> Result<()> {
        st.stats.limits_exceeded += 1;

        if !self.config.wait_on_limit {
            return Err(Error::RateLimitExceeded {
                provider: self.provider.clone(),
                limit_type,
                current,
                limit,
                retry_after_seconds: Some(window_remaining.as_secs_f64()),
            });
        }

        let wait = window_remaining.min(Duration::from_secs_f64(self.config.max_wait_seconds));
        if !wait.is_zero() {
            st.stats.waits_triggered += 1;
            st.stats.total_wait_time_ms += wait.as_secs_f64() * 1000.0;
            debug!(
                provider = %self.provider,
                limit_type = %limit_type,
                wait_ms = wait.as_millis() as u64,
                "rate limit reached, waiting for window"
            );
            tokio::time::sleep(wait).await;
        }
        Ok(())
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowRateLimiter {
    async fn acquire(&self, tokens: u64) -> Result<()> {
        let mut st = self.state.lock().await;
        let now = Instant::now();

        if now.duration_since(st.minute.window_start) >= MINUTE {
            st.minute = RequestWindow::new(now);
        }
        if now.duration_since(st.day.window_start) >= DAY {
            st.day = RequestWindow::new(now);
        }

        let effective_rpm = u64::from(self.config.requests_per_minute)
            + u64::from(self.config.burst_allowance);
        if st.minute.count >= effective_rpm {
            let remaining = st.minute.remaining(MINUTE, now);
            let current = st.minute.count;
            self.limit_exceeded(
                &mut st,
                LimitType::RequestsPerMinute,
                current,
                u64::from(self.config.requests_per_minute),
                remaining,
            )
            .await?;
            st.minute = RequestWindow::new(Instant::now());
        }

        // The token budget is checked before incrementing: an estimate that
        // would overflow the window is rejected up front.
        if let Some(tpm) = self.config.tokens_per_minute {
            if st.minute.tokens + tokens > tpm {
                let now = Instant::now();
                let remaining = st.minute.remaining(MINUTE, now);
                let current = st.minute.tokens;
                self.limit_exceeded(
                    &mut st,
                    LimitType::TokensPerMinute,
                    current,
                    tpm,
                    remaining,
                )
                .await?;
                st.minute = RequestWindow::new(Instant::now());
            }
        }

        if let Some(rpd) = self.config.requests_per_day {
            if st.day.count >= rpd {
                let now = Instant::now();
                let remaining = st.day.remaining(DAY, now);
                let current = st.day.count;
                self.limit_exceeded(&mut st, LimitType::RequestsPerDay, current, rpd, remaining)
                    .await?;
                st.day = RequestWindow::new(Instant::now());
            }
        }

        st.minute.count += 1;
        st.minute.tokens += tokens;
        st.day.count += 1;
        st.stats.requests_this_minute = st.minute.count;
        st.stats.requests_this_day = st.day.count;
        st.stats.tokens_this_minute = st.minute.tokens;
        Ok(())
    }

    async fn release(&self, _tokens_used: u64) {}

    async fn stats(&self) -> RateLimitStats {
        self.state.lock().await.stats.clone()
    }

    async fn reset(&self) {
        let mut st = self.state.lock().await;
        *st = State::new(Instant::now());
    }
}

/// A rate limiter that admits everything (for unlimited providers).
#[derive(Debug, Default)]
pub struct NoOpRateLimiter;

impl NoOpRateLimiter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RateLimiter for NoOpRateLimiter {
    async fn acquire(&self, _tokens: u64) -> Result<()> {
        Ok(())
    }

    async fn release(&self, _tokens_used: u64) {}

    async fn stats(&self) -> RateLimitStats {
        RateLimitStats::default()
    }

    async fn reset(&self) {}
}

/// Provider-keyed registry of independent limiters.
///
/// Unconfigured providers get a no-op limiter, so callers never branch on
/// "is this provider rate-limited". Each configured limiter has its own lock
/// and windows; contention across providers is impossible by construction.
#[derive(Default)]
pub struct CompositeRateLimiter {
    limiters: HashMap<String, Arc<SlidingWindowRateLimiter>>,
}

impl CompositeRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure_provider(&mut self, provider: impl Into<String>, config: RateLimitConfig) {
        let provider = provider.into();
        let limiter = Arc::new(SlidingWindowRateLimiter::new(provider.clone(), config));
        self.limiters.insert(provider, limiter);
    }

    pub fn limiter(&self, provider: &str) -> Arc<dyn RateLimiter> {
        match self.limiters.get(provider) {
            Some(limiter) => limiter.clone(),
            None => Arc::new(NoOpRateLimiter),
        }
    }

    pub async fn stats(&self) -> RateLimitStats {
        let mut total = RateLimitStats::default();
        for limiter in self.limiters.values() {
            let s = limiter.stats().await;
            total.requests_this_minute += s.requests_this_minute;
            total.requests_this_day += s.requests_this_day;
            total.tokens_this_minute += s.tokens_this_minute;
            total.waits_triggered += s.waits_triggered;
            total.total_wait_time_ms += s.total_wait_time_ms;
            total.limits_exceeded += s.limits_exceeded;
        }
        total
    }

    pub async fn stats_by_provider(&self) -> HashMap<String, RateLimitStats> {
        let mut stats = HashMap::new();
        for (provider, limiter) in &self.limiters {
            stats.insert(provider.clone(), limiter.stats().await);
        }
        stats
    }

    pub async fn reset(&self) {
        for limiter in self.limiters.values() {
            limiter.reset().await;
        }
    }
}

static DEFAULT_RATE_LIMITS: Lazy<HashMap<&'static str, RateLimitConfig>> = Lazy::new(|| {
    HashMap::from([
        (
            "openai",
            RateLimitConfig::new()
                .with_requests_per_minute(60)
                .with_tokens_per_minute(90_000)
                .with_burst_allowance(10),
        ),
        (
            "anthropic",
            RateLimitConfig::new()
                .with_requests_per_minute(60)
                .with_tokens_per_minute(100_000)
                .with_burst_allowance(10),
        ),
        // Aggregator-style vendors publish higher limits.
        (
            "openrouter",
            RateLimitConfig::new()
                .with_requests_per_minute(200)
                .with_burst_allowance(20),
        ),
    ])
});

/// Published per-provider presets, consumed at client construction time.
/// Unknown providers fall back to the generic defaults.
pub fn default_rate_limits(provider: &str) -> RateLimitConfig {
    DEFAULT_RATE_LIMITS
        .get(provider)
        .cloned()
        .unwrap_or_default()
}
