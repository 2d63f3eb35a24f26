//! 弹性模块：滑动窗口限流与指数退避重试。
//!
//! # Resilience Module
//!
//! Admission control and failure handling for outbound provider calls.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`rate_limiter::SlidingWindowRateLimiter`] | Per-provider sliding-window limits |
//! | [`rate_limiter::CompositeRateLimiter`] | Provider-keyed limiter registry |
//! | [`retry::RetryPolicy`] | Exponential backoff with jitter and hints |
//!
//! The rate limiter admits or delays calls before they reach the provider;
//! the retry policy classifies failures afterwards and re-invokes transient
//! ones. Both are independent and composed by the client.

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::{
    default_rate_limits, CompositeRateLimiter, NoOpRateLimiter, RateLimitConfig, RateLimitStats,
    RateLimiter, SlidingWindowRateLimiter,
};
pub use retry::{is_retryable, RetryConfig, RetryNotice, RetryPolicy};
