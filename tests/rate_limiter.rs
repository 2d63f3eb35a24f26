//! Rate limiter admission behavior: windows, burst and composite routing.

use forge_llm::resilience::{
    CompositeRateLimiter, NoOpRateLimiter, RateLimitConfig, RateLimiter,
    SlidingWindowRateLimiter,
};
use forge_llm::{Error, LimitType};
use std::time::{Duration, Instant};
use tokio_test::assert_ok;

#[tokio::test]
async fn burst_allows_exactly_limit_plus_allowance() {
    let limiter = SlidingWindowRateLimiter::new(
        "test",
        RateLimitConfig::new()
            .with_requests_per_minute(2)
            .with_burst_allowance(1)
            .with_wait_on_limit(false),
    );

    assert_ok!(limiter.acquire(0).await);
    assert_ok!(limiter.acquire(0).await);
    assert_ok!(limiter.acquire(0).await);

    match limiter.acquire(0).await {
        Err(Error::RateLimitExceeded {
            provider,
            limit_type,
            current,
            limit,
            retry_after_seconds,
        }) => {
            assert_eq!(provider, "test");
            assert_eq!(limit_type, LimitType::RequestsPerMinute);
            assert_eq!(current, 3);
            assert_eq!(limit, 2);
            assert!(retry_after_seconds.unwrap() > 0.0);
        }
        other => panic!("expected RateLimitExceeded, got {:?}", other.map(|_| ())),
    }

    assert_eq!(limiter.stats().await.limits_exceeded, 1);
}

#[tokio::test]
async fn token_budget_rejected_before_counting() {
    let limiter = SlidingWindowRateLimiter::new(
        "test",
        RateLimitConfig::new()
            .with_requests_per_minute(100)
            .with_tokens_per_minute(100)
            .with_wait_on_limit(false),
    );

    assert_ok!(limiter.acquire(60).await);
    // 60 + 60 would overflow the budget; the estimate is rejected up front
    // and the window keeps its previous count.
    match limiter.acquire(60).await {
        Err(Error::RateLimitExceeded { limit_type, current, limit, .. }) => {
            assert_eq!(limit_type, LimitType::TokensPerMinute);
            assert_eq!(current, 60);
            assert_eq!(limit, 100);
        }
        other => panic!("expected RateLimitExceeded, got {:?}", other.map(|_| ())),
    }
    assert_eq!(limiter.stats().await.tokens_this_minute, 60);

    // A smaller request still fits.
    assert_ok!(limiter.acquire(30).await);
    assert_eq!(limiter.stats().await.tokens_this_minute, 90);
}

#[tokio::test]
async fn daily_limit_enforced() {
    let limiter = SlidingWindowRateLimiter::new(
        "test",
        RateLimitConfig::new()
            .with_requests_per_minute(100)
            .with_requests_per_day(2)
            .with_wait_on_limit(false),
    );

    assert_ok!(limiter.acquire(0).await);
    assert_ok!(limiter.acquire(0).await);
    match limiter.acquire(0).await {
        Err(Error::RateLimitExceeded { limit_type, .. }) => {
            assert_eq!(limit_type, LimitType::RequestsPerDay);
        }
        other => panic!("expected RateLimitExceeded, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn waits_capped_then_admits() {
    let limiter = SlidingWindowRateLimiter::new(
        "test",
        RateLimitConfig::new()
            .with_requests_per_minute(1)
            .with_burst_allowance(0)
            .with_wait_on_limit(true)
            .with_max_wait_seconds(0.2),
    );

    assert_ok!(limiter.acquire(0).await);

    let started = Instant::now();
    assert_ok!(limiter.acquire(0).await);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(180), "waited {:?}", elapsed);

    let stats = limiter.stats().await;
    assert_eq!(stats.waits_triggered, 1);
    assert_eq!(stats.limits_exceeded, 1);
    assert!(stats.avg_wait_time_ms() >= 180.0);
    // The breached window was reset before admitting the waiting call.
    assert_eq!(stats.requests_this_minute, 1);
}

#[tokio::test]
async fn reset_clears_all_counters() {
    let limiter = SlidingWindowRateLimiter::new("test", RateLimitConfig::default());
    assert_ok!(limiter.acquire(25).await);
    assert_ok!(limiter.acquire(25).await);

    limiter.reset().await;
    let stats = limiter.stats().await;
    assert_eq!(stats.requests_this_minute, 0);
    assert_eq!(stats.requests_this_day, 0);
    assert_eq!(stats.tokens_this_minute, 0);
    assert_eq!(stats.limits_exceeded, 0);
}

#[tokio::test]
async fn noop_limiter_always_admits() {
    let limiter = NoOpRateLimiter::new();
    for _ in 0..1000 {
        assert_ok!(limiter.acquire(10_000).await);
    }
    assert_eq!(limiter.stats().await.requests_this_minute, 0);
}

#[tokio::test]
async fn composite_routes_by_provider() {
    let mut composite = CompositeRateLimiter::new();
    composite.configure_provider(
        "openai",
        RateLimitConfig::new()
            .with_requests_per_minute(1)
            .with_burst_allowance(0)
            .with_wait_on_limit(false),
    );

    let openai = composite.limiter("openai");
    assert_ok!(openai.acquire(0).await);
    assert!(openai.acquire(0).await.is_err());

    // Unconfigured providers get a no-op limiter; callers never branch.
    let unconfigured = composite.limiter("somewhere-else");
    for _ in 0..10 {
        assert_ok!(unconfigured.acquire(0).await);
    }
}

#[tokio::test]
async fn composite_limits_are_independent() {
    let mut composite = CompositeRateLimiter::new();
    let strict = RateLimitConfig::new()
        .with_requests_per_minute(1)
        .with_burst_allowance(0)
        .with_wait_on_limit(false);
    composite.configure_provider("openai", strict.clone());
    composite.configure_provider("anthropic", strict);

    assert_ok!(composite.limiter("openai").acquire(0).await);
    assert!(composite.limiter("openai").acquire(0).await.is_err());
    // The other provider's window is untouched.
    assert_ok!(composite.limiter("anthropic").acquire(0).await);
}

#[tokio::test]
async fn composite_aggregates_stats() {
    let mut composite = CompositeRateLimiter::new();
    composite.configure_provider("openai", RateLimitConfig::default());
    composite.configure_provider("anthropic", RateLimitConfig::default());

    assert_ok!(composite.limiter("openai").acquire(10).await);
    assert_ok!(composite.limiter("anthropic").acquire(20).await);

    let total = composite.stats().await;
    assert_eq!(total.requests_this_minute, 2);
    assert_eq!(total.tokens_this_minute, 30);

    let by_provider = composite.stats_by_provider().await;
    assert_eq!(by_provider["openai"].tokens_this_minute, 10);
    assert_eq!(by_provider["anthropic"].tokens_this_minute, 20);

    composite.reset().await;
    assert_eq!(composite.stats().await.requests_this_minute, 0);
}
