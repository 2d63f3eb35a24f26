//! Resilience Patterns Example
//!
//! This example demonstrates the resilience components in isolation:
//! - Sliding-window rate limiting with burst allowance
//! - Retry with exponential backoff and failure classification
//! - Composite per-provider rate limiting
//!
//! Usage:
//!   cargo run --example resilience_patterns

use forge_llm::resilience::{
    CompositeRateLimiter, RateLimitConfig, RateLimiter, RetryConfig, RetryPolicy,
    SlidingWindowRateLimiter,
};
use forge_llm::{Error, ErrorKind};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    println!("=== forge-llm Resilience Patterns Demo ===\n");

    demo_rate_limiter().await;
    demo_retry_policy().await;
    demo_composite_limiter().await;
}

async fn demo_rate_limiter() {
    println!("--- Example 1: Rate Limiter ---\n");

    let limiter = SlidingWindowRateLimiter::new(
        "demo",
        RateLimitConfig::new()
            .with_requests_per_minute(3)
            .with_burst_allowance(1)
            .with_wait_on_limit(false),
    );

    println!("Configured: 3 req/min + 1 burst, no waiting\n");

    for i in 1..=5 {
        match limiter.acquire(0).await {
            Ok(()) => println!("Request {}: admitted", i),
            Err(Error::RateLimitExceeded {
                limit_type,
                current,
                limit,
                ..
            }) => println!(
                "Request {}: REJECTED ({} at {}/{})",
                i, limit_type, current, limit
            ),
            Err(e) => println!("Request {}: unexpected error: {}", i, e),
        }
    }

    let stats = limiter.stats().await;
    println!(
        "\nStats: {} this minute, {} limits exceeded\n",
        stats.requests_this_minute, stats.limits_exceeded
    );
}

async fn demo_retry_policy() {
    println!("--- Example 2: Retry Policy ---\n");

    let policy = RetryPolicy::new(
        RetryConfig::new()
            .with_max_retries(3)
            .with_base_delay(Duration::from_millis(50))
            .with_jitter(true)
            .with_retryable_kinds(vec![ErrorKind::RateLimited, ErrorKind::Timeout]),
    );

    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let result = policy
        .run("demo", move || {
            let counter = counter.clone();
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                println!("  attempt {}...", attempt);
                if attempt < 3 {
                    Err(Error::Timeout {
                        provider: "demo".into(),
                        message: "simulated timeout".into(),
                    })
                } else {
                    Ok("success on third attempt")
                }
            }
        })
        .await;

    match result {
        Ok(message) => println!("\nResult: {}\n", message),
        Err(e) => println!("\nResult: failed with {}\n", e),
    }
}

async fn demo_composite_limiter() {
    println!("--- Example 3: Composite Rate Limiter ---\n");

    let mut composite = CompositeRateLimiter::new();
    composite.configure_provider(
        "openai",
        RateLimitConfig::new().with_requests_per_minute(60),
    );
    composite.configure_provider(
        "openrouter",
        RateLimitConfig::new().with_requests_per_minute(200),
    );

    for provider in ["openai", "openrouter", "unconfigured-provider"] {
        let limiter = composite.limiter(provider);
        limiter.acquire(100).await.expect("admission");
        println!("{}: admitted one request", provider);
    }

    let by_provider = composite.stats_by_provider().await;
    println!("\nPer-provider stats:");
    for (provider, stats) in &by_provider {
        println!(
            "  {}: {} requests, {} tokens",
            provider, stats.requests_this_minute, stats.tokens_this_minute
        );
    }
    println!("(the unconfigured provider went through a no-op limiter)\n");
}
