//! Benchmarks for cache fingerprinting and lookup throughput.
//!
//! Measures:
//! - CacheKey generation (canonical JSON + SHA-256) across message counts
//! - InMemoryCache get/set round-trips under the LRU bookkeeping

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use forge_llm::cache::{CacheConfig, CacheKey, InMemoryCache, ResponseCache};
use forge_llm::types::{ChatResponse, Message, TokenUsage};

fn messages(count: usize) -> Vec<Message> {
    (0..count)
        .map(|i| Message::user(format!("benchmark message number {i} with some padding text")))
        .collect()
}

fn bench_key_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_key");
    for count in [1usize, 8, 64] {
        let msgs = messages(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &msgs, |b, msgs| {
            b.iter(|| {
                CacheKey::create("openai", "gpt-4o", black_box(msgs), None, None).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_cache_round_trip(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");

    let cache = InMemoryCache::new(CacheConfig::default().with_max_entries(10_000));
    let keys: Vec<CacheKey> = (0..256)
        .map(|i| {
            CacheKey::create(
                "openai",
                "gpt-4o",
                &[Message::user(format!("prompt {i}"))],
                None,
                None,
            )
            .unwrap()
        })
        .collect();
    let response =
        ChatResponse::new("cached answer", "gpt-4o", "openai", TokenUsage::new(10, 20)).unwrap();

    runtime.block_on(async {
        for key in &keys {
            cache.set(key, response.clone(), None).await;
        }
    });

    c.bench_function("cache_get_hit", |b| {
        let cache = &cache;
        let keys = &keys;
        b.to_async(&runtime)
            .iter(|| async move { black_box(cache.get(&keys[42]).await) })
    });

    c.bench_function("cache_set", |b| {
        let cache = &cache;
        let keys = &keys;
        let response = &response;
        b.to_async(&runtime)
            .iter(|| async move { cache.set(&keys[7], response.clone(), None).await })
    });
}

criterion_group!(benches, bench_key_generation, bench_cache_round_trip);
criterion_main!(benches);
