// Criterion benchmarks over the eviction engines with a shared key stream.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evict_rs::{LfuCache, LruCache, MruCache, RrCache, TtlCache};
use std::time::Duration;

const CACHE_SIZE: usize = 1_000;
const NUM_OPERATIONS: usize = 10_000;

// Simple linear congruential generator for reproducible benchmarks
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(1103515245).wrapping_add(12345) & 0x7fffffff;
        self.state
    }
}

/// A skewed key stream: most accesses hit a small hot set, the tail is cold.
fn key_stream(len: usize) -> Vec<u64> {
    let mut rng = SimpleRng::new(42);
    (0..len)
        .map(|_| {
            let r = rng.next_u64();
            if r % 100 < 80 {
                r % 100 // hot set
            } else {
                r % 4_000 // cold tail
            }
        })
        .collect()
}

fn bench_lru(c: &mut Criterion) {
    let keys = key_stream(NUM_OPERATIONS);
    c.bench_function("lru_mixed", |b| {
        b.iter(|| {
            let mut cache = LruCache::new(CACHE_SIZE).unwrap();
            for &key in &keys {
                if key % 3 == 0 {
                    cache.put(key, key);
                } else {
                    black_box(cache.get(&key));
                }
            }
        })
    });
}

fn bench_mru(c: &mut Criterion) {
    let keys = key_stream(NUM_OPERATIONS);
    c.bench_function("mru_mixed", |b| {
        b.iter(|| {
            let mut cache = MruCache::new(CACHE_SIZE).unwrap();
            for &key in &keys {
                if key % 3 == 0 {
                    cache.put(key, key);
                } else {
                    black_box(cache.get(&key));
                }
            }
        })
    });
}

fn bench_lfu(c: &mut Criterion) {
    let keys = key_stream(NUM_OPERATIONS);
    c.bench_function("lfu_mixed", |b| {
        b.iter(|| {
            let mut cache = LfuCache::new(CACHE_SIZE).unwrap();
            for &key in &keys {
                if key % 3 == 0 {
                    cache.put(key, key);
                } else {
                    black_box(cache.get(&key));
                }
            }
        })
    });
}

fn bench_rr(c: &mut Criterion) {
    let keys = key_stream(NUM_OPERATIONS);
    c.bench_function("rr_mixed", |b| {
        b.iter(|| {
            let cache = RrCache::new(CACHE_SIZE).unwrap();
            for &key in &keys {
                if key % 3 == 0 {
                    cache.put(key, key);
                } else {
                    black_box(cache.get(&key));
                }
            }
        })
    });
}

fn bench_ttl_set_get(c: &mut Criterion) {
    let keys = key_stream(NUM_OPERATIONS);
    let cache: TtlCache<u64, u64> = TtlCache::new();
    c.bench_function("ttl_set_get", |b| {
        b.iter(|| {
            for &key in &keys {
                if key % 3 == 0 {
                    cache.set(key, key, Duration::from_secs(60));
                } else {
                    black_box(cache.get(&key));
                }
            }
        })
    });
    cache.stop();
}

criterion_group!(
    benches,
    bench_lru,
    bench_mru,
    bench_lfu,
    bench_rr,
    bench_ttl_set_get
);
criterion_main!(benches);
