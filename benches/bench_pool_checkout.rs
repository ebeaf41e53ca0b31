//! Criterion benchmark of attach/detach throughput against the fake driver.
//! Workers fan out concurrent checkouts so slot claiming and statement
//! recycling costs show up without any real database latency.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use db2i_pool::prelude::*;
use db2i_pool::test_utils::FakeDriver;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::task::JoinSet;

static TOKIO_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("create tokio runtime"));

static BENCH_CONCURRENCY: LazyLock<usize> = LazyLock::new(|| {
    std::env::var("BENCH_CONCURRENCY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(16)
});

const CHECKOUTS_PER_WORKER: usize = 50;

fn build_pool(increment_size: usize) -> Arc<ConnectionPool> {
    let pool = TOKIO_RUNTIME
        .block_on(
            ConnectionPool::builder(Arc::new(FakeDriver::new()))
                .increment_size(increment_size)
                .build(),
        )
        .expect("build benchmark pool");
    Arc::new(pool)
}

async fn parallel_checkout(
    pool: &Arc<ConnectionPool>,
    concurrency: usize,
) -> Result<(), Db2PoolError> {
    let mut tasks = JoinSet::new();
    for _ in 0..concurrency {
        let pool = Arc::clone(pool);
        tasks.spawn(async move {
            for _ in 0..CHECKOUTS_PER_WORKER {
                let conn = pool.attach().await?;
                pool.detach(&conn).await?;
            }
            Ok::<_, Db2PoolError>(())
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.map_err(|e| Db2PoolError::ConnectionError(format!("worker panicked: {e}")))??;
    }
    Ok(())
}

fn pool_checkout(c: &mut Criterion) {
    let concurrency = *BENCH_CONCURRENCY;
    let mut group = c.benchmark_group("pool_checkout");
    group.throughput(Throughput::Elements((concurrency * CHECKOUTS_PER_WORKER) as u64));

    for increment_size in [1_usize, 8, 32] {
        let pool = build_pool(increment_size);
        group.bench_function(BenchmarkId::new("attach_detach", increment_size), |b| {
            let pool = Arc::clone(&pool);
            b.to_async(&*TOKIO_RUNTIME).iter_custom(move |iters| {
                let pool = Arc::clone(&pool);
                async move {
                    let mut total = Duration::default();
                    for _ in 0..iters {
                        let start = Instant::now();
                        parallel_checkout(&pool, concurrency)
                            .await
                            .expect("parallel checkout");
                        total += start.elapsed();
                    }
                    total
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, pool_checkout);
criterion_main!(benches);
