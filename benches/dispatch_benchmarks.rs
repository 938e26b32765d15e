use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pooled_dispatch::{dispatch, BufferPools, Config, Runner, Scenario, Strategy};
use std::{hint::black_box, sync::Arc};

const CALLS: usize = 64;

fn create_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .unwrap()
}

// Один сценарий (размер буфера × тяжесть задачи) на группу, стратегии внутри
fn bench_scenarios(c: &mut Criterion) {
    let rt = create_runtime();
    let pools = BufferPools::new();
    let config = Config::default();

    for scenario in Scenario::ALL {
        let mut group = c.benchmark_group(scenario.name());
        group.sample_size(10);
        group.throughput(Throughput::Elements(CALLS as u64));

        let runner = Arc::new(Runner::new(pools.get(scenario.size), scenario.weight.job()));

        for strategy in Strategy::all(&config) {
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), CALLS),
                &strategy,
                |b, &strategy| {
                    let runner = &runner;
                    b.to_async(&rt).iter(|| async move {
                        let report = dispatch(Arc::clone(runner), CALLS, strategy).await;
                        black_box(report.completed)
                    });
                },
            );
        }

        group.finish();
    }
}

// Только стоимость get/put без задачи
fn bench_pool_acquire(c: &mut Criterion) {
    let pools = BufferPools::new();
    let mut group = c.benchmark_group("pool_acquire");

    for (name, pool) in [("small", pools.small()), ("big", pools.big())] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let buf = pool.acquire();
                black_box(buf.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scenarios, bench_pool_acquire);
criterion_main!(benches);
