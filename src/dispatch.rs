//! Стратегии диспетчеризации поверх `Runner`.
//!
//! Сам `Runner` не знает, какая стратегия его вызывает.

use super::{
    errors::{run_caught, SpawnError},
    group::TaskGroup,
    job::Job,
    model::{DispatchReport, Outcome, Tally, TaskMetrics},
    pool::{Config, WorkerPool},
    runner::Runner,
};
use std::{sync::Arc, time::Instant};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Вызовы один за другим
    Sequential,
    /// Отдельная задача на каждый вызов, ошибки по одной
    Unbounded,
    /// Группа без лимита, первая ошибка
    Group,
    /// Группа с лимитом одновременных задач
    LimitedGroup { limit: usize },
    /// Фиксированные воркеры и очередь емкостью workers × queue_depth
    WorkerPool { workers: usize, queue_depth: usize },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Unbounded => "unbounded",
            Strategy::Group => "group-nolimit",
            Strategy::LimitedGroup { .. } => "group",
            Strategy::WorkerPool { .. } => "worker-pool",
        }
    }

    pub fn all(config: &Config) -> [Strategy; 5] {
        [
            Strategy::Sequential,
            Strategy::Unbounded,
            Strategy::Group,
            Strategy::LimitedGroup { limit: config.group_limit },
            Strategy::WorkerPool {
                workers: config.workers,
                queue_depth: config.queue_depth,
            },
        ]
    }
}


/// Выполняет `calls` вызовов `runner.execute()` выбранной стратегией.
/// Требует рантайм tokio.
pub async fn dispatch<J>(runner: Arc<Runner<J>>, calls: usize, strategy: Strategy) -> DispatchReport
where
    J: Job + 'static,
{
    debug!(strategy = strategy.name(), calls, "dispatch started");
    let start = Instant::now();

    let outcome = match strategy {
        Strategy::Sequential => sequential(runner, calls).await,
        Strategy::Unbounded => unbounded(runner, calls).await,
        Strategy::Group => grouped(runner, calls, TaskGroup::new()).await,
        Strategy::LimitedGroup { limit } => {
            grouped(runner, calls, TaskGroup::with_limit(limit)).await
        }
        Strategy::WorkerPool { workers, queue_depth } => {
            let config = Config {
                workers,
                queue_depth,
                ..Config::default()
            };
            worker_pool(runner, calls, config).await
        }
    };

    let report = DispatchReport {
        strategy: strategy.name(),
        calls,
        completed: outcome.metrics.completed,
        failed: outcome.metrics.failed,
        first_error: outcome.first_error,
        elapsed: start.elapsed(),
    };
    debug!(
        strategy = report.strategy,
        completed = report.completed,
        failed = report.failed,
        elapsed = ?report.elapsed,
        "dispatch finished"
    );
    report
}

async fn sequential<J: Job + 'static>(runner: Arc<Runner<J>>, calls: usize) -> Outcome {
    let joined = tokio::task::spawn_blocking(move || {
        let tally = Tally::default();
        for _ in 0..calls {
            tally.start();
            // Паника одного вызова не прерывает цикл
            tally.finish(run_caught(|| runner.execute().map_err(SpawnError::from)));
        }
        tally.take_outcome()
    })
    .await;
    joined.unwrap_or_else(|join_err| failed_outcome(calls, join_err))
}

async fn unbounded<J: Job + 'static>(runner: Arc<Runner<J>>, calls: usize) -> Outcome {
    let tally = Tally::default();
    let mut tasks: FuturesUnordered<_> = (0..calls)
        .map(|_| {
            let runner = Arc::clone(&runner);
            tally.start();
            tokio::task::spawn_blocking(move || {
                run_caught(|| runner.execute().map_err(SpawnError::from))
            })
        })
        .collect();

    while let Some(joined) = tasks.next().await {
        let result = match joined {
            Ok(res) => res,
            Err(join_err) => Err(SpawnError::from(join_err)),
        };
        if let Err(err) = &result {
            warn!(strategy = "unbounded", error = %err, "call failed");
        }
        tally.finish(result);
    }
    tally.take_outcome()
}

async fn grouped<J: Job + 'static>(runner: Arc<Runner<J>>, calls: usize, mut group: TaskGroup) -> Outcome {
    for _ in 0..calls {
        let runner = Arc::clone(&runner);
        group.spawn(move || runner.execute().map_err(SpawnError::from)).await;
    }
    group.wait().await
}

async fn worker_pool<J: Job + 'static>(runner: Arc<Runner<J>>, calls: usize, config: Config) -> Outcome {
    let joined = tokio::task::spawn_blocking(move || {
        let pool = WorkerPool::start(&config, move |()| runner.execute().map_err(SpawnError::from));
        for _ in 0..calls {
            if let Err(err) = pool.submit(()) {
                warn!(strategy = "worker-pool", error = %err, "submit failed");
                break;
            }
        }
        pool.join()
    })
    .await;
    joined.unwrap_or_else(|join_err| failed_outcome(calls, join_err))
}

fn failed_outcome(calls: usize, join_err: tokio::task::JoinError) -> Outcome {
    let err = SpawnError::from(join_err);
    warn!(error = %err, "dispatch driver failed");
    Outcome {
        metrics: TaskMetrics {
            pending: 0,
            completed: 0,
            failed: calls,
        },
        first_error: Some(err),
    }
}
