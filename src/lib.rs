//! Сравнение стратегий диспетчеризации коротких задач над пулом буферов
//!
//! # Features
//! - Потокобезопасный пул буферов фиксированного размера (1KB / 1MB)
//! - `Runner`: взять буфер, выполнить задачу, гарантированно вернуть буфер
//! - Пять стратегий: цикл, задача на вызов, группа без лимита,
//!   группа с лимитом по числу CPU, фиксированный пул воркеров
//! - Первая ошибка или отчет по каждой задаче, в зависимости от стратегии

pub mod buffer;
pub mod dispatch;
pub mod errors;
pub mod group;
pub mod job;
pub mod model;
pub mod pool;
pub mod runner;

pub use buffer::{Buffer, BufferPool, BufferPools, PooledBuffer, SizeClass};
pub use dispatch::{dispatch, Strategy};
pub use errors::{JobError, RunError, SpawnError};
pub use group::TaskGroup;
pub use job::{Job, SleepJob, Weight};
pub use model::{DispatchReport, Outcome, PoolMetrics, Scenario, TaskMetrics};
pub use pool::{Config, WorkerPool};
pub use runner::Runner;
