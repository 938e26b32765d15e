use super::{
    errors::{run_caught, SpawnError},
    model::{Outcome, Tally, TaskMetrics},
};
use std::sync::Arc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore},
    task::JoinHandle,
};


/// Группа блокирующих задач с агрегацией первой ошибки.
///
/// Без лимита каждая задача стартует сразу. С лимитом `spawn` ждет
/// свободный слот, так что одновременно выполняется не больше `limit`
/// задач. Соседние задачи при ошибке не отменяются.
pub struct TaskGroup {
    semaphore: Option<Arc<Semaphore>>,
    limit: Option<usize>,
    tasks: FuturesUnordered<JoinHandle<()>>,
    tally: Arc<Tally>,
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGroup {
    pub fn new() -> Self {
        Self {
            semaphore: None,
            limit: None,
            tasks: FuturesUnordered::new(),
            tally: Arc::new(Tally::default()),
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Some(Arc::new(Semaphore::new(limit))),
            limit: Some(limit),
            ..Self::new()
        }
    }

    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub async fn spawn<F>(&mut self, f: F)
    where
        F: FnOnce() -> Result<(), SpawnError> + Send + 'static,
    {
        // Семафор группы никогда не закрывается
        let permit = match &self.semaphore {
            Some(sem) => Arc::clone(sem).acquire_owned().await.ok(),
            None => None,
        };
        self.push(f, permit);
    }

    /// Запускает задачу, только если есть свободный слот
    pub fn try_spawn<F>(&mut self, f: F) -> bool
    where
        F: FnOnce() -> Result<(), SpawnError> + Send + 'static,
    {
        let permit = match &self.semaphore {
            Some(sem) => match Arc::clone(sem).try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => return false,
            },
            None => None,
        };
        self.push(f, permit);
        true
    }

    fn push<F>(&mut self, f: F, permit: Option<OwnedSemaphorePermit>)
    where
        F: FnOnce() -> Result<(), SpawnError> + Send + 'static,
    {
        self.tally.start();
        let tally = Arc::clone(&self.tally);
        self.tasks.push(tokio::task::spawn_blocking(move || {
            tally.finish(run_caught(f));
            drop(permit);
        }));
    }

    pub fn metrics(&self) -> TaskMetrics {
        self.tally.metrics()
    }

    /// Дожидается всех задач; возвращает счетчики и первую ошибку
    pub async fn wait(mut self) -> Outcome {
        while let Some(joined) = self.tasks.next().await {
            if let Err(join_err) = joined {
                // Задача не дошла до учета: рантайм остановлен
                self.tally.finish(Err(SpawnError::from(join_err)));
            }
        }
        self.tally.take_outcome()
    }
}
