use super::{
    errors::{run_caught, SpawnError},
    model::{Outcome, Tally, TaskMetrics},
};
use std::{sync::Arc, thread};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use tracing::{debug, warn};


/// Конфигурация стратегий диспетчеризации
#[derive(Debug, Clone)]
pub struct Config {
    /// Число воркеров фиксированного пула
    pub workers: usize,
    /// Емкость очереди на одного воркера
    pub queue_depth: usize,
    /// Лимит одновременных задач в ограниченной группе
    pub group_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::cpu_bound()
    }
}

impl Config {
    pub const DEFAULT_QUEUE_DEPTH: usize = 100;

    pub fn cpu_bound() -> Self {
        let num_cpus = num_cpus::get();
        Self {
            workers: num_cpus,
            queue_depth: Self::DEFAULT_QUEUE_DEPTH,
            group_limit: num_cpus,
        }
    }

    pub fn io_bound() -> Self {
        let num_cpus = num_cpus::get();
        Self {
            workers: num_cpus * 2,
            queue_depth: Self::DEFAULT_QUEUE_DEPTH,
            group_limit: num_cpus * 2,
        }
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            group_limit: workers,
            ..Self::cpu_bound()
        }
    }

    /// Воркеров запускается не меньше одного
    pub fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }

    /// Полная емкость очереди: воркеры × глубина
    pub fn queue_capacity(&self) -> usize {
        self.effective_workers().saturating_mul(self.queue_depth)
    }
}


type Handler<T> = dyn Fn(T) -> Result<(), SpawnError> + Send + Sync;

/// Фиксированный пул долгоживущих воркеров с ограниченной очередью.
///
/// `submit` блокирует продюсера, пока очередь заполнена. `join` закрывает
/// очередь, воркеры дорабатывают остаток и завершаются.
pub struct WorkerPool<T: Send + 'static> {
    sender: Option<Sender<T>>,
    workers: Vec<thread::JoinHandle<()>>,
    tally: Arc<Tally>,
    capacity: usize,
}

impl<T: Send + 'static> WorkerPool<T> {
    pub fn start<F>(config: &Config, handler: F) -> Self
    where
        F: Fn(T) -> Result<(), SpawnError> + Send + Sync + 'static,
    {
        let num_workers = config.effective_workers();
        let capacity = config.queue_capacity();
        let (sender, receiver) = channel::bounded(capacity);
        let handler: Arc<Handler<T>> = Arc::new(handler);
        let tally = Arc::new(Tally::default());

        let mut workers = Vec::with_capacity(num_workers);
        for id in 0..num_workers {
            let receiver = receiver.clone();
            let handler = Arc::clone(&handler);
            let tally = Arc::clone(&tally);
            let spawned = thread::Builder::new()
                .name(format!("dispatch-worker-{id}"))
                .spawn(move || worker_loop(id, receiver, handler, tally));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => warn!(worker = id, error = %err, "failed to spawn worker thread"),
            }
        }

        Self {
            sender: Some(sender),
            workers,
            tally,
            capacity,
        }
    }

    /// Блокируется, пока в очереди нет места
    pub fn submit(&self, item: T) -> Result<(), SpawnError> {
        let sender = self.sender.as_ref().ok_or(SpawnError::ChannelClosed)?;
        self.tally.start();
        sender.send(item).map_err(|_| {
            self.tally.cancel();
            SpawnError::ChannelClosed
        })
    }

    /// Возвращает элемент обратно, если очередь заполнена или закрыта
    pub fn try_submit(&self, item: T) -> Result<(), T> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(item);
        };
        self.tally.start();
        sender.try_send(item).map_err(|err| {
            self.tally.cancel();
            match err {
                TrySendError::Full(item) | TrySendError::Disconnected(item) => item,
            }
        })
    }

    #[inline]
    pub fn queued(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    pub fn metrics(&self) -> TaskMetrics {
        self.tally.metrics()
    }

    pub fn join(mut self) -> Outcome {
        self.shutdown();
        self.tally.take_outcome()
    }

    fn shutdown(&mut self) {
        // Закрытие канала: воркеры выбирают остаток и выходят из цикла
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("worker thread panicked outside of a task");
            }
        }
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<T: Send + 'static>(id: usize, receiver: Receiver<T>, handler: Arc<Handler<T>>, tally: Arc<Tally>) {
    debug!(worker = id, "worker started");
    for item in receiver.iter() {
        let result = run_caught(|| handler(item));
        if let Err(err) = &result {
            warn!(worker = id, error = %err, "task failed");
        }
        tally.finish(result);
    }
    debug!(worker = id, "worker stopped");
}
