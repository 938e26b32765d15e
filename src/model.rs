use super::{
    buffer::SizeClass,
    errors::SpawnError,
    job::Weight,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, PoisonError,
    },
    time::Duration,
};


/// Счетчики пула буферов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolMetrics {
    pub acquired: usize,
    pub released: usize,
    pub allocated: usize,
    pub cached: usize,
}

impl PoolMetrics {
    /// Буферы, выданные и еще не возвращенные
    pub fn outstanding(&self) -> usize {
        self.acquired.saturating_sub(self.released)
    }

    pub fn reuse_rate(&self) -> f64 {
        if self.acquired == 0 {
            return 0.0;
        }
        let reused = self.acquired.saturating_sub(self.allocated);
        reused as f64 / self.acquired as f64
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskMetrics {
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
}

impl TaskMetrics {
    pub fn total(&self) -> usize {
        self.pending + self.completed + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        let finished = self.completed + self.failed;
        if finished == 0 {
            return 1.0;
        }
        self.completed as f64 / finished as f64
    }
}


/// Итог группы задач или пула воркеров: счетчики и первая ошибка
#[derive(Debug)]
pub struct Outcome {
    pub metrics: TaskMetrics,
    pub first_error: Option<SpawnError>,
}

impl Outcome {
    pub fn into_result(self) -> Result<TaskMetrics, SpawnError> {
        match self.first_error {
            Some(err) => Err(err),
            None => Ok(self.metrics),
        }
    }
}


/// Общий учет завершенных задач. Первая записанная ошибка сохраняется,
/// остальные только считаются.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pending: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    first_error: Mutex<Option<SpawnError>>,
}

impl Tally {
    #[inline]
    pub(crate) fn start(&self) {
        self.pending.fetch_add(1, Ordering::Relaxed);
    }

    /// Задача так и не была запущена
    #[inline]
    pub(crate) fn cancel(&self) {
        self.pending.fetch_sub(1, Ordering::Relaxed);
    }

    /// Возвращает ошибку обратно, если она не стала первой
    pub(crate) fn finish(&self, result: Result<(), SpawnError>) -> Option<SpawnError> {
        let rest = match result {
            Ok(()) => {
                self.completed.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                let mut first = self.first_error.lock().unwrap_or_else(PoisonError::into_inner);
                if first.is_none() {
                    *first = Some(err);
                    None
                } else {
                    Some(err)
                }
            }
        };
        self.pending.fetch_sub(1, Ordering::Release);
        rest
    }

    pub(crate) fn metrics(&self) -> TaskMetrics {
        TaskMetrics {
            pending: self.pending.load(Ordering::Acquire),
            completed: self.completed.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
        }
    }

    /// Забирает первую ошибку; вызывается, когда все задачи завершены
    pub(crate) fn take_outcome(&self) -> Outcome {
        let first_error = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Outcome {
            metrics: self.metrics(),
            first_error,
        }
    }
}


/// Результат прогона одной стратегии
#[derive(Debug)]
pub struct DispatchReport {
    pub strategy: &'static str,
    pub calls: usize,
    pub completed: usize,
    pub failed: usize,
    pub first_error: Option<SpawnError>,
    pub elapsed: Duration,
}

impl DispatchReport {
    pub fn is_ok(&self) -> bool {
        self.failed == 0 && self.first_error.is_none() && self.completed == self.calls
    }

    /// Вызовов в секунду
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.completed as f64 / secs
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub size: SizeClass,
    pub weight: Weight,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario { size: SizeClass::Small, weight: Weight::Light },
        Scenario { size: SizeClass::Small, weight: Weight::Heavy },
        Scenario { size: SizeClass::Big, weight: Weight::Light },
        Scenario { size: SizeClass::Big, weight: Weight::Heavy },
    ];

    pub fn name(&self) -> String {
        format!("{}-{}", self.size.name(), self.weight.name())
    }
}
