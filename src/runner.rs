use super::{
    buffer::BufferPool,
    errors::RunError,
    job::Job,
};
use std::sync::Arc;


/// Связка пула буферов и задачи. Собственного изменяемого состояния нет,
/// поэтому один `Runner` можно вызывать из любого числа потоков.
#[derive(Debug)]
pub struct Runner<J> {
    pool: Arc<BufferPool>,
    job: J,
}

impl<J: Job> Runner<J> {
    pub fn new(pool: Arc<BufferPool>, job: J) -> Self {
        Self { pool, job }
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Берет буфер, запускает задачу, возвращает буфер в пул.
    ///
    /// Ровно один `get` и один `put` на вызов, в том числе когда задача
    /// вернула ошибку или пул отдал буфер чужого размера.
    pub fn execute(&self) -> Result<(), RunError> {
        let mut buf = self.pool.acquire();

        let expected = self.pool.buffer_size();
        if buf.len() != expected {
            return Err(RunError::PoolCorruption {
                expected,
                actual: buf.len(),
            });
        }

        self.job.run(&mut buf).map_err(RunError::Job)
    }
}
