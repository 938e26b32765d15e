use std::{
    any::Any,
    panic::{catch_unwind, AssertUnwindSafe},
};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Ошибка, возвращаемая самой задачей
#[derive(Debug, Error)]
#[error("{0}")]
pub struct JobError(BoxError);

impl JobError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self(err.into())
    }

    pub fn msg(text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self(text.into())
    }
}

/// Ошибки `Runner::execute`
#[derive(Debug, Error)]
pub enum RunError {
    #[error("job failed: {0}")]
    Job(#[from] JobError),

    /// Пул вернул буфер не того размера. Буфер всё равно возвращается в пул.
    #[error("pool returned invalid buffer: expected {expected} bytes, got {actual}")]
    PoolCorruption { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("join failed: {0}")]
    JoinFailed(String),
    #[error("task panicked: {0}")]
    Panic(String),
    #[error("work queue closed")]
    ChannelClosed,
}

impl From<tokio::task::JoinError> for SpawnError {
    fn from(join_err: tokio::task::JoinError) -> Self {
        if join_err.is_panic() {
            SpawnError::Panic(panic_message(join_err.into_panic()))
        } else {
            SpawnError::JoinFailed(join_err.to_string())
        }
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<&'static str>() {
        Ok(s) => (*s).to_owned(),
        Err(payload) => match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(_) => "panic in spawned task".into(),
        },
    }
}

/// Выполняет задачу, превращая панику в `SpawnError::Panic`
pub(crate) fn run_caught<F>(f: F) -> Result<(), SpawnError>
where
    F: FnOnce() -> Result<(), SpawnError>,
{
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(SpawnError::Panic(panic_message(payload))))
}
