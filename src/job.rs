use super::errors::JobError;
use std::time::Duration;


/// Единица работы над буфером из пула
pub trait Job: Send + Sync {
    fn run(&self, buf: &mut [u8]) -> Result<(), JobError>;
}

impl<F> Job for F
where
    F: Fn(&mut [u8]) -> Result<(), JobError> + Send + Sync,
{
    #[inline]
    fn run(&self, buf: &mut [u8]) -> Result<(), JobError> {
        self(buf)
    }
}


/// Синтетическая задача: игнорирует буфер и спит
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepJob {
    duration: Duration,
}

impl SleepJob {
    pub const LIGHT: Duration = Duration::from_millis(10);
    pub const HEAVY: Duration = Duration::from_millis(100);

    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub const fn light() -> Self {
        Self::new(Self::LIGHT)
    }

    pub const fn heavy() -> Self {
        Self::new(Self::HEAVY)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Job for SleepJob {
    fn run(&self, _buf: &mut [u8]) -> Result<(), JobError> {
        std::thread::sleep(self.duration);
        Ok(())
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
    Light,
    Heavy,
}

impl Weight {
    pub const fn job(self) -> SleepJob {
        match self {
            Weight::Light => SleepJob::light(),
            Weight::Heavy => SleepJob::heavy(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Weight::Light => "light",
            Weight::Heavy => "heavy",
        }
    }
}
