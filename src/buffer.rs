use super::model::PoolMetrics;
use std::{
    mem,
    ops::{Deref, DerefMut},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use crossbeam::queue::SegQueue;


/// Буфер фиксированного размера
pub type Buffer = Box<[u8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    /// 1KB
    Small,
    /// 1MB
    Big,
}

impl SizeClass {
    pub const fn bytes(self) -> usize {
        match self {
            SizeClass::Small => 1024,
            SizeClass::Big => 1024 * 1024,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Big => "big",
        }
    }
}


/// Потокобезопасный кэш буферов одного размера.
///
/// Верхней границы нет: под нагрузкой кэш растет до пикового числа
/// одновременно выданных буферов.
#[derive(Debug)]
pub struct BufferPool {
    size: usize,
    free: SegQueue<Buffer>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    allocated: AtomicUsize,
}

impl BufferPool {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            free: SegQueue::new(),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            allocated: AtomicUsize::new(0),
        }
    }

    pub fn with_class(class: SizeClass) -> Self {
        Self::new(class.bytes())
    }

    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.size
    }

    /// Берет буфер из кэша или выделяет новый. Содержимое не определено.
    pub fn get(&self) -> Buffer {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        self.free.pop().unwrap_or_else(|| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            vec![0u8; self.size].into_boxed_slice()
        })
    }

    /// Возвращает буфер в кэш. Размер не проверяется.
    pub fn put(&self, buf: Buffer) {
        self.free.push(buf);
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Буфер возвращается в пул при drop гарда
    #[inline]
    pub fn acquire(&self) -> PooledBuffer<'_> {
        PooledBuffer {
            pool: self,
            buf: self.get(),
        }
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
            cached: self.free.len(),
        }
    }
}


pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Buffer,
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        // Пустой Box<[u8]> не выделяет память
        self.pool.put(mem::take(&mut self.buf));
    }
}


/// Пара общих пулов, по одному на класс размера
#[derive(Debug, Clone)]
pub struct BufferPools {
    small: Arc<BufferPool>,
    big: Arc<BufferPool>,
}

impl Default for BufferPools {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPools {
    pub fn new() -> Self {
        Self {
            small: Arc::new(BufferPool::with_class(SizeClass::Small)),
            big: Arc::new(BufferPool::with_class(SizeClass::Big)),
        }
    }

    pub fn small(&self) -> Arc<BufferPool> {
        Arc::clone(&self.small)
    }

    pub fn big(&self) -> Arc<BufferPool> {
        Arc::clone(&self.big)
    }

    pub fn get(&self, class: SizeClass) -> Arc<BufferPool> {
        match class {
            SizeClass::Small => self.small(),
            SizeClass::Big => self.big(),
        }
    }
}
