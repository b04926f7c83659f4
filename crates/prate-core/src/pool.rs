//! Free-list object pools.
//!
//! Per-request objects are recycled instead of reallocated. A value is reset
//! when it is released, so whatever [`Pool::acquire`] hands out is always in
//! its cleared state.

use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// Returns a value to its freshly constructed state.
pub trait Reset {
    /// Clears every piece of request state.
    fn reset(&mut self);
}

/// Default cap on idle values kept by a pool.
pub const DEFAULT_MAX_IDLE: usize = 1024;

/// A mutex-guarded free list with a factory for misses.
///
/// # Example
///
/// ```rust
/// use prate_core::{Pool, Reset};
///
/// #[derive(Default)]
/// struct Scratch(Vec<u8>);
///
/// impl Reset for Scratch {
///     fn reset(&mut self) {
///         self.0.clear();
///     }
/// }
///
/// let pool = Pool::new(Scratch::default);
/// {
///     let mut scratch = pool.acquire();
///     scratch.0.extend_from_slice(b"request bytes");
/// }
/// assert_eq!(pool.idle(), 1);
/// assert!(pool.acquire().0.is_empty());
/// ```
pub struct Pool<T> {
    free: Mutex<Vec<T>>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    max_idle: usize,
}

impl<T: Reset> Pool<T> {
    /// Creates an empty pool that builds new values with `factory`.
    pub fn new(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            factory: Box::new(factory),
            max_idle: DEFAULT_MAX_IDLE,
        }
    }

    /// Caps the number of idle values kept; extra releases are dropped.
    #[must_use]
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// Takes a value out of the pool, building one if the pool is empty.
    ///
    /// The value must be handed back with [`release`](Self::release).
    pub fn take(&self) -> T {
        let recycled = self.free.lock().pop();
        recycled.unwrap_or_else(|| (self.factory)())
    }

    /// Resets `value` and returns it to the pool.
    pub fn release(&self, mut value: T) {
        value.reset();
        let mut free = self.free.lock();
        if free.len() < self.max_idle {
            free.push(value);
        }
    }

    /// Takes a value wrapped in a guard that releases it on drop.
    pub fn acquire(&self) -> Pooled<'_, T> {
        Pooled {
            pool: self,
            value: Some(self.take()),
        }
    }

    /// Number of values currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

impl<T: Reset + Default + 'static> Default for Pool<T> {
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.free.lock().len())
            .field("max_idle", &self.max_idle)
            .finish_non_exhaustive()
    }
}

/// A pooled value that goes back to its pool when dropped.
pub struct Pooled<'a, T: Reset> {
    pool: &'a Pool<T>,
    value: Option<T>,
}

impl<T: Reset> Pooled<'_, T> {
    /// Detaches the value from the pool.
    pub fn into_inner(mut self) -> T {
        match self.value.take() {
            Some(value) => value,
            None => unreachable!("pooled value is only taken once"),
        }
    }
}

impl<T: Reset> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.value {
            Some(value) => value,
            None => unreachable!("pooled value is only taken on drop"),
        }
    }
}

impl<T: Reset> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.value {
            Some(value) => value,
            None => unreachable!("pooled value is only taken on drop"),
        }
    }
}

impl<T: Reset> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.release(value);
        }
    }
}

impl<T: Reset + fmt::Debug> fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&self.value).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Buffer {
        bytes: Vec<u8>,
        resets: usize,
    }

    impl Reset for Buffer {
        fn reset(&mut self) {
            self.bytes.clear();
            self.resets += 1;
        }
    }

    #[test]
    fn test_acquire_builds_on_miss() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let pool = Pool::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Buffer::default()
        });

        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(built.load(Ordering::SeqCst), 2);
        drop((a, b));
        assert_eq!(pool.idle(), 2);

        let _c = pool.acquire();
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_release_resets_value() {
        let pool: Pool<Buffer> = Pool::default();
        {
            let mut buf = pool.acquire();
            buf.bytes.extend_from_slice(b"hello");
        }
        let buf = pool.acquire();
        assert!(buf.bytes.is_empty());
        assert_eq!(buf.resets, 1);
    }

    #[test]
    fn test_take_and_release() {
        let pool: Pool<Buffer> = Pool::default();
        let mut buf = pool.take();
        buf.bytes.push(1);
        assert_eq!(pool.idle(), 0);
        pool.release(buf);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_into_inner_detaches() {
        let pool: Pool<Buffer> = Pool::default();
        let buf = pool.acquire().into_inner();
        drop(buf);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_max_idle_drops_extra() {
        let pool: Pool<Buffer> = Pool::default().with_max_idle(1);
        let a = pool.take();
        let b = pool.take();
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool: Arc<Pool<Buffer>> = Arc::new(Pool::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let mut buf = pool.acquire();
                        assert!(buf.bytes.is_empty());
                        buf.bytes.push(i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.idle() <= 8);
    }
}
