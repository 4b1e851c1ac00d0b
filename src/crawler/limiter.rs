//! Concurrency gate for period-level work
//!
//! A counting semaphore with fixed capacity. Holding a `LimiterPermit` means
//! the holder is one of at most `capacity` active period tasks. Dropping the
//! permit releases the slot, so release happens on every exit path of the
//! holder, including early returns and panics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Shared gate bounding concurrently active period tasks
///
/// Cloning is cheap and yields a handle to the same gate.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

/// Proof of holding a slot in the limiter; released on drop
#[derive(Debug)]
pub struct LimiterPermit {
    _permit: OwnedSemaphorePermit,
    active: Arc<AtomicUsize>,
}

impl Drop for LimiterPermit {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyLimiter {
    /// Creates a gate admitting at most `capacity` holders (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits until fewer than `capacity` holders are active, then takes a slot
    pub async fn acquire(&self) -> LimiterPermit {
        // The semaphore is never closed, so acquisition only fails if that
        // invariant is broken.
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .unwrap_or_else(|_| unreachable!("concurrency limiter semaphore closed"));

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);

        LimiterPermit {
            _permit: permit,
            active: self.active.clone(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently held
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest number of permits held at the same time so far
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}
