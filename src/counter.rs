//! Live/peak tracking of work in flight.
//!
//! [`InFlightCounter`] is a small thread-safe counter that remembers the highest
//! value it has ever reached. It is mostly useful for checking that a stage really
//! runs the number of concurrent calls it was configured for:
//!
//! ```
//! use ironpool::*;
//! use std::sync::Arc;
//!
//! let counter = Arc::new(InFlightCounter::new());
//! let c = Arc::clone(&counter);
//! let out = map(Some(from_vec((0..20).collect::<Vec<u32>>())), 4, move |x| {
//!     let _guard = c.enter();
//!     x + 1
//! });
//! let results = collect_vec(out);
//! assert_eq!(results.len(), 20);
//! assert!(counter.max() <= 4);
//! assert_eq!(counter.current(), 0);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Thread-safe counter of in-flight work with a monotonic peak.
///
/// Both fields live behind a single mutex, so `current` and `max` are always
/// observed as a consistent pair. There is no reset; the peak only grows.
#[derive(Debug, Default)]
pub struct InFlightCounter {
    state: Mutex<State>,
}

#[derive(Debug, Default, Clone, Copy)]
struct State {
    current: usize,
    max: usize,
}

/// A point-in-time copy of a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub current: usize,
    pub max: usize,
}

impl InFlightCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock can only come from `dec` underflow, after
    // which the state is untouched, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Increment the live count and raise the peak if needed.
    pub fn inc(&self) {
        let mut s = self.lock();
        s.current += 1;
        if s.max < s.current {
            s.max = s.current;
        }
    }

    /// Decrement the live count.
    ///
    /// # Panics
    ///
    /// Panics if the count is already zero; that is always a bookkeeping bug
    /// in the caller.
    pub fn dec(&self) {
        let mut s = self.lock();
        assert!(s.current > 0, "InFlightCounter::dec called with nothing in flight");
        s.current -= 1;
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.lock().current
    }

    #[must_use]
    pub fn max(&self) -> usize {
        self.lock().max
    }

    /// Increment now and decrement when the returned guard is dropped.
    #[must_use = "dropping the guard immediately ends the in-flight section"]
    pub fn enter(&self) -> InFlightGuard<'_> {
        self.inc();
        InFlightGuard { counter: self }
    }

    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        let s = *self.lock();
        CounterSnapshot {
            current: s.current,
            max: s.max,
        }
    }
}

/// RAII section returned by [`InFlightCounter::enter`].
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    counter: &'a InFlightCounter,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counter.dec();
    }
}
