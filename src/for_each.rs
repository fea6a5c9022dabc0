//! Bounded-parallel terminal consumer and draining helpers.
//!
//! [`for_each`] blocks until every worker stops, either because the input closed
//! or because the callback asked to stop. On an early stop some items may still
//! sit in the input. The caller owns the input and typically closes it only
//! after `for_each` returns, so waiting for that close here would deadlock.
//! Instead the leftover input is handed to [`drain_nb`], which discards it on a
//! background thread until the producer closes the channel:
//!
//! ```text
//! stop returned -> for_each returns -> caller closes input -> drain thread exits
//! ```

use crate::engine::{DEFAULT_THREAD_NAME, Pool};
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use tracing::{debug, trace, warn};

/// Stop signal shared by the workers of one `for_each` call.
///
/// Workers parked on an empty, still-open input wait on `rx` as well, so
/// dropping the only sender wakes all of them at once.
struct Stop {
    flag: AtomicBool,
    tx: Mutex<Option<Sender<()>>>,
    rx: Receiver<()>,
}

impl Stop {
    fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            flag: AtomicBool::new(false),
            tx: Mutex::new(Some(tx)),
            rx,
        }
    }

    fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

/// Triggers the stop signal if the owning worker unwinds, so its siblings stop too.
struct StopOnPanic<'a>(&'a Stop);

impl Drop for StopOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.trigger();
        }
    }
}

/// Call `f` for every item of `input` on `n` workers until the input closes or
/// `f` returns `false`.
///
/// After a worker sees `false`, no new items are handed to `f`; calls already
/// underway on other workers still finish. With `n == 1`, returning `false` for
/// item `i` guarantees `f` ran for exactly the items before it. With `n > 1`
/// that holds only per worker: other workers may have skipped or not yet reached
/// earlier items.
///
/// The input may be closed before or after this returns. Items left behind by
/// an early stop are discarded in the background (see [`drain_nb`]).
///
/// A panic in `f` stops the other workers and is resumed on the calling thread.
///
/// # Panics
///
/// Panics if `n` is zero, or if `f` panics.
///
/// # Example
/// ```
/// use ironpool::*;
/// use std::sync::Mutex;
///
/// let seen = Mutex::new(Vec::new());
/// for_each(Some(from_vec((0..100).collect::<Vec<u32>>())), 1, |x| {
///     seen.lock().unwrap().push(x);
///     x < 9
/// });
/// assert_eq!(seen.into_inner().unwrap(), (0..10).collect::<Vec<_>>());
/// ```
pub fn for_each<A, F>(input: Option<Receiver<A>>, n: usize, f: F)
where
    A: Send + 'static,
    F: Fn(A) -> bool + Sync,
{
    let Some(input) = input else {
        return;
    };
    for_each_in(&Pool::new(n), &input, &f);
    drain_nb(input);
}

pub(crate) fn for_each_in<A, F>(pool: &Pool, input: &Receiver<A>, f: &F)
where
    A: Send,
    F: Fn(A) -> bool + Sync,
{
    let stage = &*pool.name;
    debug!(stage, workers = pool.workers, "for_each started");

    if pool.workers == 1 {
        for a in input.iter() {
            if !f(a) {
                debug!(stage, "for_each stopped early");
                break;
            }
        }
        return;
    }

    let stop = Stop::new();
    let panicked = thread::scope(|s| {
        let handles: Vec<_> = (0..pool.workers)
            .map(|i| {
                let stop = &stop;
                thread::Builder::new()
                    .name(format!("{stage}-{i}"))
                    .spawn_scoped(s, move || {
                        let _guard = StopOnPanic(stop);
                        while !stop.is_set() {
                            select! {
                                recv(input) -> msg => match msg {
                                    // Checked again: the item may have raced the stop.
                                    Ok(a) if !stop.is_set() => {
                                        if !f(a) {
                                            stop.trigger();
                                        }
                                    }
                                    Ok(_) => {}
                                    Err(_) => break,
                                },
                                recv(stop.rx) -> _ => break,
                            }
                        }
                    })
                    .unwrap_or_else(|e| panic!("failed to spawn thread {stage}-{i}: {e}"))
            })
            .collect();

        let mut first = None;
        for h in handles {
            if let Err(payload) = h.join() {
                first.get_or_insert(payload);
            }
        }
        first
    });
    if let Some(payload) = panicked {
        panic::resume_unwind(payload);
    }

    if stop.is_set() {
        debug!(stage, "for_each stopped early");
    }
}

/// Read and discard everything until `rx` closes. Blocks.
pub fn drain<T>(rx: &Receiver<T>) {
    for _ in rx.iter() {}
}

/// Discard whatever is left in `rx` without blocking the caller.
///
/// If the channel is already closed and empty nothing happens. Otherwise a
/// background thread keeps discarding until every sender is gone, then exits.
pub fn drain_nb<T: Send + 'static>(rx: Receiver<T>) {
    if let Err(TryRecvError::Disconnected) = rx.try_recv() {
        return;
    }

    let spawned = thread::Builder::new()
        .name(format!("{DEFAULT_THREAD_NAME}-drain"))
        .spawn(move || {
            let mut discarded = 0usize;
            for _ in rx.iter() {
                discarded += 1;
            }
            trace!(discarded, "drain finished");
        });
    if let Err(e) = spawned {
        warn!(error = %e, "could not start drain thread, leftover input is abandoned");
    }
}
