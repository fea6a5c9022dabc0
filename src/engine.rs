//! Unordered worker pool engine.
//!
//! [`run_unordered`] fans one input channel out to N worker threads that compete
//! for items, and fans their writes back into one output channel. The output is
//! closed exactly once, by dropping the last [`Sender`], after every worker has
//! returned.
//!
//! The plumbing shared with the ordered engine also lives here: named thread
//! spawning, the supervisor join, and the [`Halt`] flag that switches a stage
//! from processing to draining.

use crossbeam_channel::{Receiver, SendError, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// Thread name prefix used when no [`StageConfig`](crate::StageConfig) is involved.
pub const DEFAULT_THREAD_NAME: &str = "ironpool";

/// Worker count and thread naming for one stage.
#[derive(Clone, Debug)]
pub(crate) struct Pool {
    pub(crate) workers: usize,
    pub(crate) name: Arc<str>,
}

impl Pool {
    pub(crate) fn new(workers: usize) -> Self {
        Self::named(workers, DEFAULT_THREAD_NAME)
    }

    /// # Panics
    ///
    /// Panics if `workers` is zero.
    pub(crate) fn named(workers: usize, name: &str) -> Self {
        assert!(workers >= 1, "worker count must be at least 1, got {workers}");
        Self {
            workers,
            name: Arc::from(name),
        }
    }
}

/// Stop signal shared by every thread of a stage.
///
/// Once set, workers keep reading their input but discard it instead of
/// calling the user function.
#[derive(Debug, Default)]
pub(crate) struct Halt {
    stopped: AtomicBool,
}

impl Halt {
    pub(crate) fn is_set(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub(crate) fn downstream_gone(&self, stage: &str) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            warn!(stage, "output receiver dropped, draining remaining input");
        }
    }

    pub(crate) fn panicked(&self, stage: &str, payload: &(dyn Any + Send)) {
        self.set();
        error!(
            stage,
            panic = panic_message(payload),
            "user function panicked, stage halted and output truncated"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// Spawn a named OS thread.
///
/// # Panics
///
/// Panics if the OS refuses to create the thread, like [`std::thread::spawn`].
pub(crate) fn spawn_named<F, T>(name: String, f: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(f)
        .unwrap_or_else(|e| panic!("failed to spawn thread {name}: {e}"))
}

/// Wait for every worker of a stage.
pub(crate) fn join_all(stage: &str, handles: Vec<JoinHandle<()>>) {
    for h in handles {
        if let Err(payload) = h.join() {
            error!(
                stage,
                panic = panic_message(payload.as_ref()),
                "worker thread died outside the user function"
            );
        }
    }
}

/// One competing consumer: read until the input closes.
fn worker_loop<A, B, F>(stage: &str, input: &Receiver<A>, out: &Sender<B>, action: &F, halt: &Halt)
where
    F: Fn(A, &Sender<B>) -> Result<(), SendError<B>>,
{
    for a in input.iter() {
        if halt.is_set() {
            continue;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| action(a, out))) {
            Ok(Ok(())) => {}
            Ok(Err(_)) => halt.downstream_gone(stage),
            Err(payload) => halt.panicked(stage, payload.as_ref()),
        }
    }
}

/// Run `action` over every item of `input` on `n` worker threads, writing to `out`.
///
/// `action` may send any number of values for an item. Items are handed out
/// first-come first-served, so output order is unspecified when `n > 1`. The
/// output channel closes once all workers have seen the end of `input`.
///
/// If the receiving side of `out` goes away, `send` fails; return that error
/// (the `?` operator does it) and the stage stops calling `action` and drains
/// the rest of `input`.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn run_unordered<A, B, F>(input: Receiver<A>, out: Sender<B>, n: usize, action: F)
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A, &Sender<B>) -> Result<(), SendError<B>> + Send + Sync + 'static,
{
    spawn_unordered(&Pool::new(n), input, out, action);
}

pub(crate) fn spawn_unordered<A, B, F>(pool: &Pool, input: Receiver<A>, out: Sender<B>, action: F)
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A, &Sender<B>) -> Result<(), SendError<B>> + Send + Sync + 'static,
{
    let stage = Arc::clone(&pool.name);
    let halt = Arc::new(Halt::default());
    debug!(stage = %stage, workers = pool.workers, "unordered stage started");

    if pool.workers == 1 {
        spawn_named(format!("{stage}-0"), move || {
            worker_loop(&stage, &input, &out, &action, &halt);
            drop(out);
            debug!(stage = %stage, "unordered stage closed");
        });
        return;
    }

    let action = Arc::new(action);
    let handles: Vec<JoinHandle<()>> = (0..pool.workers)
        .map(|i| {
            let stage = Arc::clone(&stage);
            let input = input.clone();
            let out = out.clone();
            let action = Arc::clone(&action);
            let halt = Arc::clone(&halt);
            spawn_named(format!("{stage}-{i}"), move || {
                worker_loop(&stage, &input, &out, action.as_ref(), &halt);
            })
        })
        .collect();
    drop(input);

    spawn_named(format!("{stage}-join"), move || {
        join_all(&stage, handles);
        // Last sender: the output closes here and nowhere else.
        drop(out);
        debug!(stage = %stage, "unordered stage closed");
    });
}
