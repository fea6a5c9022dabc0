//! Order-preserving worker pool engine.
//!
//! A single dispatcher reads the input in order and pairs every item with two
//! ends of a token chain: the turn it must wait for before writing, and the turn
//! it hands to the next item once its writes are done. Computation runs on up to
//! N workers at once; only the writes are serialized.
//!
//! ```text
//! input ─▶ dispatcher ─▶ job(item 0, turn 0 ─┐, next 1)
//!                        job(item 1, turn 1 ◀┘─┐, next 2)
//!                        job(item 2, turn 2 ◀──┘, next 3) ...
//! ```

use crate::engine::{Halt, Pool, join_all, spawn_named, spawn_unordered};
use crossbeam_channel::{Receiver, SendError, Sender, bounded};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::debug;

struct Job<A> {
    item: A,
    turn: Receiver<()>,
    next: Sender<()>,
}

fn granted_turn() -> Receiver<()> {
    let (tx, rx) = bounded(1);
    // Buffered, so it is delivered even after `tx` is dropped.
    let _ = tx.send(());
    rx
}

fn ordered_worker<A, R, B, C, W>(
    stage: &str,
    jobs: &Receiver<Job<A>>,
    out: &Sender<B>,
    compute: &C,
    flush: &W,
    halt: &Halt,
) where
    C: Fn(A) -> R,
    W: Fn(R, &Sender<B>) -> Result<(), SendError<B>>,
{
    for Job { item, turn, next } in jobs.iter() {
        if halt.is_set() {
            continue;
        }
        let result = match panic::catch_unwind(AssertUnwindSafe(|| compute(item))) {
            Ok(r) => r,
            Err(payload) => {
                halt.panicked(stage, payload.as_ref());
                continue;
            }
        };
        // Err means an earlier item never handed over its turn.
        if turn.recv().is_err() || halt.is_set() {
            continue;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| flush(result, out))) {
            Ok(Ok(())) => {}
            Ok(Err(_)) => halt.downstream_gone(stage),
            Err(payload) => {
                halt.panicked(stage, payload.as_ref());
                continue;
            }
        }
        let _ = next.send(());
    }
}

/// Like [`run_unordered`](crate::run_unordered), but writes appear in input order.
///
/// `compute` runs concurrently on up to `n` workers. `flush` receives its result
/// and performs the writes for that item; flushes run one at a time, in the
/// order the items were read from `input`. A flush that writes nothing drops
/// the item but still lets the next one proceed, and all writes of one flush
/// land as a contiguous block.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn run_ordered<A, R, B, C, W>(
    input: Receiver<A>,
    out: Sender<B>,
    n: usize,
    compute: C,
    flush: W,
) where
    A: Send + 'static,
    B: Send + 'static,
    C: Fn(A) -> R + Send + Sync + 'static,
    W: Fn(R, &Sender<B>) -> Result<(), SendError<B>> + Send + Sync + 'static,
{
    spawn_ordered(&Pool::new(n), input, out, compute, flush);
}

pub(crate) fn spawn_ordered<A, R, B, C, W>(
    pool: &Pool,
    input: Receiver<A>,
    out: Sender<B>,
    compute: C,
    flush: W,
) where
    A: Send + 'static,
    B: Send + 'static,
    C: Fn(A) -> R + Send + Sync + 'static,
    W: Fn(R, &Sender<B>) -> Result<(), SendError<B>> + Send + Sync + 'static,
{
    // A single worker already writes in read order.
    if pool.workers == 1 {
        spawn_unordered(pool, input, out, move |a, out| flush(compute(a), out));
        return;
    }

    let stage = Arc::clone(&pool.name);
    let halt = Arc::new(Halt::default());
    debug!(stage = %stage, workers = pool.workers, "ordered stage started");

    let (jobs_tx, jobs_rx) = bounded::<Job<A>>(0);
    let compute = Arc::new(compute);
    let flush = Arc::new(flush);
    let handles: Vec<JoinHandle<()>> = (0..pool.workers)
        .map(|i| {
            let stage = Arc::clone(&stage);
            let jobs = jobs_rx.clone();
            let out = out.clone();
            let compute = Arc::clone(&compute);
            let flush = Arc::clone(&flush);
            let halt = Arc::clone(&halt);
            spawn_named(format!("{stage}-{i}"), move || {
                ordered_worker(&stage, &jobs, &out, compute.as_ref(), flush.as_ref(), &halt);
            })
        })
        .collect();
    drop(jobs_rx);

    spawn_named(format!("{stage}-dispatch"), move || {
        let mut turn = granted_turn();
        for item in input.iter() {
            if halt.is_set() {
                continue;
            }
            let (next, following) = bounded(1);
            if jobs_tx.send(Job { item, turn, next }).is_err() {
                // Every worker is gone; keep draining.
                halt.set();
            }
            turn = following;
        }
        drop(jobs_tx);
        join_all(&stage, handles);
        // Last sender: the output closes here and nowhere else.
        drop(out);
        debug!(stage = %stage, "ordered stage closed");
    });
}
