//! Map, filter and flat-map stages over channels.
//!
//! Every combinator comes in two flavours: the plain one, where output order is
//! whatever order the workers finish in, and an `ordered_` one, where output
//! order matches input order. All of them take the input as
//! `Option<Receiver<_>>` and return `None` for a `None` input without starting
//! any threads.
//!
//! Output channels are rendezvous channels (`bounded(0)`): a worker's write
//! completes only when the consumer takes the value, which throttles how fast
//! the input is read.

use crate::engine::{Pool, spawn_unordered};
use crate::ordered::spawn_ordered;
use crossbeam_channel::{Receiver, Sender, bounded};

// ---------- pool-aware implementations (used by `Stage` and `ReceiverExt`) ----------

pub(crate) fn map_and_filter_in<A, B, F>(pool: &Pool, input: Receiver<A>, f: F) -> Receiver<B>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> Option<B> + Send + Sync + 'static,
{
    let (tx, rx) = bounded(0);
    spawn_unordered(pool, input, tx, move |a, out| match f(a) {
        Some(b) => out.send(b),
        None => Ok(()),
    });
    rx
}

pub(crate) fn ordered_map_and_filter_in<A, B, F>(
    pool: &Pool,
    input: Receiver<A>,
    f: F,
) -> Receiver<B>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> Option<B> + Send + Sync + 'static,
{
    let (tx, rx) = bounded(0);
    spawn_ordered(pool, input, tx, f, |kept: Option<B>, out: &Sender<B>| match kept {
        Some(b) => out.send(b),
        None => Ok(()),
    });
    rx
}

pub(crate) fn flat_map_in<A, B, I, F>(pool: &Pool, input: Receiver<A>, f: F) -> Receiver<B>
where
    A: Send + 'static,
    B: Send + 'static,
    I: IntoIterator<Item = B>,
    F: Fn(A) -> I + Send + Sync + 'static,
{
    let (tx, rx) = bounded(0);
    spawn_unordered(pool, input, tx, move |a, out| {
        for b in f(a) {
            out.send(b)?;
        }
        Ok(())
    });
    rx
}

pub(crate) fn ordered_flat_map_in<A, B, I, F>(pool: &Pool, input: Receiver<A>, f: F) -> Receiver<B>
where
    A: Send + 'static,
    B: Send + 'static,
    I: IntoIterator<Item = B>,
    F: Fn(A) -> I + Send + Sync + 'static,
{
    let (tx, rx) = bounded(0);
    spawn_ordered(
        pool,
        input,
        tx,
        move |a| f(a).into_iter(),
        |items: I::IntoIter, out: &Sender<B>| {
            for b in items {
                out.send(b)?;
            }
            Ok(())
        },
    );
    rx
}

// ---------- public API ----------

/// Apply `f` to every item on `n` workers, forwarding only the `Some` results.
///
/// Output order is unspecified.
///
/// # Panics
///
/// Panics if `n` is zero.
///
/// # Example
/// ```
/// use ironpool::*;
///
/// let squares = map_and_filter(Some(from_vec(vec![1, 2, 3, 4, 5])), 3, |x: i32| {
///     let y = x * x;
///     (y > 4).then_some(y)
/// });
/// let mut out = collect_vec(squares);
/// out.sort_unstable();
/// assert_eq!(out, vec![9, 16, 25]);
/// ```
pub fn map_and_filter<A, B, F>(input: Option<Receiver<A>>, n: usize, f: F) -> Option<Receiver<B>>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> Option<B> + Send + Sync + 'static,
{
    input.map(|rx| map_and_filter_in(&Pool::new(n), rx, f))
}

/// Ordered counterpart of [`map_and_filter`].
///
/// # Panics
///
/// Panics if `n` is zero.
///
/// # Example
/// ```
/// use ironpool::*;
///
/// let squares = ordered_map_and_filter(Some(from_vec(vec![1, 2, 3, 4, 5])), 3, |x: i32| {
///     let y = x * x;
///     (y > 4).then_some(y)
/// });
/// assert_eq!(collect_vec(squares), vec![9, 16, 25]);
/// ```
pub fn ordered_map_and_filter<A, B, F>(
    input: Option<Receiver<A>>,
    n: usize,
    f: F,
) -> Option<Receiver<B>>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> Option<B> + Send + Sync + 'static,
{
    input.map(|rx| ordered_map_and_filter_in(&Pool::new(n), rx, f))
}

/// Apply `f` to every item on `n` workers. Output order is unspecified.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn map<A, B, F>(input: Option<Receiver<A>>, n: usize, f: F) -> Option<Receiver<B>>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> B + Send + Sync + 'static,
{
    map_and_filter(input, n, move |a| Some(f(a)))
}

/// Apply `f` to every item on `n` workers, keeping input order.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn ordered_map<A, B, F>(input: Option<Receiver<A>>, n: usize, f: F) -> Option<Receiver<B>>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> B + Send + Sync + 'static,
{
    ordered_map_and_filter(input, n, move |a| Some(f(a)))
}

/// Keep the items for which `f` returns `true`. Output order is unspecified.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn filter<A, F>(input: Option<Receiver<A>>, n: usize, f: F) -> Option<Receiver<A>>
where
    A: Send + 'static,
    F: Fn(&A) -> bool + Send + Sync + 'static,
{
    map_and_filter(input, n, move |a| f(&a).then_some(a))
}

/// Keep the items for which `f` returns `true`, in input order.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn ordered_filter<A, F>(input: Option<Receiver<A>>, n: usize, f: F) -> Option<Receiver<A>>
where
    A: Send + 'static,
    F: Fn(&A) -> bool + Send + Sync + 'static,
{
    ordered_map_and_filter(input, n, move |a| f(&a).then_some(a))
}

/// Expand every item into zero or more outputs.
///
/// `f` may return anything iterable, including another [`Receiver`]. Outputs of
/// different items may interleave.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn flat_map<A, B, I, F>(input: Option<Receiver<A>>, n: usize, f: F) -> Option<Receiver<B>>
where
    A: Send + 'static,
    B: Send + 'static,
    I: IntoIterator<Item = B>,
    F: Fn(A) -> I + Send + Sync + 'static,
{
    input.map(|rx| flat_map_in(&Pool::new(n), rx, f))
}

/// Expand every item into zero or more outputs, keeping input order.
///
/// The outputs of one item form a contiguous block, in the order its iterator
/// yields them. The iterator is created by the worker that computed the item
/// but consumed only once all earlier items have been written, so lazy
/// iterators do their work in the serialized phase.
///
/// # Panics
///
/// Panics if `n` is zero.
///
/// # Example
/// ```
/// use ironpool::*;
///
/// let out = ordered_flat_map(Some(from_vec(vec![1, 2])), 2, |n: u32| [n, n * 10]);
/// assert_eq!(collect_vec(out), vec![1, 10, 2, 20]);
/// ```
pub fn ordered_flat_map<A, B, I, F>(
    input: Option<Receiver<A>>,
    n: usize,
    f: F,
) -> Option<Receiver<B>>
where
    A: Send + 'static,
    B: Send + 'static,
    I: IntoIterator<Item = B>,
    F: Fn(A) -> I + Send + Sync + 'static,
{
    input.map(|rx| ordered_flat_map_in(&Pool::new(n), rx, f))
}
