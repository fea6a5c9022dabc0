//! Method-call syntax for stages.
//!
//! [`ReceiverExt`] adds the combinators to [`Receiver`] so stages chain like
//! iterator adapters:
//!
//! ```
//! use ironpool::*;
//!
//! let words = from_vec(vec!["the quick", "brown fox", "jumps"])
//!     .par_flat_map_ordered(2, |line| line.split_whitespace().collect::<Vec<_>>())
//!     .par_filter_ordered(2, |w| w.len() > 3)
//!     .par_map_ordered(4, str::to_uppercase);
//!
//! assert_eq!(words.iter().collect::<Vec<_>>(), vec!["QUICK", "BROWN", "JUMPS"]);
//! ```

use crate::combinators::{
    flat_map_in, map_and_filter_in, ordered_flat_map_in, ordered_map_and_filter_in,
};
use crate::engine::Pool;
use crate::for_each::{drain, drain_nb, for_each_in};
use crossbeam_channel::Receiver;

/// Parallel combinators on a channel receiver.
///
/// Every method panics if `n` is zero.
pub trait ReceiverExt<A: Send + 'static>: Sized {
    fn par_map_and_filter<B, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        F: Fn(A) -> Option<B> + Send + Sync + 'static;

    fn par_map_and_filter_ordered<B, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        F: Fn(A) -> Option<B> + Send + Sync + 'static;

    fn par_flat_map<B, I, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        I: IntoIterator<Item = B>,
        F: Fn(A) -> I + Send + Sync + 'static;

    fn par_flat_map_ordered<B, I, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        I: IntoIterator<Item = B>,
        F: Fn(A) -> I + Send + Sync + 'static;

    fn par_for_each<F>(self, n: usize, f: F)
    where
        F: Fn(A) -> bool + Sync;

    /// Discard the rest of the stream, blocking until it closes.
    fn drain_all(self);

    /// Discard the rest of the stream in the background.
    fn drain_background(self);

    fn par_map<B, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.par_map_and_filter(n, move |a| Some(f(a)))
    }

    fn par_map_ordered<B, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.par_map_and_filter_ordered(n, move |a| Some(f(a)))
    }

    fn par_filter<F>(self, n: usize, f: F) -> Receiver<A>
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.par_map_and_filter(n, move |a| f(&a).then_some(a))
    }

    fn par_filter_ordered<F>(self, n: usize, f: F) -> Receiver<A>
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.par_map_and_filter_ordered(n, move |a| f(&a).then_some(a))
    }
}

impl<A: Send + 'static> ReceiverExt<A> for Receiver<A> {
    fn par_map_and_filter<B, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        F: Fn(A) -> Option<B> + Send + Sync + 'static,
    {
        map_and_filter_in(&Pool::new(n), self, f)
    }

    fn par_map_and_filter_ordered<B, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        F: Fn(A) -> Option<B> + Send + Sync + 'static,
    {
        ordered_map_and_filter_in(&Pool::new(n), self, f)
    }

    fn par_flat_map<B, I, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        I: IntoIterator<Item = B>,
        F: Fn(A) -> I + Send + Sync + 'static,
    {
        flat_map_in(&Pool::new(n), self, f)
    }

    fn par_flat_map_ordered<B, I, F>(self, n: usize, f: F) -> Receiver<B>
    where
        B: Send + 'static,
        I: IntoIterator<Item = B>,
        F: Fn(A) -> I + Send + Sync + 'static,
    {
        ordered_flat_map_in(&Pool::new(n), self, f)
    }

    fn par_for_each<F>(self, n: usize, f: F)
    where
        F: Fn(A) -> bool + Sync,
    {
        for_each_in(&Pool::new(n), &self, &f);
        drain_nb(self);
    }

    fn drain_all(self) {
        drain(&self);
    }

    fn drain_background(self) {
        drain_nb(self);
    }
}
