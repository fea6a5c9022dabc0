//! Feeding channels from collections and collecting them back.

use crate::engine::{DEFAULT_THREAD_NAME, spawn_named};
use crossbeam_channel::{Receiver, bounded};

/// Stream the items of `items` through a rendezvous channel from a background thread.
///
/// The channel closes after the last item. If the receiver is dropped early the
/// feeding thread stops.
pub fn from_iter<I>(items: I) -> Receiver<I::Item>
where
    I: IntoIterator + Send + 'static,
    I::Item: Send + 'static,
{
    let (tx, rx) = bounded(0);
    spawn_named(format!("{DEFAULT_THREAD_NAME}-source"), move || {
        for item in items {
            if tx.send(item).is_err() {
                break;
            }
        }
    });
    rx
}

/// Stream a `Vec` through a channel. See [`from_iter`].
///
/// # Example
/// ```
/// use ironpool::*;
///
/// let rx = from_vec(vec!["a", "b"]);
/// assert_eq!(rx.iter().collect::<Vec<_>>(), vec!["a", "b"]);
/// ```
pub fn from_vec<T: Send + 'static>(items: Vec<T>) -> Receiver<T> {
    from_iter(items)
}

/// Read a stream to the end. An absent stream collects to an empty `Vec`.
#[must_use]
pub fn collect_vec<T>(rx: Option<Receiver<T>>) -> Vec<T> {
    rx.map(|rx| rx.iter().collect()).unwrap_or_default()
}
