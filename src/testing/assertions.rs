//! Assertion functions for testing stage outputs.
//!
//! This module provides specialized assertion functions for comparing
//! collections drained from stages with expected results.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::thread;
use std::time::Duration;

/// Assert that two collections are equal in order and content.
///
/// This function compares two slices element-by-element and panics with
/// a detailed message if they differ.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
///
/// # Example
///
/// ```
/// use ironpool::testing::assert_collections_equal;
///
/// let actual = vec![1, 2, 3];
/// let expected = vec![1, 2, 3];
/// assert_collections_equal(&actual, &expected);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

fn counts<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
    let mut m = HashMap::new();
    for item in items {
        *m.entry(item).or_insert(0) += 1;
    }
    m
}

/// Assert that two collections hold the same elements with the same
/// multiplicities, ignoring order.
///
/// Use it for unordered stages, whose output order depends on scheduling.
///
/// # Panics
///
/// Panics if the collections differ as multisets.
///
/// # Example
///
/// ```
/// use ironpool::testing::assert_collections_unordered_equal;
///
/// let actual = vec![3, 1, 2, 1];
/// let expected = vec![1, 1, 2, 3];
/// assert_collections_unordered_equal(&actual, &expected);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    let actual_counts = counts(actual);
    let expected_counts = counts(expected);
    if actual_counts != expected_counts {
        let missing: Vec<_> = expected_counts
            .iter()
            .filter(|(k, n)| actual_counts.get(*k).copied().unwrap_or(0) < **n)
            .map(|(k, _)| *k)
            .collect();
        let extra: Vec<_> = actual_counts
            .iter()
            .filter(|(k, n)| expected_counts.get(*k).copied().unwrap_or(0) < **n)
            .map(|(k, _)| *k)
            .collect();

        panic!(
            "Collection content mismatch:\n  Missing elements: {missing:?}\n  Extra elements: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
        );
    }
}

/// Assert that all elements in a collection satisfy a predicate.
///
/// # Panics
///
/// Panics if any element does not satisfy the predicate.
///
/// # Example
///
/// ```
/// use ironpool::testing::assert_all;
///
/// let data = vec![2, 4, 6, 8];
/// assert_all(&data, |x| x % 2 == 0);
/// ```
pub fn assert_all<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    for (i, item) in collection.iter().enumerate() {
        assert!(
            predicate(item),
            "Predicate failed for element at index {i}:\n  Element: {item:?}\n  Collection: {collection:?}"
        );
    }
}

/// Run `f` on a separate thread and return its result, failing if it takes
/// longer than `limit`.
///
/// A stage that never closes its output would otherwise hang the test run.
/// On timeout the thread running `f` is leaked.
///
/// # Panics
///
/// Panics if `f` does not finish within `limit`, or if `f` itself panics.
///
/// # Example
///
/// ```
/// use ironpool::testing::assert_finishes_within;
/// use std::time::Duration;
///
/// let v = assert_finishes_within(Duration::from_secs(1), || 40 + 2);
/// assert_eq!(v, 42);
/// ```
pub fn assert_finishes_within<T, F>(limit: Duration, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    let handle = thread::spawn(move || {
        let _ = tx.send(f());
    });
    match rx.recv_timeout(limit) {
        Ok(v) => v,
        Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
            panic!("operation did not finish within {limit:?}")
        }
        Err(crossbeam_channel::RecvTimeoutError::Disconnected) => match handle.join() {
            Err(payload) => std::panic::resume_unwind(payload),
            Ok(()) => unreachable!("sender dropped without sending"),
        },
    }
}
