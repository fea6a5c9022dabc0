//! Unordered map / filter / flat_map stages.

use ironpool::testing::*;
use ironpool::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const LIMIT: Duration = Duration::from_secs(20);

#[test]
fn square_and_keep_above_four() {
    let out = assert_finishes_within(LIMIT, || {
        collect_vec(map_and_filter(Some(from_vec(vec![1, 2, 3, 4, 5])), 3, |x: i32| {
            let y = x * x;
            (y > 4).then_some(y)
        }))
    });
    assert_collections_unordered_equal(&out, &[9, 16, 25]);
}

#[test]
fn unordered_map_is_complete_for_every_worker_count() {
    let input: Vec<u64> = (0..200).map(|i| i % 17).collect();
    let expected: Vec<u64> = input.iter().map(|x| x * 3 + 1).collect();

    for n in [1, 2, 3, 4, 7, 16] {
        let data = input.clone();
        let out = assert_finishes_within(LIMIT, move || {
            collect_vec(map(Some(from_vec(data)), n, |x: u64| x * 3 + 1))
        });
        assert_collections_unordered_equal(&out, &expected);
    }
}

#[test]
fn single_worker_keeps_input_order() {
    let out = assert_finishes_within(LIMIT, || {
        collect_vec(map(Some(from_iter(0..100u32)), 1, |x| x + 1000))
    });
    assert_collections_equal(&out, &(1000..1100).collect::<Vec<_>>());
}

#[test]
fn filter_keeps_matching_items() {
    let out = assert_finishes_within(LIMIT, || {
        collect_vec(filter(Some(from_iter(0..50i32)), 4, |x| x % 5 == 0))
    });
    assert_collections_unordered_equal(&out, &[0, 5, 10, 15, 20, 25, 30, 35, 40, 45]);
}

#[test]
fn filter_can_drop_everything() {
    let out = assert_finishes_within(LIMIT, || {
        collect_vec(filter(Some(from_iter(0..50i32)), 3, |_| false))
    });
    assert!(out.is_empty());
}

#[test]
fn flat_map_emits_every_expansion() {
    let out = assert_finishes_within(LIMIT, || {
        collect_vec(flat_map(Some(from_vec(vec![1u32, 2, 3])), 2, |n| {
            (0..n).map(move |i| n * 10 + i)
        }))
    });
    assert_collections_unordered_equal(&out, &[10, 20, 21, 30, 31, 32]);
}

#[test]
fn flat_map_accepts_channels() {
    let out = assert_finishes_within(LIMIT, || {
        collect_vec(flat_map(Some(from_vec(vec![2u32, 4])), 2, |n| {
            from_vec(vec![n, n + 1])
        }))
    });
    assert_collections_unordered_equal(&out, &[2, 3, 4, 5]);
}

#[test]
fn empty_input_closes_output() {
    for n in [1, 4] {
        let out = assert_finishes_within(LIMIT, move || {
            collect_vec(map(Some(from_vec(Vec::<i32>::new())), n, |x| x))
        });
        assert!(out.is_empty());
    }
}

#[test]
fn more_workers_than_items_still_closes() {
    let out = assert_finishes_within(LIMIT, || {
        collect_vec(map(Some(from_vec(vec!["a", "b"])), 32, str::len))
    });
    assert_collections_unordered_equal(&out, &[1, 1]);
}

#[test]
fn absent_input_gives_absent_output() {
    assert!(map(None::<Receiver<i32>>, 4, |x| x).is_none());
    assert!(ordered_map(None::<Receiver<i32>>, 4, |x| x).is_none());
    assert!(filter(None::<Receiver<i32>>, 4, |_| true).is_none());
    assert!(ordered_filter(None::<Receiver<i32>>, 4, |_| true).is_none());
    assert!(flat_map(None::<Receiver<i32>>, 4, |x| vec![x]).is_none());
    assert!(ordered_flat_map(None::<Receiver<i32>>, 4, |x| vec![x]).is_none());
    assert!(map_and_filter(None::<Receiver<i32>>, 4, Some).is_none());
    assert!(ordered_map_and_filter(None::<Receiver<i32>>, 4, Some).is_none());
    assert!(collect_vec(None::<Receiver<i32>>).is_empty());
}

#[test]
fn concurrency_is_bounded_by_worker_count() {
    let counter = Arc::new(InFlightCounter::new());
    let c = Arc::clone(&counter);
    let out = assert_finishes_within(LIMIT, move || {
        collect_vec(map(Some(from_iter(0..24u32)), 4, move |x| {
            let _guard = c.enter();
            thread::sleep(Duration::from_millis(10));
            x
        }))
    });

    assert_eq!(out.len(), 24);
    assert_eq!(counter.current(), 0);
    assert!(counter.max() <= 4, "peak {} above 4 workers", counter.max());
    assert!(counter.max() >= 2, "peak {} shows no parallelism", counter.max());
}

#[test]
fn raw_engine_closes_after_all_workers() {
    let (tx, rx) = bounded(0);
    run_unordered(from_iter(0..10u32), tx, 3, |x, out| {
        out.send(x)?;
        out.send(x + 100)
    });
    let out = assert_finishes_within(LIMIT, move || rx.iter().collect::<Vec<_>>());
    let mut expected: Vec<u32> = (0..10).collect();
    expected.extend(100..110);
    assert_collections_unordered_equal(&out, &expected);
}
