//! Method-call syntax on receivers.

use ironpool::testing::*;
use ironpool::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const LIMIT: Duration = Duration::from_secs(20);

#[test]
fn word_pipeline_in_order() {
    let out = assert_finishes_within(LIMIT, || {
        from_vec(vec![
            "The quick brown fox".to_string(),
            "jumps over the lazy dog".to_string(),
        ])
        .par_flat_map_ordered(2, |line| {
            line.split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
        })
        .par_filter_ordered(3, |w| w.len() >= 4)
        .par_map_ordered(4, |w| w.to_uppercase())
        .iter()
        .collect::<Vec<_>>()
    });
    assert_collections_equal(&out, &["QUICK", "BROWN", "JUMPS", "OVER", "LAZY"].map(String::from));
}

#[test]
fn unordered_chain_is_complete() {
    let out = assert_finishes_within(LIMIT, || {
        from_iter(1..=20u32)
            .par_map(4, |x| x * 3)
            .par_filter(2, |x| x % 2 == 0)
            .par_flat_map(3, |x| [x, x + 1])
            .par_map_and_filter(2, |x| (x > 10).then_some(x))
            .iter()
            .collect::<Vec<_>>()
    });
    let expected: Vec<u32> = (1..=20u32)
        .map(|x| x * 3)
        .filter(|x| x % 2 == 0)
        .flat_map(|x| [x, x + 1])
        .filter(|x| *x > 10)
        .collect();
    assert_collections_unordered_equal(&out, &expected);
}

#[test]
fn ordered_map_and_filter_method() {
    let out = assert_finishes_within(LIMIT, || {
        from_vec(vec![1u32, 2, 3, 4, 5])
            .par_map_and_filter_ordered(3, |x| {
                std::thread::sleep(reversed_delay(u64::from(x), 5, Duration::from_millis(10)));
                let y = x * x;
                (y > 4).then_some(y)
            })
            .iter()
            .collect::<Vec<_>>()
    });
    assert_collections_equal(&out, &[9, 16, 25]);
}

#[test]
fn par_for_each_sums() {
    let total = AtomicU64::new(0);
    from_iter(1..=100u64).par_for_each(4, |x| {
        total.fetch_add(x, Ordering::SeqCst);
        true
    });
    assert_eq!(total.into_inner(), 5050);
}

#[test]
fn drain_helpers() {
    let (tx, rx) = bounded(0);
    let producer = std::thread::spawn(move || {
        for i in 0..50u8 {
            tx.send(i).unwrap();
        }
    });
    rx.drain_background();
    assert_finishes_within(LIMIT, move || producer.join().unwrap());

    assert_finishes_within(LIMIT, || from_iter(0..50u8).drain_all());
}
