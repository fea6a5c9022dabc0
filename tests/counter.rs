//! Tests for the in-flight counter.

use ironpool::{CounterSnapshot, InFlightCounter};
use rayon::prelude::*;
use serde_json::json;
use std::sync::Barrier;
use std::thread;

#[test]
fn tracks_current_and_peak() {
    let c = InFlightCounter::new();
    c.inc();
    c.inc();
    c.inc();
    c.dec();
    c.inc();
    c.dec();
    c.dec();

    assert_eq!(c.current(), 1);
    assert_eq!(c.max(), 3);
}

#[test]
fn peak_never_decreases() {
    let c = InFlightCounter::new();
    let mut peaks = Vec::new();
    for step in [1, 1, -1, 1, 1, -1, -1, -1, 1] {
        if step > 0 {
            c.inc()
        } else {
            c.dec()
        }
        peaks.push(c.max());
    }
    assert!(peaks.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(c.max(), 3);
    assert_eq!(c.current(), 1);
}

#[test]
fn guard_decrements_on_drop() {
    let c = InFlightCounter::new();
    {
        let _a = c.enter();
        let _b = c.enter();
        assert_eq!(c.current(), 2);
    }
    assert_eq!(c.current(), 0);
    assert_eq!(c.max(), 2);
}

#[test]
#[should_panic(expected = "nothing in flight")]
fn dec_below_zero_panics() {
    InFlightCounter::new().dec();
}

#[test]
fn concurrent_increments_settle() {
    let c = InFlightCounter::new();
    (0..1000).into_par_iter().for_each(|_| c.inc());
    assert_eq!(c.current(), 1000);
    assert_eq!(c.max(), 1000);

    (0..400).into_par_iter().for_each(|_| c.dec());
    assert_eq!(c.current(), 600);
    assert_eq!(c.max(), 1000);
}

#[test]
fn concurrent_balanced_sections() {
    let c = InFlightCounter::new();
    (0..10_000).into_par_iter().for_each(|_| {
        let _g = c.enter();
        assert!(c.current() >= 1);
    });
    assert_eq!(c.current(), 0);
    assert!(c.max() >= 1);
    assert!(c.max() <= rayon::current_num_threads());
}

#[test]
fn concurrent_ramp_reaches_exact_peak() {
    const THREADS: usize = 8;
    let c = InFlightCounter::new();
    let all_in = Barrier::new(THREADS);
    let checked = Barrier::new(THREADS);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                c.inc();
                all_in.wait();
                assert_eq!(c.current(), THREADS);
                checked.wait();
                c.dec();
            });
        }
    });

    assert_eq!(c.current(), 0);
    assert_eq!(c.max(), THREADS);

    // A second, smaller wave leaves the recorded peak untouched.
    let half = Barrier::new(THREADS / 2);
    thread::scope(|s| {
        for _ in 0..THREADS / 2 {
            s.spawn(|| {
                let _g = c.enter();
                half.wait();
            });
        }
    });
    assert_eq!(c.snapshot(), CounterSnapshot { current: 0, max: THREADS });
}

#[test]
fn snapshot_serializes() -> anyhow::Result<()> {
    let c = InFlightCounter::new();
    c.inc();
    c.inc();
    c.dec();

    let snap = c.snapshot();
    assert_eq!(snap, CounterSnapshot { current: 1, max: 2 });
    assert_eq!(serde_json::to_value(snap)?, json!({ "current": 1, "max": 2 }));
    Ok(())
}
