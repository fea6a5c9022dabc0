//! Artificial processing delays keyed to item values.

use std::time::Duration;

/// A delay that shrinks as `value` grows: `unit * (span - value)`, floored at zero.
///
/// Feeding `0..span` through a stage that sleeps for `reversed_delay(x, span, unit)`
/// makes later items finish first, the worst case for order reconstruction.
///
/// # Example
///
/// ```
/// use ironpool::testing::reversed_delay;
/// use std::time::Duration;
///
/// let unit = Duration::from_millis(1);
/// assert_eq!(reversed_delay(0, 5, unit), Duration::from_millis(5));
/// assert_eq!(reversed_delay(5, 5, unit), Duration::ZERO);
/// assert_eq!(reversed_delay(9, 5, unit), Duration::ZERO);
/// ```
#[must_use]
pub fn reversed_delay(value: u64, span: u64, unit: Duration) -> Duration {
    let steps = u32::try_from(span.saturating_sub(value)).unwrap_or(u32::MAX);
    unit.saturating_mul(steps)
}

/// A deterministic pseudo-random delay between zero and `unit * 7`.
///
/// The same `value` always yields the same delay, so a failing test replays.
#[must_use]
pub fn scrambled_delay(value: u64, unit: Duration) -> Duration {
    // splitmix64 finalizer
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    // z % 8 < 8, so the cast is lossless
    #[allow(clippy::cast_possible_truncation)]
    let steps = (z % 8) as u32;
    unit.saturating_mul(steps)
}
