//! Testing utilities for ironpool stages.
//!
//! This module ships with the library so downstream crates can test their own
//! stages the same way this crate tests itself:
//!
//! - **Assertions**: compare stage output with expected results, in order or as
//!   a multiset, and fail fast instead of hanging when a stage never closes
//! - **Delays**: artificial per-item processing times keyed to the item value,
//!   for shaking out ordering bugs
//!
//! # Quick Start
//!
//! ```
//! use ironpool::*;
//! use ironpool::testing::*;
//! use std::time::Duration;
//!
//! let out = assert_finishes_within(Duration::from_secs(5), || {
//!     collect_vec(ordered_map(Some(from_vec(vec![3u64, 2, 1])), 3, |x| {
//!         std::thread::sleep(reversed_delay(x, 3, Duration::from_millis(5)));
//!         x * 2
//!     }))
//! });
//! assert_collections_equal(&out, &[6, 4, 2]);
//! ```

pub mod assertions;
pub mod delays;

pub use assertions::*;
pub use delays::*;
