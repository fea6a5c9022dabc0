//! # ironpool
//!
//! A **bounded-parallel stage toolkit** for channel pipelines. ironpool takes a
//! per-item function and turns it into a pipeline stage that reads one
//! [`crossbeam_channel`] receiver, runs the function on N worker threads, and
//! writes to a fresh output channel, optionally preserving input order.
//!
//! ## Key Features
//!
//! - **Stateless stages** - map, filter, flat_map and the combined map_and_filter
//! - **Ordered or unordered** - every stage has an `ordered_` twin that reproduces input order
//! - **Bounded parallelism** - exactly N workers, with back-pressure through rendezvous channels
//! - **Terminal consumer** - [`for_each()`] with early exit and leak-free draining
//! - **In-flight tracking** - [`InFlightCounter`] records live and peak concurrency
//! - **Config-driven stages** - [`StageConfig`] loads from JSON, [`Stage`] applies it
//!
//! ## Quick Start
//!
//! ```
//! use ironpool::*;
//!
//! let input = from_vec(vec![1, 2, 3, 4, 5]);
//!
//! // Square on 3 workers, keep results above 4, in input order.
//! let out = ordered_map_and_filter(Some(input), 3, |x: i32| {
//!     let y = x * x;
//!     (y > 4).then_some(y)
//! });
//!
//! assert_eq!(collect_vec(out), vec![9, 16, 25]);
//! ```
//!
//! ## Core Concepts
//!
//! ### Streams
//!
//! A stream is a [`crossbeam_channel::Receiver`]. Stages never close their
//! input; they read it until every sender is dropped. Each stage owns its
//! output and closes it exactly once, after all of its workers have stopped.
//! An absent input (`None`) produces an absent output, so optional stages
//! compose without special cases.
//!
//! ### Ordering
//!
//! - **Unordered** ([`map`], [`filter`], [`flat_map`], [`map_and_filter`]) -
//!   results appear as workers finish
//! - **Ordered** ([`ordered_map`], [`ordered_filter`], [`ordered_flat_map`],
//!   [`ordered_map_and_filter`]) - work still runs in parallel, but writes are
//!   released one item at a time in input order
//!
//! With one worker both flavours run on a single thread and keep input order.
//!
//! ### Early exit and draining
//!
//! [`for_each()`] stops handing out items once the callback returns `false`.
//! Whatever the producer still sends is discarded on a background thread
//! ([`drain_nb`]) until the producer closes the channel, so the producer never
//! blocks forever and the caller gets control back immediately.
//!
//! ### Failure model
//!
//! Stages have no error channel. If the consumer drops an output receiver, the
//! stage stops calling the function and drains its input. If the function
//! panics inside a map/filter/flat_map stage, the panic is logged through
//! `tracing`, the stage drains its input, and the output closes early. A panic
//! inside [`for_each()`] is resumed on the calling thread.
//!
//! ## Module Overview
//!
//! - [`combinators`] - map, filter, flat_map and their ordered variants
//! - [`engine`] - unordered worker pool ([`run_unordered`])
//! - [`ordered`] - order-preserving worker pool ([`run_ordered`])
//! - [`mod@for_each`] - terminal consumer and draining helpers
//! - [`counter`] - live/peak in-flight counter
//! - [`stage`] - configuration and config-driven stages
//! - [`extensions`] - method-call syntax on `Receiver`
//! - [`source`] - feeding and collecting channels
//! - [`testing`] - assertions and delay helpers for tests

pub mod combinators;
pub mod counter;
pub mod engine;
pub mod extensions;
pub mod for_each;
pub mod ordered;
pub mod source;
pub mod stage;
pub mod testing;

// General re-exports
pub use combinators::{
    filter, flat_map, map, map_and_filter, ordered_filter, ordered_flat_map, ordered_map,
    ordered_map_and_filter,
};
pub use counter::{CounterSnapshot, InFlightCounter, InFlightGuard};
pub use engine::{DEFAULT_THREAD_NAME, run_unordered};
pub use extensions::ReceiverExt;
pub use for_each::{drain, drain_nb, for_each};
pub use ordered::run_ordered;
pub use source::{collect_vec, from_iter, from_vec};
pub use stage::{ExecOrder, Stage, StageConfig};

pub use crossbeam_channel::{Receiver, SendError, Sender, bounded, unbounded};
