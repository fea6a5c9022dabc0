//! Stage configuration.
//!
//! [`StageConfig`] bundles the knobs of a stage (worker count, ordering, thread
//! names) so they can be loaded from JSON and validated once. A [`Stage`] built
//! from it runs the same combinators as the free functions, picking the ordered
//! or unordered engine from the config.
//!
//! ```
//! use ironpool::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let stage = Stage::new(StageConfig::default().with_workers(4).ordered())?;
//! let out = stage.map(from_vec(vec![1, 2, 3]), |x: i32| x * 10);
//! assert_eq!(out.iter().collect::<Vec<_>>(), vec![10, 20, 30]);
//! # Ok(())
//! # }
//! ```

use crate::combinators::{
    flat_map_in, map_and_filter_in, ordered_flat_map_in, ordered_map_and_filter_in,
};
use crate::engine::{DEFAULT_THREAD_NAME, Pool};
use crate::for_each::{drain_nb, for_each_in};
use anyhow::{Context, Result, ensure};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Whether a stage must reproduce input order at its output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecOrder {
    #[default]
    Unordered,
    Ordered,
}

/// Settings for one stage.
///
/// Missing JSON fields fall back to [`StageConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageConfig {
    /// Number of concurrent workers; must be at least 1.
    pub workers: usize,
    pub order: ExecOrder,
    /// Prefix for worker thread names, e.g. `resize` gives `resize-0`, `resize-1`, ...
    pub thread_name: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            order: ExecOrder::Unordered,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl StageConfig {
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: ExecOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn ordered(self) -> Self {
        self.with_order(ExecOrder::Ordered)
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `workers` is zero or `thread_name` is empty or
    /// contains a NUL byte.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.workers >= 1, "workers must be at least 1, got {}", self.workers);
        ensure!(!self.thread_name.is_empty(), "thread_name must not be empty");
        ensure!(
            !self.thread_name.contains('\0'),
            "thread_name must not contain NUL bytes"
        );
        Ok(())
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, has unknown fields, or fails
    /// [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).context("parsing stage config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is rejected by
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading stage config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }
}

/// A validated stage configuration that runs combinators.
#[derive(Clone, Debug)]
pub struct Stage {
    config: StageConfig,
    pool: Pool,
}

impl Stage {
    /// # Errors
    ///
    /// Returns an error if the config fails [`StageConfig::validate`].
    pub fn new(config: StageConfig) -> Result<Self> {
        config.validate()?;
        let pool = Pool::named(config.workers, &config.thread_name);
        Ok(Self { config, pool })
    }

    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    fn is_ordered(&self) -> bool {
        self.config.order == ExecOrder::Ordered
    }

    /// See [`map_and_filter`](crate::map_and_filter) and
    /// [`ordered_map_and_filter`](crate::ordered_map_and_filter).
    pub fn map_and_filter<A, B, F>(&self, input: Receiver<A>, f: F) -> Receiver<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: Fn(A) -> Option<B> + Send + Sync + 'static,
    {
        if self.is_ordered() {
            ordered_map_and_filter_in(&self.pool, input, f)
        } else {
            map_and_filter_in(&self.pool, input, f)
        }
    }

    pub fn map<A, B, F>(&self, input: Receiver<A>, f: F) -> Receiver<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.map_and_filter(input, move |a| Some(f(a)))
    }

    pub fn filter<A, F>(&self, input: Receiver<A>, f: F) -> Receiver<A>
    where
        A: Send + 'static,
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.map_and_filter(input, move |a| f(&a).then_some(a))
    }

    pub fn flat_map<A, B, I, F>(&self, input: Receiver<A>, f: F) -> Receiver<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        I: IntoIterator<Item = B>,
        F: Fn(A) -> I + Send + Sync + 'static,
    {
        if self.is_ordered() {
            ordered_flat_map_in(&self.pool, input, f)
        } else {
            flat_map_in(&self.pool, input, f)
        }
    }

    /// See [`for_each`](crate::for_each()). The order setting does not apply here.
    pub fn for_each<A, F>(&self, input: Receiver<A>, f: F)
    where
        A: Send + 'static,
        F: Fn(A) -> bool + Sync,
    {
        for_each_in(&self.pool, &input, &f);
        drain_nb(input);
    }
}
