//! Shared parallel processing configuration types.

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigValidator};

/// Configuration for patch-level parallelism.
///
/// Tiling and assembly touch disjoint memory per patch, so they can run on the
/// rayon pool without synchronization. Small grids are processed sequentially
/// because the pool dispatch costs more than the copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of threads to use for parallel processing.
    /// If None, rayon will use the default thread pool size (typically number of CPU cores).
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Patch counts at or below this value are processed sequentially.
    /// Default: 4 (matches DEFAULT_PARALLEL_THRESHOLD constant)
    #[serde(default = "ParallelPolicy::default_utility_threshold")]
    pub utility_threshold: usize,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never goes parallel.
    pub fn sequential() -> Self {
        Self {
            max_threads: None,
            utility_threshold: usize::MAX,
        }
    }

    /// Set the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the sequential/parallel threshold.
    pub fn with_utility_threshold(mut self, threshold: usize) -> Self {
        self.utility_threshold = threshold;
        self
    }

    /// Returns true if `work_items` patches should be processed on the rayon pool.
    pub fn should_parallelize(&self, work_items: usize) -> bool {
        work_items > self.utility_threshold
    }

    /// Install the global rayon thread pool with the configured number of threads.
    ///
    /// This method should be called once at application startup before any parallel
    /// processing occurs. If `max_threads` is None, this method does nothing and
    /// rayon will use its default thread pool size.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the thread pool was successfully configured
    /// - `Ok(false)` if `max_threads` is None (no configuration needed)
    /// - `Err` if the thread pool has already been initialized
    pub fn install_global_thread_pool(&self) -> Result<bool, rayon::ThreadPoolBuildError> {
        if let Some(num_threads) = self.max_threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn default_utility_threshold() -> usize {
        crate::core::constants::DEFAULT_PARALLEL_THRESHOLD
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            utility_threshold: Self::default_utility_threshold(),
        }
    }
}

impl ConfigValidator for ParallelPolicy {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threads) = self.max_threads {
            self.validate_positive_usize(threads, "max_threads")?;
        }
        Ok(())
    }
}
