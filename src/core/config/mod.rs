//! Configuration management for the tiling engine.
//!
//! This module provides configuration types and validation traits for tiling,
//! parallelism and the matting losses.

pub mod errors;
pub mod parallel;
pub mod tiling;

pub use errors::{ConfigError, ConfigValidator, ConfigValidatorExt};
pub use parallel::ParallelPolicy;
pub use tiling::{LossConfig, TilingConfig};
