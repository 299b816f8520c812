//! The core module of the tiling engine.
//!
//! This module contains the fundamental components shared by the tiling, loss and
//! utility modules:
//! - Configuration management
//! - Constants used throughout the crate
//! - Error handling
//! - Helper macros
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod constants;
pub mod errors;
#[macro_use]
pub mod macros;

pub use config::{
    ConfigError, ConfigValidator, ConfigValidatorExt, LossConfig, ParallelPolicy, TilingConfig,
};
pub use constants::*;
pub use errors::{ProcessingStage, TileError, TileResult};
