//! Error handling for the tiling engine.

mod types;

pub use types::{ProcessingStage, TileError, TileResult};
