//! Utility functions around the tiling engine.
//!
//! This module provides image bridging helpers, zero-padded cropping, device
//! queries, text overlays and logging setup.

pub mod crop;
pub mod device;
pub mod image;
#[cfg(feature = "visualization")]
pub mod visualization;

pub use crop::{safe_crop, safe_crop_default, safe_crop_rgb};
pub use device::{available_cpus, available_gpus};
pub use self::image::{
    assembled_to_gray, compose_source, crop_to_extent, gray_to_array, load_source,
};
#[cfg(feature = "visualization")]
pub use visualization::draw_str;

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber that logs to stderr.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Calling this more
/// than once, or after another subscriber was installed, has no effect.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
