//! # matte-tile
//!
//! Patch tiling and reassembly for alpha-matting inference on large images.
//!
//! A matting network takes fixed-size inputs, so a full-resolution image and its
//! trimap are cut into a grid of square patches, each patch is run through the
//! network, and the per-patch alpha predictions are stitched back together.
//!
//! ## Modules
//!
//! * [`tiling`] - grid computation, patch extraction and reassembly
//! * [`losses`] - matting training losses and evaluation metrics
//! * [`utils`] - image conversion, cropping, device queries, logging setup
//! * [`core`] - errors, configuration and constants
//!
//! ## Example
//!
//! ```
//! use image::{GrayImage, RgbImage};
//! use matte_tile::tiling::{assemble_patches, create_patches};
//! use matte_tile::utils::{compose_source, crop_to_extent};
//! use ndarray::{Array3, Axis};
//!
//! let image = RgbImage::new(10, 7);
//! let trimap = GrayImage::new(10, 7);
//! let source = compose_source(&image, &trimap)?;
//!
//! let patches = create_patches(&source, 4)?;
//! assert_eq!(patches.shape(), &[6, 4, 4, 4]);
//!
//! // Each patch would be run through the network here.
//! let predictions: Array3<f32> = patches.index_axis(Axis(3), 3).mapv(|v| v * 255.0);
//!
//! let alpha = assemble_patches(&predictions, (7, 10), 4)?;
//! let alpha = crop_to_extent(&alpha, (7, 10))?;
//! assert_eq!(alpha.dim(), (7, 10));
//! # Ok::<(), matte_tile::core::TileError>(())
//! ```

pub mod core;
pub mod losses;
pub mod tiling;
pub mod utils;

pub use crate::core::{TileError, TileResult};
pub use crate::tiling::{GridDims, PatchTiler, assemble_patches, create_patches, patch_dims};
