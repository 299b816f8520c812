//! Non-overlapping patch tiling and reassembly.
//!
//! A source array of shape (H, W, 4) is cut into a grid of square patches by
//! [`create_patches`], processed patch by patch elsewhere, and the resulting
//! scalar predictions are stitched back together by [`assemble_patches`]. Both
//! directions share [`patch_dims`] and the same linear index convention, so a
//! patch produced at index `i` is written back to the same grid cell.
//!
//! ```
//! use matte_tile::tiling::{assemble_patches, create_patches};
//! use ndarray::{Array3, Axis};
//!
//! let source = Array3::<f32>::ones((6, 6, 4));
//! let patches = create_patches(&source, 4)?;
//! assert_eq!(patches.shape(), &[4, 4, 4, 4]);
//!
//! // Pretend the trimap channel is the prediction.
//! let predictions = patches.index_axis(Axis(3), 3);
//! let alpha = assemble_patches(&predictions, (6, 6), 4)?;
//! assert_eq!(alpha.dim(), (8, 8));
//! # Ok::<(), matte_tile::core::TileError>(())
//! ```

mod assembler;
mod grid;
mod patch_tiler;
mod tiler;

pub use assembler::{PixelCast, assemble_patch_list, assemble_patches, assemble_patches_with_dims};
pub use grid::{GridDims, patch_dims};
pub use patch_tiler::PatchTiler;
pub use tiler::{create_patches, create_patches_with_policy};
