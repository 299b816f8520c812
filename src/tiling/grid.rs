//! Patch grid dimensions and the linear patch index mapping.

use serde::{Deserialize, Serialize};

use crate::core::{TileError, TileResult};

/// Number of patch rows and columns needed to cover an extent.
///
/// Patches are numbered with rows varying fastest: the patch at grid cell
/// `(row, col)` has linear index `row + col * rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    /// Patch rows (vertical axis).
    pub rows: usize,
    /// Patch columns (horizontal axis).
    pub cols: usize,
}

impl GridDims {
    /// Creates grid dimensions directly.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of patches in the grid.
    pub fn count(&self) -> usize {
        self.rows * self.cols
    }

    /// Linear patch index of grid cell `(row, col)`.
    #[inline]
    pub fn linear_index(&self, row: usize, col: usize) -> usize {
        row + col * self.rows
    }

    /// Grid cell `(row, col)` of linear patch index `index`.
    ///
    /// Inverse of [`GridDims::linear_index`].
    #[inline]
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index % self.rows, index / self.rows)
    }

    /// `(height, width)` covered by the grid at the given patch size, padding included.
    pub fn padded_extent(&self, patch_size: usize) -> (usize, usize) {
        (self.rows * patch_size, self.cols * patch_size)
    }
}

/// Computes the grid needed to cover `extent = (height, width)` with square
/// patches of `patch_size`.
///
/// Each axis is rounded up independently: `rows = ceil(height / patch_size)`,
/// `cols = ceil(width / patch_size)`.
///
/// # Errors
///
/// Returns [`TileError::InvalidArgument`] if `patch_size` is zero.
pub fn patch_dims(extent: (usize, usize), patch_size: usize) -> TileResult<GridDims> {
    if patch_size == 0 {
        return Err(TileError::invalid_argument(
            "patch size must be greater than 0",
        ));
    }
    let (height, width) = extent;
    Ok(GridDims {
        rows: height.div_ceil(patch_size),
        cols: width.div_ceil(patch_size),
    })
}
