//! Splitting a 4-channel source array into fixed-size, zero-padded patches.

use ndarray::{Array4, ArrayBase, ArrayViewMut3, Axis, Data, Ix3, s};
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use super::grid::{GridDims, patch_dims};
use crate::core::{ParallelPolicy, ProcessingStage, SOURCE_CHANNELS, TileError, TileResult};

/// Splits `source` of shape (H, W, 4) into square patches of `patch_size`.
///
/// The result has shape `(rows * cols, patch_size, patch_size, 4)` where
/// `(rows, cols)` is [`patch_dims`] of `(H, W)`. The patch covering grid cell
/// `(row, col)` is stored at index `row + col * rows`. Patches that extend past
/// the bottom or right border hold the valid source region in their top-left
/// corner and zeros elsewhere.
///
/// Small grids are processed sequentially, larger ones on the rayon pool
/// according to the default [`ParallelPolicy`].
///
/// # Errors
///
/// * [`TileError::ShapeMismatch`](crate::core::TileError::ShapeMismatch) if the
///   last axis of `source` is not 4
/// * [`TileError::InvalidArgument`](crate::core::TileError::InvalidArgument) if
///   `patch_size` is zero
pub fn create_patches<S>(source: &ArrayBase<S, Ix3>, patch_size: usize) -> TileResult<Array4<f32>>
where
    S: Data<Elem = f32>,
{
    create_patches_with_policy(source, patch_size, &ParallelPolicy::default())
}

/// Same as [`create_patches`] with an explicit parallel policy.
pub fn create_patches_with_policy<S>(
    source: &ArrayBase<S, Ix3>,
    patch_size: usize,
    policy: &ParallelPolicy,
) -> TileResult<Array4<f32>>
where
    S: Data<Elem = f32>,
{
    let (height, width, channels) = source.dim();
    if channels != SOURCE_CHANNELS {
        warn!(
            stage = %ProcessingStage::Tiling,
            "Rejecting source with {} channels, expected R, G, B and trimap",
            channels
        );
        return Err(TileError::shape_mismatch(
            "create_patches",
            "(H, W, 4)",
            source.shape(),
        ));
    }

    let dims = patch_dims((height, width), patch_size)?;
    let count = dims.count();
    let parallel = policy.should_parallelize(count);
    debug!(
        "Tiling {}x{} source into {}x{} grid of {}px patches ({} patches, parallel: {})",
        height, width, dims.rows, dims.cols, patch_size, count, parallel
    );

    let mut patches = Array4::<f32>::zeros((count, patch_size, patch_size, SOURCE_CHANNELS));
    let source = source.view();
    let fill = |(index, mut patch): (usize, ArrayViewMut3<f32>)| {
        let (y0, y1, x0, x1) = source_window(dims, index, patch_size, height, width);
        trace!("patch {index}: rows {y0}..{y1}, cols {x0}..{x1}");
        patch
            .slice_mut(s![..y1 - y0, ..x1 - x0, ..])
            .assign(&source.slice(s![y0..y1, x0..x1, ..]));
    };

    if parallel {
        patches
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(fill);
    } else {
        patches.axis_iter_mut(Axis(0)).enumerate().for_each(fill);
    }

    Ok(patches)
}

/// Source rows `y0..y1` and columns `x0..x1` copied into patch `index`, clamped
/// to the source extent.
fn source_window(
    dims: GridDims,
    index: usize,
    patch_size: usize,
    height: usize,
    width: usize,
) -> (usize, usize, usize, usize) {
    let (row, col) = dims.position(index);
    let y0 = row * patch_size;
    let x0 = col * patch_size;
    (
        y0,
        (y0 + patch_size).min(height),
        x0,
        (x0 + patch_size).min(width),
    )
}
