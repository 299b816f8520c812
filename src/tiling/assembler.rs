//! Reassembling per-patch scalar predictions into one 8-bit output array.

use ndarray::{Array2, ArrayBase, ArrayView2, ArrayViewMut2, Axis, Data, Ix3, Zip};
use tracing::{debug, warn};

use super::grid::{GridDims, patch_dims};
use crate::core::{ParallelPolicy, ProcessingStage, TileError, TileResult};
use crate::ensure_shape;

/// Conversion of a prediction element to the 8-bit output type.
///
/// Implementations use Rust `as` semantics: floats truncate toward zero and
/// saturate at `0` and `255` (NaN becomes `0`), wider integers keep their low
/// byte.
pub trait PixelCast: Copy {
    /// Converts `self` to `u8`.
    fn to_u8(self) -> u8;
}

crate::impl_pixel_cast!(u8, u16, u32, i32, i64, f32, f64);

/// Places `pred_patches` of shape `(N, patch_size, patch_size)` on the grid
/// implied by `mat_size = (height, width)`.
///
/// Patch `i` is written to grid cell `(i % rows, i / rows)`, the same mapping
/// [`create_patches`](super::create_patches) uses. The output has shape
/// `(rows * patch_size, cols * patch_size)`; padding added during tiling is not
/// removed (see [`crop_to_extent`](crate::utils::crop_to_extent)).
///
/// `mat_size` may be either the original extent or the padded extent of the
/// tiled array: both yield the same grid.
///
/// # Errors
///
/// * [`TileError::InvalidArgument`] if `patch_size` is zero
/// * [`TileError::SizeMismatch`] if `N != rows * cols`
/// * [`TileError::ShapeMismatch`] if a patch is not `patch_size × patch_size`
pub fn assemble_patches<S, T>(
    pred_patches: &ArrayBase<S, Ix3>,
    mat_size: (usize, usize),
    patch_size: usize,
) -> TileResult<Array2<u8>>
where
    S: Data<Elem = T>,
    T: PixelCast + Sync,
{
    let dims = patch_dims(mat_size, patch_size)?;
    assemble_patches_with_dims(pred_patches, dims, patch_size, &ParallelPolicy::default())
}

/// Same as [`assemble_patches`] with an explicit grid and parallel policy.
///
/// # Errors
///
/// Same as [`assemble_patches`], with `N` checked against `dims`.
pub fn assemble_patches_with_dims<S, T>(
    pred_patches: &ArrayBase<S, Ix3>,
    dims: GridDims,
    patch_size: usize,
    policy: &ParallelPolicy,
) -> TileResult<Array2<u8>>
where
    S: Data<Elem = T>,
    T: PixelCast + Sync,
{
    if patch_size == 0 {
        return Err(TileError::invalid_argument("patch size must be greater than 0"));
    }
    let (count, patch_h, patch_w) = pred_patches.dim();
    check_count(dims, count)?;
    ensure_shape!(
        patch_h == patch_size && patch_w == patch_size,
        "assemble_patches",
        format!("(N, {patch_size}, {patch_size})"),
        pred_patches.shape()
    );

    let pred_patches = pred_patches.view();
    place_patches(dims, patch_size, policy, |index| {
        pred_patches.index_axis(Axis(0), index)
    })
}

/// Assembles a list of separately owned 2D patches, ordered by linear patch index.
///
/// Behaves like [`assemble_patches`]; every patch is checked before the output
/// is written.
pub fn assemble_patch_list<T>(
    pred_patches: &[ArrayView2<'_, T>],
    mat_size: (usize, usize),
    patch_size: usize,
) -> TileResult<Array2<u8>>
where
    T: PixelCast + Sync,
{
    let dims = patch_dims(mat_size, patch_size)?;
    check_count(dims, pred_patches.len())?;
    for patch in pred_patches {
        ensure_shape!(
            patch.dim() == (patch_size, patch_size),
            "assemble_patches",
            format!("({patch_size}, {patch_size})"),
            patch.shape()
        );
    }

    place_patches(dims, patch_size, &ParallelPolicy::default(), |index| {
        pred_patches[index].view()
    })
}

fn check_count(dims: GridDims, actual: usize) -> TileResult<()> {
    if actual != dims.count() {
        warn!(
            stage = %ProcessingStage::Assembly,
            "Patch count {} does not fill a {}x{} grid",
            actual, dims.rows, dims.cols
        );
        return Err(TileError::SizeMismatch {
            expected: dims.count(),
            actual,
        });
    }
    Ok(())
}

/// Writes every patch into its block of a fresh zero-filled output.
///
/// Callers have already checked the patch count and shapes.
fn place_patches<'a, T, F>(
    dims: GridDims,
    patch_size: usize,
    policy: &ParallelPolicy,
    patch_at: F,
) -> TileResult<Array2<u8>>
where
    T: PixelCast + Sync + 'a,
    F: Fn(usize) -> ArrayView2<'a, T> + Sync,
{
    let (height, width) = dims.padded_extent(patch_size);
    let parallel = policy.should_parallelize(dims.count());
    debug!(
        "Assembling {} patches into {}x{} output ({}x{} grid, parallel: {})",
        dims.count(),
        height,
        width,
        dims.rows,
        dims.cols,
        parallel
    );

    let mut assembled = Array2::<u8>::zeros((height, width));
    let place = |(row, col): (usize, usize), mut block: ArrayViewMut2<u8>| {
        let patch = patch_at(dims.linear_index(row, col));
        Zip::from(&mut block)
            .and(&patch)
            .for_each(|dst, &src| *dst = src.to_u8());
    };

    // Blocks of the output map one-to-one onto grid cells.
    let blocks = Zip::indexed(assembled.exact_chunks_mut((patch_size, patch_size)));
    if parallel {
        blocks.par_for_each(place);
    } else {
        blocks.for_each(place);
    }

    Ok(assembled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::create_patches;
    use ndarray::{Array3, s};

    fn constant_patches(values: &[f32], patch_size: usize) -> Array3<f32> {
        let mut patches = Array3::<f32>::zeros((values.len(), patch_size, patch_size));
        for (mut patch, &value) in patches.axis_iter_mut(Axis(0)).zip(values) {
            patch.fill(value);
        }
        patches
    }

    #[test]
    fn test_constant_patches_land_on_grid() {
        let patches = constant_patches(&[10.0, 20.0, 30.0, 40.0], 4);
        let out = assemble_patches(&patches, (6, 6), 4).unwrap();
        assert_eq!(out.dim(), (8, 8));
        assert!(out.slice(s![0..4, 0..4]).iter().all(|&v| v == 10));
        assert!(out.slice(s![4..8, 0..4]).iter().all(|&v| v == 20));
        assert!(out.slice(s![0..4, 4..8]).iter().all(|&v| v == 30));
        assert!(out.slice(s![4..8, 4..8]).iter().all(|&v| v == 40));
    }

    #[test]
    fn test_count_mismatch() {
        let patches = constant_patches(&[1.0, 2.0, 3.0], 4);
        let err = assemble_patches(&patches, (6, 6), 4).unwrap_err();
        assert!(matches!(
            err,
            TileError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_patch_shape_mismatch() {
        let patches = Array3::<f32>::zeros((4, 3, 4));
        let err = assemble_patches(&patches, (6, 6), 4).unwrap_err();
        assert!(matches!(err, TileError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_zero_patch_size() {
        let patches = Array3::<f32>::zeros((0, 0, 0));
        assert!(matches!(
            assemble_patches(&patches, (6, 6), 0),
            Err(TileError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_zero_patch_size_with_dims() {
        let patches = Array3::<f32>::zeros((1, 0, 0));
        assert!(matches!(
            assemble_patches_with_dims(&patches, GridDims::new(1, 1), 0, &ParallelPolicy::default()),
            Err(TileError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_grid_disagreeing_with_count() {
        let patches = constant_patches(&[1.0, 2.0, 3.0, 4.0], 2);
        let err = assemble_patches_with_dims(
            &patches,
            GridDims::new(3, 2),
            2,
            &ParallelPolicy::sequential(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TileError::SizeMismatch {
                expected: 6,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_cast_truncates_and_saturates() {
        let patches = constant_patches(&[12.9, -3.0, 300.0, f32::NAN], 1);
        let out = assemble_patches(&patches, (2, 2), 1).unwrap();
        assert_eq!(out[[0, 0]], 12);
        assert_eq!(out[[1, 0]], 0);
        assert_eq!(out[[0, 1]], 255);
        assert_eq!(out[[1, 1]], 0);
    }

    #[test]
    fn test_u8_patches_copied_verbatim() {
        let patches = Array3::<u8>::from_shape_fn((6, 2, 2), |(i, y, x)| (i * 10 + y * 2 + x) as u8);
        let out = assemble_patches(&patches, (4, 6), 2).unwrap();
        let dims = GridDims::new(2, 3);
        for i in 0..6 {
            let (row, col) = dims.position(i);
            let block = out.slice(s![row * 2..row * 2 + 2, col * 2..col * 2 + 2]);
            assert_eq!(block, patches.index_axis(Axis(0), i));
        }
    }

    #[test]
    fn test_roundtrip_through_tiler() {
        let source = Array3::<f32>::from_shape_fn((8, 12, 4), |(y, x, c)| {
            if c == 0 { ((y * 12 + x) % 251) as f32 } else { 0.0 }
        });
        let patches = create_patches(&source, 4).unwrap();
        let first_channel = patches.index_axis(Axis(3), 0);
        let out = assemble_patches(&first_channel, (8, 12), 4).unwrap();
        for ((y, x), &v) in out.indexed_iter() {
            assert_eq!(v as f32, source[[y, x, 0]]);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let patches =
            Array3::<f32>::from_shape_fn((12, 3, 3), |(i, y, x)| (i * 9 + y * 3 + x) as f32);
        let dims = GridDims::new(3, 4);
        let sequential =
            assemble_patches_with_dims(&patches, dims, 3, &ParallelPolicy::sequential()).unwrap();
        let parallel = assemble_patches_with_dims(
            &patches,
            dims,
            3,
            &ParallelPolicy::new().with_utility_threshold(0),
        )
        .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_patch_list_matches_array_input() {
        let patches = constant_patches(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2);
        let views: Vec<_> = patches.axis_iter(Axis(0)).collect();
        let from_list = assemble_patch_list(&views, (5, 3), 2).unwrap();
        let from_array = assemble_patches(&patches, (5, 3), 2).unwrap();
        assert_eq!(from_list, from_array);
        assert_eq!(from_list.dim(), (6, 4));
    }

    #[test]
    fn test_patch_list_rejects_odd_patch() {
        let good = Array2::<f32>::zeros((2, 2));
        let bad = Array2::<f32>::zeros((2, 1));
        let views = vec![good.view(), bad.view()];
        assert!(matches!(
            assemble_patch_list(&views, (4, 2), 2),
            Err(TileError::ShapeMismatch { .. })
        ));
    }
}
