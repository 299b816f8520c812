//! Zero-padded crops with an optional nearest-neighbour resize.

use image::imageops;
use image::{ImageBuffer, Luma, Pixel, Rgb};
use ndarray::{Array2, Array3, ArrayBase, ArrayView3, Axis, Data, Ix2, Ix3, s};

use crate::core::{DEFAULT_CROP_SIZE, TileError, TileResult};
use crate::ensure_shape;

/// Crops a single-channel matrix, see [`safe_crop_rgb`] for the semantics.
pub fn safe_crop<S>(
    mat: &ArrayBase<S, Ix2>,
    x: usize,
    y: usize,
    crop_size: (usize, usize),
    output_size: (usize, usize),
) -> TileResult<Array2<f32>>
where
    S: Data<Elem = f32>,
{
    let cropped = crop_channels(mat.view().insert_axis(Axis(2)), x, y, crop_size, output_size)?;
    Ok(cropped.remove_axis(Axis(2)))
}

/// [`safe_crop`] resized to [`DEFAULT_CROP_SIZE`], the network input size.
pub fn safe_crop_default<S>(
    mat: &ArrayBase<S, Ix2>,
    x: usize,
    y: usize,
    crop_size: (usize, usize),
) -> TileResult<Array2<f32>>
where
    S: Data<Elem = f32>,
{
    safe_crop(mat, x, y, crop_size, DEFAULT_CROP_SIZE)
}

/// Crops `crop_size = (height, width)` pixels starting at column `x`, row `y`.
///
/// The crop is zero-filled first and the in-bounds part of the source region is
/// copied into its top-left corner, so regions reaching past the border are
/// padded instead of rejected. When `crop_size` differs from `output_size` the
/// crop is resized to `output_size` with nearest-neighbour sampling from the
/// `image` crate.
///
/// # Errors
///
/// * [`TileError::ShapeMismatch`] if `mat` does not have 3 channels
/// * [`TileError::InvalidArgument`] if a size is zero or exceeds `u32`
pub fn safe_crop_rgb<S>(
    mat: &ArrayBase<S, Ix3>,
    x: usize,
    y: usize,
    crop_size: (usize, usize),
    output_size: (usize, usize),
) -> TileResult<Array3<f32>>
where
    S: Data<Elem = f32>,
{
    ensure_shape!(mat.dim().2 == 3, "safe_crop", "(H, W, 3)", mat.shape());
    crop_channels(mat.view(), x, y, crop_size, output_size)
}

fn crop_channels(
    mat: ArrayView3<f32>,
    x: usize,
    y: usize,
    crop_size: (usize, usize),
    output_size: (usize, usize),
) -> TileResult<Array3<f32>> {
    let (crop_h, crop_w) = crop_size;
    let (out_h, out_w) = output_size;
    if crop_h == 0 || crop_w == 0 || out_h == 0 || out_w == 0 {
        return Err(TileError::invalid_argument(format!(
            "crop size {crop_size:?} and output size {output_size:?} must be non-empty"
        )));
    }

    let (height, width, channels) = mat.dim();
    let mut ret = Array3::<f32>::zeros((crop_h, crop_w, channels));
    if y < height && x < width {
        let y_end = (y + crop_h).min(height);
        let x_end = (x + crop_w).min(width);
        ret.slice_mut(s![..y_end - y, ..x_end - x, ..])
            .assign(&mat.slice(s![y..y_end, x..x_end, ..]));
    }

    if crop_size == output_size {
        return Ok(ret);
    }

    match channels {
        1 => resize_nearest::<Luma<f32>>(ret, output_size),
        3 => resize_nearest::<Rgb<f32>>(ret, output_size),
        _ => Err(TileError::shape_mismatch(
            "safe_crop",
            "(H, W) or (H, W, 3)",
            ret.shape(),
        )),
    }
}

/// Nearest-neighbour resize of a channel-last crop held in a single image buffer.
///
/// Samples with `imageops::sample_nearest`, which returns source pixels unchanged;
/// `imageops::resize` would clamp float channels to `0.0..=1.0`.
fn resize_nearest<P>(crop: Array3<f32>, (out_h, out_w): (usize, usize)) -> TileResult<Array3<f32>>
where
    P: Pixel<Subpixel = f32>,
{
    let (crop_h, crop_w, channels) = crop.dim();
    let (raw, _) = crop.into_raw_vec_and_offset();
    let buffer: ImageBuffer<P, Vec<f32>> =
        ImageBuffer::from_raw(to_u32(crop_w)?, to_u32(crop_h)?, raw)
            .ok_or_else(|| TileError::invalid_argument("crop buffer does not match its size"))?;

    let mut resized = Vec::with_capacity(out_h * out_w * channels);
    for y in 0..out_h {
        let v = (y as f32 + 0.5) / out_h as f32;
        for x in 0..out_w {
            let u = (x as f32 + 0.5) / out_w as f32;
            let pixel = imageops::sample_nearest(&buffer, u, v)
                .ok_or_else(|| TileError::invalid_argument("sample outside crop"))?;
            resized.extend_from_slice(pixel.channels());
        }
    }
    Ok(Array3::from_shape_vec((out_h, out_w, channels), resized)?)
}

fn to_u32(value: usize) -> TileResult<u32> {
    u32::try_from(value)
        .map_err(|_| TileError::invalid_argument(format!("size {value} exceeds u32 range")))
}
