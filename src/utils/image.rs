//! Conversions between `image` buffers and the arrays used by the tiler.

use std::path::Path;

use image::{GrayImage, RgbImage};
use ndarray::{Array2, Array3, ArrayBase, Data, Ix2, s};

use crate::core::{SOURCE_CHANNELS, TileError, TileResult};
use crate::ensure_shape;

/// Builds the (H, W, 4) tiling source from an RGB image and its trimap.
///
/// All channels are scaled from 0..=255 to 0.0..=1.0, matching the network input.
///
/// # Errors
///
/// Returns [`TileError::ShapeMismatch`] if the two images differ in size.
pub fn compose_source(image: &RgbImage, trimap: &GrayImage) -> TileResult<Array3<f32>> {
    let (width, height) = image.dimensions();
    ensure_shape!(
        trimap.dimensions() == (width, height),
        "compose_source",
        format!("trimap of {height}x{width}"),
        &[trimap.height() as usize, trimap.width() as usize]
    );

    Ok(Array3::from_shape_fn(
        (height as usize, width as usize, SOURCE_CHANNELS),
        |(y, x, c)| {
            let value = if c < 3 {
                image.get_pixel(x as u32, y as u32)[c]
            } else {
                trimap.get_pixel(x as u32, y as u32)[0]
            };
            f32::from(value) / 255.0
        },
    ))
}

/// Decodes an image and its trimap from disk and builds the tiling source.
///
/// # Errors
///
/// * [`TileError::Image`] if either file cannot be opened or decoded
/// * [`TileError::ShapeMismatch`] if the two images differ in size
pub fn load_source(
    image_path: impl AsRef<Path>,
    trimap_path: impl AsRef<Path>,
) -> TileResult<Array3<f32>> {
    let image = image::open(image_path)?.to_rgb8();
    let trimap = image::open(trimap_path)?.to_luma8();
    compose_source(&image, &trimap)
}

/// Copies a grayscale image into an (H, W) array.
pub fn gray_to_array(image: &GrayImage) -> Array2<u8> {
    let (width, height) = image.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        image.get_pixel(x as u32, y as u32)[0]
    })
}

/// Converts an assembled (H, W) array into a grayscale image.
pub fn assembled_to_gray<S>(assembled: &ArrayBase<S, Ix2>) -> TileResult<GrayImage>
where
    S: Data<Elem = u8>,
{
    let (height, width) = assembled.dim();
    let width_u32 = u32::try_from(width)
        .map_err(|_| TileError::invalid_argument(format!("width {width} exceeds u32 range")))?;
    let height_u32 = u32::try_from(height)
        .map_err(|_| TileError::invalid_argument(format!("height {height} exceeds u32 range")))?;
    GrayImage::from_raw(width_u32, height_u32, assembled.iter().copied().collect())
        .ok_or_else(|| TileError::invalid_argument("assembled buffer does not match its size"))
}

/// Removes the tiling padding, keeping the top-left `extent = (height, width)`.
///
/// # Errors
///
/// Returns [`TileError::ShapeMismatch`] if `extent` is larger than `assembled`.
pub fn crop_to_extent<S>(
    assembled: &ArrayBase<S, Ix2>,
    extent: (usize, usize),
) -> TileResult<Array2<u8>>
where
    S: Data<Elem = u8>,
{
    let (height, width) = extent;
    let (rows, cols) = assembled.dim();
    ensure_shape!(
        height <= rows && width <= cols,
        "crop_to_extent",
        format!("at least ({height}, {width})"),
        assembled.shape()
    );
    Ok(assembled.slice(s![..height, ..width]).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_compose_source_layout() {
        let mut image = RgbImage::new(3, 2);
        image.put_pixel(2, 1, Rgb([255, 0, 51]));
        let mut trimap = GrayImage::new(3, 2);
        trimap.put_pixel(2, 1, Luma([128]));

        let source = compose_source(&image, &trimap).unwrap();
        assert_eq!(source.dim(), (2, 3, 4));
        assert_eq!(source[[1, 2, 0]], 1.0);
        assert_eq!(source[[1, 2, 1]], 0.0);
        assert!((source[[1, 2, 2]] - 0.2).abs() < 1e-6);
        assert!((source[[1, 2, 3]] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(source[[0, 0, 3]], 0.0);
    }

    #[test]
    fn test_compose_source_size_mismatch() {
        let image = RgbImage::new(3, 2);
        let trimap = GrayImage::new(2, 3);
        assert!(matches!(
            compose_source(&image, &trimap),
            Err(TileError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_gray_roundtrip() {
        let array = Array2::from_shape_fn((2, 3), |(y, x)| (y * 3 + x) as u8);
        let image = assembled_to_gray(&array).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1)[0], 5);
        assert_eq!(gray_to_array(&image), array);
    }

    #[test]
    fn test_crop_to_extent() {
        let assembled = Array2::from_shape_fn((8, 8), |(y, x)| (y * 8 + x) as u8);
        let cropped = crop_to_extent(&assembled, (6, 5)).unwrap();
        assert_eq!(cropped.dim(), (6, 5));
        assert_eq!(cropped[[5, 4]], 44);
        assert!(crop_to_extent(&assembled, (9, 1)).is_err());
    }

    #[test]
    fn test_load_source_from_png() {
        let dir = std::env::temp_dir().join(format!("matte-tile-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let image_path = dir.join("image.png");
        let trimap_path = dir.join("trimap.png");
        RgbImage::from_pixel(4, 3, Rgb([255, 0, 0])).save(&image_path).unwrap();
        GrayImage::from_pixel(4, 3, Luma([128])).save(&trimap_path).unwrap();

        let source = load_source(&image_path, &trimap_path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(source.dim(), (3, 4, 4));
        assert_eq!(source[[2, 3, 0]], 1.0);
        assert!((source[[2, 3, 3]] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_source_missing_file() {
        assert!(matches!(
            load_source("/nonexistent/matte-tile/a.png", "/nonexistent/matte-tile/b.png"),
            Err(TileError::Image(_))
        ));
    }
}
