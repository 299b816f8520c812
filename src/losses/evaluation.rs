//! Evaluation metrics restricted to the trimap's unknown region.
//!
//! Predictions and targets are alpha mattes on the 0..=255 scale; the trimap
//! marks the unknown region with `unknown_code`.

use ndarray::{Array2, ArrayView2, Zip};

use super::training::MattingLoss;
use crate::core::{SAD_SCALE, TileError, TileResult, UNKNOWN_CODE};
use crate::ensure_shape;

fn check_same_shape(
    operation: &'static str,
    reference: &ArrayView2<f32>,
    other: &[usize],
) -> TileResult<()> {
    ensure_shape!(
        reference.shape() == other,
        operation,
        format!("{:?}", reference.shape()),
        other
    );
    Ok(())
}

/// Mean squared error over the unknown region using [`UNKNOWN_CODE`].
///
/// See [`compute_mse_loss_with_code`].
pub fn compute_mse_loss(
    pred: ArrayView2<f32>,
    target: ArrayView2<f32>,
    trimap: ArrayView2<u8>,
) -> TileResult<f32> {
    compute_mse_loss_with_code(pred, target, trimap, UNKNOWN_CODE)
}

/// Mean squared error `sum(((pred - target) / 255)² · mask) / sum(mask)` where
/// `mask` selects the pixels whose trimap value equals `unknown_code`.
///
/// # Errors
///
/// * [`TileError::ShapeMismatch`] if the three arrays differ in shape
/// * [`TileError::InvalidArgument`] if the trimap has no unknown pixel
pub fn compute_mse_loss_with_code(
    pred: ArrayView2<f32>,
    target: ArrayView2<f32>,
    trimap: ArrayView2<u8>,
    unknown_code: u8,
) -> TileResult<f32> {
    check_same_shape("compute_mse_loss", &pred, target.shape())?;
    check_same_shape("compute_mse_loss", &pred, trimap.shape())?;

    let (sum, unknown) = Zip::from(&pred).and(&target).and(&trimap).fold(
        (0.0f64, 0usize),
        |(sum, unknown), &p, &t, &code| {
            if code == unknown_code {
                let error = f64::from(p - t) / 255.0;
                (sum + error * error, unknown + 1)
            } else {
                (sum, unknown)
            }
        },
    );

    if unknown == 0 {
        return Err(TileError::invalid_argument(format!(
            "trimap has no unknown pixels (value {unknown_code})"
        )));
    }
    Ok((sum / unknown as f64) as f32)
}

/// Sum of absolute differences over the unknown region using [`UNKNOWN_CODE`].
///
/// See [`compute_sad_loss_with_code`].
pub fn compute_sad_loss(
    pred: ArrayView2<f32>,
    target: ArrayView2<f32>,
    trimap: ArrayView2<u8>,
) -> TileResult<f32> {
    compute_sad_loss_with_code(pred, target, trimap, UNKNOWN_CODE)
}

/// `sum(|pred - target| / 255 · mask) / 1000`, reported in thousands because
/// evaluation images are large.
///
/// # Errors
///
/// Returns [`TileError::ShapeMismatch`] if the three arrays differ in shape.
pub fn compute_sad_loss_with_code(
    pred: ArrayView2<f32>,
    target: ArrayView2<f32>,
    trimap: ArrayView2<u8>,
    unknown_code: u8,
) -> TileResult<f32> {
    check_same_shape("compute_sad_loss", &pred, target.shape())?;
    check_same_shape("compute_sad_loss", &pred, trimap.shape())?;

    let sum = Zip::from(&pred)
        .and(&target)
        .and(&trimap)
        .fold(0.0f64, |sum, &p, &t, &code| {
            if code == unknown_code {
                sum + f64::from((p - t).abs()) / 255.0
            } else {
                sum
            }
        });
    Ok((sum / f64::from(SAD_SCALE)) as f32)
}

/// Merges a prediction with its trimap: unknown pixels take the predicted value,
/// known pixels keep the trimap value.
pub fn get_final_output(out: ArrayView2<f32>, trimap: ArrayView2<u8>) -> TileResult<Array2<f32>> {
    get_final_output_with_code(out, trimap, UNKNOWN_CODE)
}

/// [`get_final_output`] with an explicit unknown code.
pub fn get_final_output_with_code(
    out: ArrayView2<f32>,
    trimap: ArrayView2<u8>,
    unknown_code: u8,
) -> TileResult<Array2<f32>> {
    check_same_shape("get_final_output", &out, trimap.shape())?;
    Ok(Zip::from(&out).and(&trimap).map_collect(|&alpha, &code| {
        if code == unknown_code {
            alpha
        } else {
            f32::from(code)
        }
    }))
}

impl MattingLoss {
    /// [`compute_mse_loss_with_code`] with the configured unknown code.
    pub fn mse(
        &self,
        pred: ArrayView2<f32>,
        target: ArrayView2<f32>,
        trimap: ArrayView2<u8>,
    ) -> TileResult<f32> {
        compute_mse_loss_with_code(pred, target, trimap, self.config().unknown_code)
    }

    /// [`compute_sad_loss_with_code`] with the configured unknown code.
    pub fn sad(
        &self,
        pred: ArrayView2<f32>,
        target: ArrayView2<f32>,
        trimap: ArrayView2<u8>,
    ) -> TileResult<f32> {
        compute_sad_loss_with_code(pred, target, trimap, self.config().unknown_code)
    }

    /// [`get_final_output_with_code`] with the configured unknown code.
    pub fn final_output(
        &self,
        out: ArrayView2<f32>,
        trimap: ArrayView2<u8>,
    ) -> TileResult<Array2<f32>> {
        get_final_output_with_code(out, trimap, self.config().unknown_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LossConfig;
    use ndarray::array;

    #[test]
    fn test_mse_only_counts_unknown_pixels() {
        let pred = array![[255.0f32, 0.0], [51.0, 7.0]];
        let target = array![[0.0f32, 0.0], [0.0, 200.0]];
        let trimap = array![[128u8, 128], [128, 255]];
        let mse = compute_mse_loss(pred.view(), target.view(), trimap.view()).unwrap();
        // (1.0² + 0² + 0.2²) / 3
        assert!((mse - 1.04 / 3.0).abs() < 1e-6, "mse = {mse}");
    }

    #[test]
    fn test_mse_without_unknown_region() {
        let pred = array![[1.0f32]];
        let trimap = array![[0u8]];
        assert!(matches!(
            compute_mse_loss(pred.view(), pred.view(), trimap.view()),
            Err(TileError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_identical_inputs_have_zero_error() {
        let pred = array![[10.0f32, 20.0], [30.0, 40.0]];
        let trimap = array![[128u8, 128], [0, 128]];
        assert_eq!(
            compute_mse_loss(pred.view(), pred.view(), trimap.view()).unwrap(),
            0.0
        );
        assert_eq!(
            compute_sad_loss(pred.view(), pred.view(), trimap.view()).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_sad_scaled_by_thousand() {
        let pred = array![[255.0f32, 255.0], [255.0, 255.0]];
        let target = array![[0.0f32, 0.0], [0.0, 0.0]];
        let trimap = array![[128u8, 128], [128, 0]];
        let sad = compute_sad_loss(pred.view(), target.view(), trimap.view()).unwrap();
        assert!((sad - 0.003).abs() < 1e-7, "sad = {sad}");
    }

    #[test]
    fn test_custom_unknown_code() {
        let pred = array![[255.0f32, 255.0]];
        let target = array![[0.0f32, 0.0]];
        let trimap = array![[128u8, 100]];
        let sad =
            compute_sad_loss_with_code(pred.view(), target.view(), trimap.view(), 100).unwrap();
        assert!((sad - 0.001).abs() < 1e-7);
    }

    #[test]
    fn test_shape_mismatch() {
        let pred = array![[1.0f32, 2.0]];
        let target = array![[1.0f32], [2.0]];
        let trimap = array![[128u8, 128]];
        assert!(matches!(
            compute_sad_loss(pred.view(), target.view(), trimap.view()),
            Err(TileError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_final_output_keeps_known_pixels() {
        let out = array![[12.0f32, 34.0], [56.0, 78.0]];
        let trimap = array![[0u8, 128], [255, 128]];
        let merged = get_final_output(out.view(), trimap.view()).unwrap();
        assert_eq!(merged, array![[0.0f32, 34.0], [255.0, 78.0]]);
    }

    #[test]
    fn test_configured_unknown_code_drives_metrics() {
        let config: LossConfig = serde_json::from_str(r#"{"unknown_code": 100}"#).unwrap();
        let loss = MattingLoss::new(config).unwrap();

        let pred = array![[255.0f32, 51.0]];
        let target = array![[0.0f32, 0.0]];
        let trimap = array![[128u8, 100]];

        let mse = loss.mse(pred.view(), target.view(), trimap.view()).unwrap();
        assert!((mse - 0.04).abs() < 1e-6, "mse = {mse}");
        let sad = loss.sad(pred.view(), target.view(), trimap.view()).unwrap();
        assert!((sad - 0.0002).abs() < 1e-7, "sad = {sad}");
        let merged = loss.final_output(pred.view(), trimap.view()).unwrap();
        assert_eq!(merged, array![[128.0f32, 51.0]]);

        let default_sad = MattingLoss::default()
            .sad(pred.view(), target.view(), trimap.view())
            .unwrap();
        assert!((default_sad - 0.001).abs() < 1e-7);
    }
}
