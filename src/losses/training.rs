//! Training losses over batched matting tensors.
//!
//! Ground truth tensors have shape (N, H, W, 11) with channels
//! `[alpha, mask, image(3), fg(3), bg(3)]`; predictions have shape (N, H, W, C)
//! with the predicted alpha in channel 0. Both losses use the differentiable
//! approximation `sqrt(diff² + ε²)` of the absolute difference and are normalized
//! by the number of pixels in the mask.

use ndarray::{ArrayBase, ArrayView3, Axis, Data, Ix4, Zip};
use tracing::trace;

use crate::core::constants::gt_channels;
use crate::core::{ConfigValidator, LossConfig, TileResult};
use crate::ensure_shape;

/// Alpha prediction and compositional losses with a shared [`LossConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MattingLoss {
    config: LossConfig,
}

impl MattingLoss {
    /// Creates a loss evaluator after validating `config`.
    pub fn new(config: LossConfig) -> TileResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &LossConfig {
        &self.config
    }

    /// Absolute difference between ground truth and predicted alpha inside the mask.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::ShapeMismatch`](crate::core::TileError::ShapeMismatch)
    /// if `y_true` has fewer than 2 channels, `y_pred` has none, or the batch and
    /// spatial dimensions differ.
    pub fn alpha_prediction<S1, S2>(
        &self,
        y_true: &ArrayBase<S1, Ix4>,
        y_pred: &ArrayBase<S2, Ix4>,
    ) -> TileResult<f32>
    where
        S1: Data<Elem = f32>,
        S2: Data<Elem = f32>,
    {
        check_shapes("alpha_prediction_loss", y_true, y_pred, gt_channels::MASK + 1)?;

        let mask = y_true.index_axis(Axis(3), gt_channels::MASK);
        let alpha_true = y_true.index_axis(Axis(3), gt_channels::ALPHA);
        let alpha_pred = y_pred.index_axis(Axis(3), 0);
        let eps_sqr = f64::from(self.config.epsilon_sqr());

        let total = Zip::from(&alpha_pred)
            .and(&alpha_true)
            .and(&mask)
            .fold(0.0f64, |acc, &pred, &truth, &m| {
                acc + charbonnier(f64::from((pred - truth) * m), eps_sqr)
            });

        Ok(self.normalize(total, &mask))
    }

    /// Difference between the ground truth image and the image composited from the
    /// ground truth foreground and background with the predicted alpha.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::ShapeMismatch`](crate::core::TileError::ShapeMismatch)
    /// if `y_true` has fewer than 11 channels, `y_pred` has none, or the batch and
    /// spatial dimensions differ.
    pub fn compositional<S1, S2>(
        &self,
        y_true: &ArrayBase<S1, Ix4>,
        y_pred: &ArrayBase<S2, Ix4>,
    ) -> TileResult<f32>
    where
        S1: Data<Elem = f32>,
        S2: Data<Elem = f32>,
    {
        check_shapes("compositional_loss", y_true, y_pred, gt_channels::COUNT)?;

        let mask = y_true.index_axis(Axis(3), gt_channels::MASK);
        let alpha_pred = y_pred.index_axis(Axis(3), 0);
        let eps_sqr = f64::from(self.config.epsilon_sqr());

        let mut total = 0.0f64;
        for c in 0..3 {
            let image = y_true.index_axis(Axis(3), gt_channels::IMAGE + c);
            let fg = y_true.index_axis(Axis(3), gt_channels::FOREGROUND + c);
            let bg = y_true.index_axis(Axis(3), gt_channels::BACKGROUND + c);
            total += Zip::from(&alpha_pred)
                .and(&image)
                .and(&fg)
                .and(&bg)
                .and(&mask)
                .fold(0.0f64, |acc, &alpha, &image, &fg, &bg, &m| {
                    let composited = alpha * fg + (1.0 - alpha) * bg;
                    acc + charbonnier(f64::from((composited - image) * m), eps_sqr)
                });
        }

        Ok(self.normalize(total, &mask))
    }

    /// Weighted sum `w * alpha + (1 - w) * compositional` with `w = alpha_weight`.
    pub fn overall<S1, S2>(
        &self,
        y_true: &ArrayBase<S1, Ix4>,
        y_pred: &ArrayBase<S2, Ix4>,
    ) -> TileResult<f32>
    where
        S1: Data<Elem = f32>,
        S2: Data<Elem = f32>,
    {
        let weight = self.config.alpha_weight;
        let alpha = self.alpha_prediction(y_true, y_pred)?;
        let compositional = self.compositional(y_true, y_pred)?;
        trace!(alpha, compositional, weight, "matting loss terms");
        Ok(weight * alpha + (1.0 - weight) * compositional)
    }

    fn normalize(&self, total: f64, mask: &ArrayView3<f32>) -> f32 {
        let num_pixels = mask.iter().map(|&m| f64::from(m)).sum::<f64>();
        (total / (num_pixels + f64::from(self.config.epsilon))) as f32
    }
}

#[inline]
fn charbonnier(diff: f64, eps_sqr: f64) -> f64 {
    (diff * diff + eps_sqr).sqrt()
}

fn check_shapes<S1, S2>(
    operation: &'static str,
    y_true: &ArrayBase<S1, Ix4>,
    y_pred: &ArrayBase<S2, Ix4>,
    min_true_channels: usize,
) -> TileResult<()>
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
{
    let (n, h, w, c) = y_true.dim();
    ensure_shape!(
        c >= min_true_channels,
        operation,
        format!("(N, H, W, >={min_true_channels}) ground truth"),
        y_true.shape()
    );
    let (pn, ph, pw, pc) = y_pred.dim();
    ensure_shape!(
        (pn, ph, pw) == (n, h, w) && pc >= 1,
        operation,
        format!("({n}, {h}, {w}, >=1) prediction"),
        y_pred.shape()
    );
    Ok(())
}

/// [`MattingLoss::alpha_prediction`] with the default configuration.
pub fn alpha_prediction_loss<S1, S2>(
    y_true: &ArrayBase<S1, Ix4>,
    y_pred: &ArrayBase<S2, Ix4>,
) -> TileResult<f32>
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
{
    MattingLoss::default().alpha_prediction(y_true, y_pred)
}

/// [`MattingLoss::compositional`] with the default configuration.
pub fn compositional_loss<S1, S2>(
    y_true: &ArrayBase<S1, Ix4>,
    y_pred: &ArrayBase<S2, Ix4>,
) -> TileResult<f32>
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
{
    MattingLoss::default().compositional(y_true, y_pred)
}

/// [`MattingLoss::overall`] with the default configuration (equal weights).
pub fn overall_loss<S1, S2>(
    y_true: &ArrayBase<S1, Ix4>,
    y_pred: &ArrayBase<S2, Ix4>,
) -> TileResult<f32>
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
{
    MattingLoss::default().overall(y_true, y_pred)
}
