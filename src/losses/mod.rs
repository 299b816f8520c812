//! Matting losses and evaluation metrics.
//!
//! Pure functions over dense `ndarray` tensors; no training framework involved.

pub mod evaluation;
pub mod training;

pub use evaluation::{
    compute_mse_loss, compute_mse_loss_with_code, compute_sad_loss, compute_sad_loss_with_code,
    get_final_output, get_final_output_with_code,
};
pub use training::{MattingLoss, alpha_prediction_loss, compositional_loss, overall_loss};
