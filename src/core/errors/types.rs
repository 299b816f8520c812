//! Core error types for the tiling engine.
//!
//! This module defines the error enum returned by every fallible operation in the
//! crate, together with the [`ProcessingStage`] used to label where a failure
//! happened. All errors are precondition violations detected before any output
//! buffer is written.

use thiserror::Error;

use crate::core::config::ConfigError;

/// Enum representing the stage of processing an error or log event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Grid dimension computation.
    GridComputation,
    /// Splitting a source array into patches.
    Tiling,
    /// Writing predictions back into a full-size array.
    Assembly,
    /// Loss or metric evaluation.
    LossEvaluation,
    /// Cropping and image conversion helpers.
    ImageProcessing,
    /// Generic processing.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::GridComputation => write!(f, "grid computation"),
            ProcessingStage::Tiling => write!(f, "tiling"),
            ProcessingStage::Assembly => write!(f, "assembly"),
            ProcessingStage::LossEvaluation => write!(f, "loss evaluation"),
            ProcessingStage::ImageProcessing => write!(f, "image processing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Errors that can occur while tiling, assembling or evaluating arrays.
#[derive(Error, Debug)]
pub enum TileError {
    /// An array does not have the shape an operation requires.
    #[error("{operation}: expected shape {expected}, got {actual:?}")]
    ShapeMismatch {
        /// The operation that rejected the array.
        operation: &'static str,
        /// Human readable description of the required shape.
        expected: String,
        /// The shape that was actually supplied.
        actual: Vec<usize>,
    },

    /// A patch sequence length disagrees with the grid it should fill.
    #[error("patch count mismatch: grid needs {expected} patches, got {actual}")]
    SizeMismatch {
        /// Number of patches implied by the grid dimensions.
        expected: usize,
        /// Number of patches supplied.
        actual: usize,
    },

    /// An argument is outside its valid domain.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// A message describing the invalid argument.
        message: String,
    },

    /// A configuration failed validation.
    #[error("configuration")]
    Config(#[from] ConfigError),

    /// Error from ndarray shape construction.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// Error from the image crate.
    #[error("image")]
    Image(#[from] image::ImageError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl TileError {
    /// Creates a shape mismatch error.
    ///
    /// # Arguments
    ///
    /// * `operation` - The operation that rejected the input
    /// * `expected` - Description of the required shape, e.g. `"(H, W, 4)"`
    /// * `actual` - The shape that was supplied
    pub fn shape_mismatch(
        operation: &'static str,
        expected: impl Into<String>,
        actual: &[usize],
    ) -> Self {
        Self::ShapeMismatch {
            operation,
            expected: expected.into(),
            actual: actual.to_vec(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns the processing stage this error is usually raised from.
    pub fn stage(&self) -> ProcessingStage {
        match self {
            Self::ShapeMismatch { operation, .. } => match *operation {
                "create_patches" => ProcessingStage::Tiling,
                "assemble_patches" => ProcessingStage::Assembly,
                op if op.ends_with("_loss") || op == "get_final_output" => {
                    ProcessingStage::LossEvaluation
                }
                _ => ProcessingStage::ImageProcessing,
            },
            Self::SizeMismatch { .. } => ProcessingStage::Assembly,
            Self::InvalidArgument { .. } => ProcessingStage::GridComputation,
            Self::Image(_) | Self::Io(_) => ProcessingStage::ImageProcessing,
            Self::Config(_) | Self::Tensor(_) => ProcessingStage::Generic,
        }
    }
}

/// Result alias used across the crate.
pub type TileResult<T> = Result<T, TileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message() {
        let err = TileError::shape_mismatch("create_patches", "(H, W, 4)", &[6, 6, 3]);
        assert_eq!(
            err.to_string(),
            "create_patches: expected shape (H, W, 4), got [6, 6, 3]"
        );
        assert_eq!(err.stage(), ProcessingStage::Tiling);
    }

    #[test]
    fn test_size_mismatch_message() {
        let err = TileError::SizeMismatch {
            expected: 4,
            actual: 3,
        };
        assert!(err.to_string().contains("needs 4 patches, got 3"));
        assert_eq!(err.stage(), ProcessingStage::Assembly);
    }

    #[test]
    fn test_stage_for_loss_operations() {
        let err = TileError::shape_mismatch("compositional_loss", "(N, H, W, 11)", &[1, 2, 2, 4]);
        assert_eq!(err.stage(), ProcessingStage::LossEvaluation);
        assert_eq!(err.stage().to_string(), "loss evaluation");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: TileError = ConfigError::InvalidValue {
            field: "patch_size",
            message: "must be positive".to_string(),
        }
        .into();
        assert!(matches!(err, TileError::Config(_)));
    }
}
