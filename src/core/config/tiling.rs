//! Tiling and loss configuration.

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigValidator};
use super::parallel::ParallelPolicy;
use crate::core::constants::{DEFAULT_ALPHA_WEIGHT, DEFAULT_PATCH_SIZE, EPSILON, UNKNOWN_CODE};

/// Configuration for [`PatchTiler`](crate::tiling::PatchTiler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Edge length of the square patches.
    #[serde(default = "TilingConfig::default_patch_size")]
    pub patch_size: usize,

    /// Patch-level parallelism.
    #[serde(default)]
    pub parallel: ParallelPolicy,
}

impl TilingConfig {
    /// Creates a configuration with the given patch size and the default policy.
    pub fn new(patch_size: usize) -> Self {
        Self {
            patch_size,
            parallel: ParallelPolicy::default(),
        }
    }

    /// Replaces the parallel policy.
    pub fn with_parallel(mut self, parallel: ParallelPolicy) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn default_patch_size() -> usize {
        DEFAULT_PATCH_SIZE
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PATCH_SIZE)
    }
}

impl ConfigValidator for TilingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive_usize(self.patch_size, "patch_size")?;
        self.parallel.validate()
    }
}

/// Parameters of the matting losses and evaluation metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossConfig {
    /// Smoothing term; the losses use `sqrt(diff² + epsilon²)`.
    #[serde(default = "LossConfig::default_epsilon")]
    pub epsilon: f32,

    /// Weight of the alpha prediction loss in the overall loss.
    #[serde(default = "LossConfig::default_alpha_weight")]
    pub alpha_weight: f32,

    /// Trimap value of the unknown region.
    #[serde(default = "LossConfig::default_unknown_code")]
    pub unknown_code: u8,
}

impl LossConfig {
    fn default_epsilon() -> f32 {
        EPSILON
    }

    fn default_alpha_weight() -> f32 {
        DEFAULT_ALPHA_WEIGHT
    }

    fn default_unknown_code() -> u8 {
        UNKNOWN_CODE
    }

    /// `epsilon²`.
    pub fn epsilon_sqr(&self) -> f32 {
        self.epsilon * self.epsilon
    }
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            alpha_weight: DEFAULT_ALPHA_WEIGHT,
            unknown_code: UNKNOWN_CODE,
        }
    }
}

impl ConfigValidator for LossConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ConfigError::invalid(
                "epsilon",
                format!("must be a positive finite number, got {}", self.epsilon),
            ));
        }
        self.validate_f32_range(self.alpha_weight, 0.0, 1.0, "alpha_weight")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiling_config_defaults() {
        let config = TilingConfig::default();
        assert_eq!(config.patch_size, 320);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tiling_config_rejects_zero_patch_size() {
        let err = TilingConfig::new(0).validate().unwrap_err();
        assert!(err.to_string().contains("patch_size"));
    }

    #[test]
    fn test_tiling_config_json_roundtrip() {
        let config = TilingConfig::new(64)
            .with_parallel(ParallelPolicy::new().with_max_threads(Some(2)));
        let json = serde_json::to_string(&config).unwrap();
        let parsed = TilingConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_tiling_config_from_partial_json() {
        let config = TilingConfig::from_json_str(r#"{"patch_size": 16}"#).unwrap();
        assert_eq!(config.patch_size, 16);
        assert_eq!(config.parallel, ParallelPolicy::default());
    }

    #[test]
    fn test_tiling_config_from_invalid_json() {
        assert!(matches!(
            TilingConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            TilingConfig::from_json_str(r#"{"patch_size": 0}"#),
            Err(ConfigError::InvalidValue { field: "patch_size", .. })
        ));
    }

    #[test]
    fn test_loss_config_validation() {
        let config = LossConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.unknown_code, 128);
        assert!((config.epsilon_sqr() - 1e-12).abs() < 1e-18);

        let bad_weight = LossConfig {
            alpha_weight: 1.5,
            ..LossConfig::default()
        };
        assert!(bad_weight.validate().is_err());

        let bad_eps = LossConfig {
            epsilon: 0.0,
            ..LossConfig::default()
        };
        assert!(bad_eps.validate().is_err());
    }
}
