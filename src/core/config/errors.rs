//! Configuration errors and validation traits.

use thiserror::Error;

/// Errors raised while validating or loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value outside its valid range.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with the value.
        message: String,
    },

    /// The configuration source could not be parsed.
    #[error("failed to parse configuration")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates an [`ConfigError::InvalidValue`] for `field`.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// Trait for configuration types that can check their own invariants.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Validates that a `usize` field is strictly positive.
    fn validate_positive_usize(&self, value: usize, field: &'static str) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::invalid(field, "must be greater than 0"));
        }
        Ok(())
    }

    /// Validates that an `f32` field is finite and lies in `[min, max]`.
    fn validate_f32_range(
        &self,
        value: f32,
        min: f32,
        max: f32,
        field: &'static str,
    ) -> Result<(), ConfigError> {
        if !value.is_finite() || value < min || value > max {
            return Err(ConfigError::invalid(
                field,
                format!("must be within [{min}, {max}], got {value}"),
            ));
        }
        Ok(())
    }
}

/// Extension trait adding consuming validation helpers to any [`ConfigValidator`].
pub trait ConfigValidatorExt: ConfigValidator + Sized {
    /// Validates `self` and returns it on success.
    fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

impl<T: ConfigValidator> ConfigValidatorExt for T {}
