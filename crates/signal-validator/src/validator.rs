//! Aspect Ratio Validator

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Eye aspect ratio valid range
    pub ear_range: (f64, f64),
    /// Mouth aspect ratio valid range (wide yawns can exceed 1.0)
    pub mar_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ear_range: (0.0, 1.5),
            mar_range: (0.0, 2.0),
        }
    }
}

/// Validator for per-frame landmark ratios
#[derive(Debug, Clone)]
pub struct SignalValidator {
    config: ValidationConfig,
}

impl SignalValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate eye aspect ratio
    pub fn validate_ear(&self, ear: f64) -> Result<(), ValidationError> {
        self.validate_range("ear", ear, self.config.ear_range)
    }

    /// Validate mouth aspect ratio
    pub fn validate_mar(&self, mar: f64) -> Result<(), ValidationError> {
        self.validate_range("mar", mar, self.config.mar_range)
    }

    /// Validate both ratios of one frame; the first failure wins
    pub fn validate_ratios(&self, ear: f64, mar: f64) -> Result<(), ValidationError> {
        self.validate_ear(ear)?;
        self.validate_mar(mar)
    }
}

impl Default for SignalValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
