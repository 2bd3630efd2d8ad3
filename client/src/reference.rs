use measure_shared::{CalibrateRequest, ReferenceType};

use crate::error::ValidationError;

/// Reference object for one calibration attempt, as entered in the form.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceSpec {
    pub reference_type: ReferenceType,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl ReferenceSpec {
    pub fn preset(reference_type: ReferenceType) -> Self {
        Self {
            reference_type,
            width: None,
            height: None,
        }
    }

    pub fn custom(width: f64, height: f64) -> Self {
        Self {
            reference_type: ReferenceType::Custom,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Unknown selector values fall back to `Custom` so they are validated
    /// rather than silently calibrated against a preset.
    pub fn from_form(kind: &str, width: &str, height: &str) -> Self {
        Self {
            reference_type: ReferenceType::from_value(kind).unwrap_or(ReferenceType::Custom),
            width: parse_dimension(width),
            height: parse_dimension(height),
        }
    }

    pub fn validate(&self) -> Result<CalibrateRequest, ValidationError> {
        if self.reference_type != ReferenceType::Custom {
            return Ok(CalibrateRequest {
                reference_type: self.reference_type,
                width: None,
                height: None,
            });
        }
        let (Some(width), Some(height)) = (self.width, self.height) else {
            return Err(ValidationError::MissingDimensions);
        };
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ValidationError::NonPositiveDimensions);
        }
        Ok(CalibrateRequest {
            reference_type: ReferenceType::Custom,
            width: Some(width),
            height: Some(height),
        })
    }
}

fn parse_dimension(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.replace(',', ".").parse::<f64>().ok()
}
