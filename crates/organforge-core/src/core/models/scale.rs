use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which bound of the organ's scaling policy, if any, replaced the raw scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleClamp {
    #[default]
    None,
    Lower,
    Upper,
}

impl fmt::Display for ScaleClamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScaleClamp::None => "none",
            ScaleClamp::Lower => "lower",
            ScaleClamp::Upper => "upper",
        })
    }
}

/// A clinician's request to print the organ larger or smaller than the biometric scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeAdjustment {
    #[default]
    None,
    /// Every dimension ×1.1.
    Enlarged,
    /// Every dimension ×0.9.
    Reduced,
}

impl SizeAdjustment {
    pub fn linear_factor(&self) -> f64 {
        match self {
            SizeAdjustment::None => 1.0,
            SizeAdjustment::Enlarged => 1.1,
            SizeAdjustment::Reduced => 0.9,
        }
    }

    #[inline]
    pub fn volumetric_factor(&self) -> f64 {
        self.linear_factor().powi(3)
    }

    /// Picks the adjustment named in free-text special requirements, case-insensitively.
    /// "enlarged" takes precedence over "reduced".
    pub fn from_notes(notes: &str) -> Self {
        let notes = notes.to_lowercase();
        if notes.contains("enlarged") {
            SizeAdjustment::Enlarged
        } else if notes.contains("reduced") {
            SizeAdjustment::Reduced
        } else {
            SizeAdjustment::None
        }
    }
}

impl fmt::Display for SizeAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SizeAdjustment::None => "none",
            SizeAdjustment::Enlarged => "enlarged",
            SizeAdjustment::Reduced => "reduced",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported size adjustment '{0}' (expected 'none', 'enlarged' or 'reduced')")]
pub struct ParseSizeAdjustmentError(pub String);

impl FromStr for SizeAdjustment {
    type Err = ParseSizeAdjustmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SizeAdjustment::None),
            "enlarged" => Ok(SizeAdjustment::Enlarged),
            "reduced" => Ok(SizeAdjustment::Reduced),
            _ => Err(ParseSizeAdjustmentError(s.to_string())),
        }
    }
}

/// The result of scaling an organ template to a patient.
///
/// `value` is volumetric: the template's volume is multiplied by `value`, and every
/// linear dimension by [`ScaleFactor::linear`]. `raw` keeps the unclamped product so a
/// report can show how far the patient fell outside the supported range. A
/// [`SizeAdjustment`] is applied after clamping and is already included in `value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactor {
    pub body_size_ratio: f64,
    pub age_multiplier: f64,
    pub reference_age_multiplier: f64,
    pub raw: f64,
    pub value: f64,
    pub clamp: ScaleClamp,
    #[serde(default)]
    pub adjustment: SizeAdjustment,
}

impl ScaleFactor {
    /// Identity scale, as computed for the template's own reference patient.
    pub const IDENTITY: ScaleFactor = ScaleFactor {
        body_size_ratio: 1.0,
        age_multiplier: 1.0,
        reference_age_multiplier: 1.0,
        raw: 1.0,
        value: 1.0,
        clamp: ScaleClamp::None,
        adjustment: SizeAdjustment::None,
    };

    /// Applies a manual size request on top of the (possibly clamped) biometric scale.
    pub fn with_adjustment(self, adjustment: SizeAdjustment) -> Self {
        Self {
            value: self.value * adjustment.volumetric_factor(),
            adjustment,
            ..self
        }
    }

    #[inline]
    pub fn linear(&self) -> f64 {
        self.value.cbrt()
    }

    #[inline]
    pub fn is_clamped(&self) -> bool {
        self.clamp != ScaleClamp::None
    }
}
