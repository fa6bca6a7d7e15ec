use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const HEIGHT_CM_RANGE: (f64, f64) = (50.0, 250.0);
pub const WEIGHT_KG_RANGE: (f64, f64) = (1.0, 300.0);
pub const AGE_YEARS_RANGE: (f64, f64) = (0.0, 120.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricField {
    HeightCm,
    WeightKg,
    AgeYears,
}

impl BiometricField {
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            BiometricField::HeightCm => HEIGHT_CM_RANGE,
            BiometricField::WeightKg => WEIGHT_KG_RANGE,
            BiometricField::AgeYears => AGE_YEARS_RANGE,
        }
    }
}

impl fmt::Display for BiometricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BiometricField::HeightCm => "height_cm",
            BiometricField::WeightKg => "weight_kg",
            BiometricField::AgeYears => "age_years",
        })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("{field} = {value} is outside the accepted range [{min}, {max}]")]
pub struct BiometricsError {
    pub field: BiometricField,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Anthropometric inputs for a single organ-generation request.
///
/// Bounds are inclusive. Values outside them (including NaN and infinities) are rejected
/// by [`PatientBiometrics::validate`]; they are never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientBiometrics {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age_years: f64,
}

impl PatientBiometrics {
    pub fn new(height_cm: f64, weight_kg: f64, age_years: f64) -> Self {
        Self {
            height_cm,
            weight_kg,
            age_years,
        }
    }

    pub fn value(&self, field: BiometricField) -> f64 {
        match field {
            BiometricField::HeightCm => self.height_cm,
            BiometricField::WeightKg => self.weight_kg,
            BiometricField::AgeYears => self.age_years,
        }
    }

    /// Checks every field against its bounds, reporting the first violation in
    /// height, weight, age order.
    pub fn validate(&self) -> Result<(), BiometricsError> {
        for field in [
            BiometricField::HeightCm,
            BiometricField::WeightKg,
            BiometricField::AgeYears,
        ] {
            let value = self.value(field);
            let (min, max) = field.bounds();
            // `contains` is false for NaN.
            if !(min..=max).contains(&value) {
                return Err(BiometricsError {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}
