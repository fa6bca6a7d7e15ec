use super::materials::MaterialsRecipe;
use crate::core::models::biometrics::{BiometricsError, PatientBiometrics};
use crate::core::models::geometry::Dimensions;
use crate::core::models::organ::OrganType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A broken invariant in template data, reported by the `validate` methods.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateValidationError {
    #[error("reference patient is invalid: {0}")]
    Reference(#[from] BiometricsError),
    #[error("dimensions_cm must all be positive")]
    NonPositiveDimensions,
    #[error("{field} must be finite")]
    NonFinite { field: String },
    #[error("{field} must be a non-negative number, got {value}")]
    Negative { field: String, value: f64 },
    #[error("apex_taper must lie in [0, 1), got {0}")]
    ApexTaper(f64),
    #[error(
        "harmonic amplitudes and taper allow a non-positive radius (lower bound {bound:.4})"
    )]
    VanishingRadius { bound: f64 },
    #[error("age_curve.maturity_age must be positive")]
    MaturityAge,
    #[error("age_curve.decline_onset_age must not precede maturity_age")]
    DeclineBeforeMaturity,
    #[error("age_curve bounds must satisfy 0 < floor <= 1 <= ceiling, got [{floor}, {ceiling}]")]
    AgeBounds { floor: f64, ceiling: f64 },
    #[error("scaling bounds must satisfy 0 < min_scale <= max_scale, got [{min}, {max}]")]
    ScaleBounds { min: f64, max: f64 },
    #[error("bioink.overhead_factor must be at least 1.0, got {0}")]
    OverheadFactor(f64),
    #[error("bioink recipe has no components")]
    NoComponents,
    #[error("duplicate {section} entry '{name}'")]
    Duplicate { section: &'static str, name: String },
    #[error("'{name}' must have a positive density")]
    NonPositiveDensity { name: String },
    #[error("'{name}' must have a non-negative unit cost")]
    NegativeCost { name: String },
    #[error("solvent component '{name}' balances the volume and cannot declare a concentration")]
    SolventConcentration { name: String },
    #[error("component '{name}' requires a positive concentration_g_per_ml")]
    MissingConcentration { name: String },
    #[error("bioink recipe may declare at most one solvent component")]
    MultipleSolvents,
    #[error(
        "dry components occupy {fraction:.4} ml per ml of bioink, leaving no room for the solvent"
    )]
    NoRoomForSolvent { fraction: f64 },
    #[error("scaffold material '{name}' must declare exactly one of porosity or volume_fraction")]
    ScaffoldDosing { name: String },
    #[error("'{name}' has {field} = {value}, expected a value in (0, 1)")]
    Fraction {
        name: String,
        field: &'static str,
        value: f64,
    },
    #[error("biologic '{name}' requires a positive concentration_mg_per_ml")]
    BiologicConcentration { name: String },
}

pub(crate) fn non_negative(field: &str, value: f64) -> Result<(), TemplateValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(TemplateValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Reference data for one organ type.
///
/// A template is immutable once loaded. All stages of the pipeline read it, none of them
/// write it, so a single instance is shared by every concurrent request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganTemplate {
    pub organ_type: OrganType,
    pub display_name: String,
    /// The patient the baseline dimensions were authored for.
    pub reference: PatientBiometrics,
    pub dimensions_cm: Dimensions,
    pub shape: ShapeDescriptor,
    pub scaling: ScalingPolicy,
    pub cell_types: BTreeSet<String>,
    pub complexity_tier: ComplexityTier,
    /// Print time for the reference patient (scale factor 1.0).
    pub baseline_print_time_hours: f64,
    pub bioink: BioinkRecipe,
    /// Scaffold, biologic, and maturation inputs of the post-print bill of materials.
    #[serde(default)]
    pub materials: MaterialsRecipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComplexityTier::Low => "low",
            ComplexityTier::Medium => "medium",
            ComplexityTier::High => "high",
        })
    }
}

/// A single angular term of the radial modulation.
///
/// Contributes `amplitude * cos(azimuthal * theta + phase) * sin(polar * phi)` to the
/// radius, where the `sin` factor is omitted when `polar` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Harmonic {
    pub amplitude: f64,
    pub azimuthal: u32,
    #[serde(default)]
    pub polar: u32,
    #[serde(default)]
    pub phase: f64,
}

impl Harmonic {
    #[inline]
    fn term(&self, theta: f64, phi: f64) -> f64 {
        let polar_factor = if self.polar == 0 {
            1.0
        } else {
            (f64::from(self.polar) * phi).sin()
        };
        self.amplitude * (f64::from(self.azimuthal) * theta + self.phase).cos() * polar_factor
    }

    /// The term's mean over a full turn of `theta` at a pole, where `sin(polar * phi)`
    /// vanishes for every `polar > 0`.
    #[inline]
    fn pole_term(&self) -> f64 {
        if self.polar == 0 && self.azimuthal == 0 {
            self.amplitude * self.phase.cos()
        } else {
            0.0
        }
    }
}

/// Parametric description of an organ's base surface.
///
/// The surface is the unit sphere displaced radially by `r(theta, phi)` and then stretched
/// onto the ellipsoid spanned by the template's dimensions. `theta` is the azimuth in
/// `[0, 2π)` and `phi` the polar angle in `[0, π]`, with `phi = 0` at the top (+z).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeDescriptor {
    #[serde(default)]
    pub harmonics: Vec<Harmonic>,
    /// Fractional narrowing toward the bottom pole (0 = none).
    #[serde(default)]
    pub apex_taper: f64,
}

impl ShapeDescriptor {
    pub fn radius(&self, theta: f64, phi: f64) -> f64 {
        let modulation: f64 = self.harmonics.iter().map(|h| h.term(theta, phi)).sum();
        (1.0 + modulation) * self.taper(phi)
    }

    /// Radius at a pole (`phi` of `0` or `π`), where the azimuth is undefined.
    pub fn pole_radius(&self, phi: f64) -> f64 {
        let modulation: f64 = self.harmonics.iter().map(Harmonic::pole_term).sum();
        (1.0 + modulation) * self.taper(phi)
    }

    /// A lower bound on `radius` over the whole sphere.
    pub fn min_radius_bound(&self) -> f64 {
        let total_amplitude: f64 = self.harmonics.iter().map(|h| h.amplitude.abs()).sum();
        (1.0 - total_amplitude) * (1.0 - self.apex_taper)
    }

    #[inline]
    fn taper(&self, phi: f64) -> f64 {
        1.0 - self.apex_taper * (1.0 - phi.cos()) / 2.0
    }

    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        if !self.apex_taper.is_finite() || !(0.0..1.0).contains(&self.apex_taper) {
            return Err(TemplateValidationError::ApexTaper(self.apex_taper));
        }
        for (i, harmonic) in self.harmonics.iter().enumerate() {
            if !harmonic.amplitude.is_finite() || !harmonic.phase.is_finite() {
                return Err(TemplateValidationError::NonFinite {
                    field: format!("harmonic #{}", i + 1),
                });
            }
        }
        let bound = self.min_radius_bound();
        if bound <= 0.0 {
            return Err(TemplateValidationError::VanishingRadius { bound });
        }
        Ok(())
    }
}

/// Growth and atrophy multiplier as a function of age.
///
/// Below `maturity_age` the multiplier rises linearly toward `1 + juvenile_gain` at birth,
/// capturing that pediatric organs are large relative to body size. Between maturity and
/// `decline_onset_age` it is exactly `1`. Past the onset it changes by `decline_rate` per
/// year (negative rates model organs that keep growing). The result is always bounded to
/// `[floor, ceiling]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeCurve {
    pub maturity_age: f64,
    pub juvenile_gain: f64,
    pub decline_onset_age: f64,
    pub decline_rate: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl AgeCurve {
    pub fn multiplier(&self, age_years: f64) -> f64 {
        let raw = if age_years < self.maturity_age {
            1.0 + self.juvenile_gain * (1.0 - age_years / self.maturity_age)
        } else if age_years > self.decline_onset_age {
            1.0 - self.decline_rate * (age_years - self.decline_onset_age)
        } else {
            1.0
        };
        raw.clamp(self.floor, self.ceiling)
    }

    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        let fields = [
            ("maturity_age", self.maturity_age),
            ("juvenile_gain", self.juvenile_gain),
            ("decline_onset_age", self.decline_onset_age),
            ("decline_rate", self.decline_rate),
            ("floor", self.floor),
            ("ceiling", self.ceiling),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TemplateValidationError::NonFinite {
                field: format!("age_curve.{name}"),
            });
        }
        if self.maturity_age <= 0.0 {
            return Err(TemplateValidationError::MaturityAge);
        }
        if self.decline_onset_age < self.maturity_age {
            return Err(TemplateValidationError::DeclineBeforeMaturity);
        }
        if self.floor <= 0.0 || self.floor > 1.0 || self.ceiling < 1.0 {
            return Err(TemplateValidationError::AgeBounds {
                floor: self.floor,
                ceiling: self.ceiling,
            });
        }
        Ok(())
    }
}

/// Organ-specific parameters of the biometric scaling calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalingPolicy {
    pub height_exponent: f64,
    pub weight_exponent: f64,
    pub age_curve: AgeCurve,
    /// Lower bound on the volumetric scale factor.
    pub min_scale: f64,
    /// Upper bound on the volumetric scale factor.
    pub max_scale: f64,
}

impl ScalingPolicy {
    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        non_negative("scaling.height_exponent", self.height_exponent)?;
        non_negative("scaling.weight_exponent", self.weight_exponent)?;
        if !(self.min_scale.is_finite() && self.max_scale.is_finite())
            || self.min_scale <= 0.0
            || self.min_scale > self.max_scale
        {
            return Err(TemplateValidationError::ScaleBounds {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        self.age_curve.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentRole {
    Polymer,
    Crosslinker,
    Solvent,
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComponentRole::Polymer => "polymer",
            ComponentRole::Crosslinker => "crosslinker",
            ComponentRole::Solvent => "solvent",
        })
    }
}

/// One ingredient of a bioink recipe.
///
/// Dry components (polymers and crosslinkers) are dosed by a weight-per-volume
/// concentration and measured in grams. The single solvent component has no concentration:
/// it balances the recipe to one milliliter per milliliter of bioink and is measured in
/// milliliters. `unit_cost_usd` is per gram or per milliliter accordingly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BioinkComponent {
    pub name: String,
    pub role: ComponentRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration_g_per_ml: Option<f64>,
    pub density_g_per_ml: f64,
    pub unit_cost_usd: f64,
}

impl BioinkComponent {
    pub fn is_balance(&self) -> bool {
        self.role == ComponentRole::Solvent
    }

    pub fn unit(&self) -> &'static str {
        if self.is_balance() { "ml" } else { "g" }
    }

    /// Milliliters occupied by the dry component in one milliliter of bioink.
    fn dry_volume_fraction(&self) -> f64 {
        match self.concentration_g_per_ml {
            Some(c) if !self.is_balance() => c / self.density_g_per_ml,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BioinkRecipe {
    /// Multiplier on the organ volume that accounts for print waste and nozzle priming.
    pub overhead_factor: f64,
    pub cell_density_per_ml: f64,
    pub printing_viscosity_mpa_s: f64,
    pub shelf_life_hours: f64,
    pub storage_temperature_c: f64,
    pub components: Vec<BioinkComponent>,
}

impl BioinkRecipe {
    /// Per-milliliter amount of every component, in recipe order.
    ///
    /// Dry components yield their concentration (g/ml); the solvent yields the volume
    /// fraction left over by the dry components (ml/ml).
    pub fn component_ratios(&self) -> Vec<(&BioinkComponent, f64)> {
        let balance = 1.0 - self.dry_volume_fraction();
        self.components
            .iter()
            .map(|component| {
                let ratio = if component.is_balance() {
                    balance
                } else {
                    component.concentration_g_per_ml.unwrap_or(0.0)
                };
                (component, ratio)
            })
            .collect()
    }

    pub fn dry_volume_fraction(&self) -> f64 {
        self.components
            .iter()
            .map(BioinkComponent::dry_volume_fraction)
            .sum()
    }

    pub fn component(&self, name: &str) -> Option<&BioinkComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        if !self.overhead_factor.is_finite() || self.overhead_factor < 1.0 {
            return Err(TemplateValidationError::OverheadFactor(self.overhead_factor));
        }
        non_negative("bioink.cell_density_per_ml", self.cell_density_per_ml)?;
        non_negative("bioink.printing_viscosity_mpa_s", self.printing_viscosity_mpa_s)?;
        non_negative("bioink.shelf_life_hours", self.shelf_life_hours)?;
        if !self.storage_temperature_c.is_finite() {
            return Err(TemplateValidationError::NonFinite {
                field: "bioink.storage_temperature_c".to_string(),
            });
        }
        if self.components.is_empty() {
            return Err(TemplateValidationError::NoComponents);
        }

        let mut names = BTreeSet::new();
        let mut balance_count = 0;
        for component in &self.components {
            let name = || component.name.clone();
            if !names.insert(component.name.as_str()) {
                return Err(TemplateValidationError::Duplicate {
                    section: "bioink",
                    name: name(),
                });
            }
            if !component.density_g_per_ml.is_finite() || component.density_g_per_ml <= 0.0 {
                return Err(TemplateValidationError::NonPositiveDensity { name: name() });
            }
            if !component.unit_cost_usd.is_finite() || component.unit_cost_usd < 0.0 {
                return Err(TemplateValidationError::NegativeCost { name: name() });
            }
            match (component.is_balance(), component.concentration_g_per_ml) {
                (true, None) => balance_count += 1,
                (true, Some(_)) => {
                    return Err(TemplateValidationError::SolventConcentration { name: name() });
                }
                (false, Some(c)) if c.is_finite() && c > 0.0 => {}
                (false, _) => {
                    return Err(TemplateValidationError::MissingConcentration { name: name() });
                }
            }
        }
        if balance_count > 1 {
            return Err(TemplateValidationError::MultipleSolvents);
        }

        let fraction = self.dry_volume_fraction();
        if fraction >= 1.0 {
            return Err(TemplateValidationError::NoRoomForSolvent { fraction });
        }
        Ok(())
    }
}

impl OrganTemplate {
    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        self.reference.validate()?;
        let dims = self.dimensions_cm;
        if [dims.length, dims.width, dims.height]
            .iter()
            .any(|d| !d.is_finite() || *d <= 0.0)
        {
            return Err(TemplateValidationError::NonPositiveDimensions);
        }
        non_negative("baseline_print_time_hours", self.baseline_print_time_hours)?;
        self.shape.validate()?;
        self.scaling.validate()?;
        self.bioink.validate()?;
        self.materials.validate()
    }
}
