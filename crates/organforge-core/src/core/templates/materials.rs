use super::template::{TemplateValidationError, non_negative};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Share of the non-porous skeleton of a porous scaffold that is deposited as solid
/// strut material.
pub const SCAFFOLD_SOLID_FRACTION: f64 = 0.3;

/// Organ-specific inputs of the post-print bill of materials.
///
/// Amounts are dosed per milliliter of printed construct. Everything that is the same for
/// every organ (culture medium, antibiotics, quality control, labor) is not template data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialsRecipe {
    #[serde(default)]
    pub electrical_stimulation: bool,
    #[serde(default)]
    pub flow_perfusion: bool,
    #[serde(default)]
    pub scaffold: Vec<ScaffoldMaterial>,
    #[serde(default)]
    pub biologics: Vec<Biologic>,
}

/// A structural scaffold material.
///
/// Porous frameworks declare their `porosity`; fillers and coatings declare the
/// `volume_fraction` of the construct they occupy. Exactly one of the two is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaffoldMaterial {
    pub name: String,
    pub density_g_per_ml: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub porosity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_fraction: Option<f64>,
    pub cost_usd_per_kg: f64,
}

impl ScaffoldMaterial {
    /// Grams of material per milliliter of printed construct.
    pub fn grams_per_ml(&self) -> f64 {
        let solid_fraction = match (self.porosity, self.volume_fraction) {
            (Some(porosity), _) => (1.0 - porosity) * SCAFFOLD_SOLID_FRACTION,
            (None, Some(fraction)) => fraction,
            (None, None) => 0.0,
        };
        solid_fraction * self.density_g_per_ml
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiologicKind {
    GrowthFactor,
    ExtracellularProtein,
    Nutrient,
}

impl BiologicKind {
    /// Growth factors are dosed in nanograms per milliliter and bought by the milligram.
    pub fn unit(&self) -> &'static str {
        match self {
            BiologicKind::GrowthFactor => "mg",
            BiologicKind::ExtracellularProtein | BiologicKind::Nutrient => "g",
        }
    }
}

impl fmt::Display for BiologicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BiologicKind::GrowthFactor => "growth_factor",
            BiologicKind::ExtracellularProtein => "extracellular_protein",
            BiologicKind::Nutrient => "nutrient",
        })
    }
}

/// A growth factor, matrix protein, or nutrient supplement of the culture.
///
/// `unit_cost_usd` is per [`BiologicKind::unit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Biologic {
    pub name: String,
    pub kind: BiologicKind,
    pub concentration_mg_per_ml: f64,
    pub unit_cost_usd: f64,
}

impl Biologic {
    /// Amount per milliliter of construct, in [`BiologicKind::unit`].
    pub fn amount_per_ml(&self) -> f64 {
        match self.kind {
            BiologicKind::GrowthFactor => self.concentration_mg_per_ml,
            BiologicKind::ExtracellularProtein | BiologicKind::Nutrient => {
                self.concentration_mg_per_ml / 1000.0
            }
        }
    }
}

impl MaterialsRecipe {
    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        let mut names = BTreeSet::new();
        let mut check_unique = |name: &str| {
            if names.insert(name.to_string()) {
                Ok(())
            } else {
                Err(TemplateValidationError::Duplicate {
                    section: "materials",
                    name: name.to_string(),
                })
            }
        };

        for material in &self.scaffold {
            check_unique(&material.name)?;
            if !material.density_g_per_ml.is_finite() || material.density_g_per_ml <= 0.0 {
                return Err(TemplateValidationError::NonPositiveDensity {
                    name: material.name.clone(),
                });
            }
            if !material.cost_usd_per_kg.is_finite() || material.cost_usd_per_kg < 0.0 {
                return Err(TemplateValidationError::NegativeCost {
                    name: material.name.clone(),
                });
            }
            let (field, value) = match (material.porosity, material.volume_fraction) {
                (Some(porosity), None) => ("porosity", porosity),
                (None, Some(fraction)) => ("volume_fraction", fraction),
                _ => {
                    return Err(TemplateValidationError::ScaffoldDosing {
                        name: material.name.clone(),
                    });
                }
            };
            if !(value > 0.0 && value < 1.0) {
                return Err(TemplateValidationError::Fraction {
                    name: material.name.clone(),
                    field,
                    value,
                });
            }
        }

        for biologic in &self.biologics {
            check_unique(&biologic.name)?;
            if !biologic.concentration_mg_per_ml.is_finite()
                || biologic.concentration_mg_per_ml <= 0.0
            {
                return Err(TemplateValidationError::BiologicConcentration {
                    name: biologic.name.clone(),
                });
            }
            non_negative(
                &format!("biologic '{}' unit_cost_usd", biologic.name),
                biologic.unit_cost_usd,
            )?;
        }
        Ok(())
    }
}
