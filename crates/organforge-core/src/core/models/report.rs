use super::biometrics::PatientBiometrics;
use super::formulation::ComponentQuantity;
use super::geometry::GeometrySummary;
use super::materials::MaterialRequirements;
use super::organ::OrganType;
use super::scale::ScaleFactor;
use crate::core::templates::template::ComplexityTier;
use serde::{Deserialize, Serialize};

/// One instruction of the bioink preparation protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparationStep {
    pub step: u32,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageConditions {
    pub temperature_c: f64,
    pub shelf_life_hours: f64,
}

/// Everything a downstream consumer needs to print and cost one organ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulationReport {
    pub organ_type: OrganType,
    pub display_name: String,
    pub complexity_tier: ComplexityTier,
    pub total_cost_usd: f64,
    pub estimated_print_time_hours: f64,
    pub printed_volume_ml: f64,
    pub printing_viscosity_mpa_s: f64,
    pub cells_required: f64,
    pub adjusted_cell_density_per_ml: f64,
    pub cell_types: Vec<String>,
    pub patient: PatientBiometrics,
    pub scale_factor: ScaleFactor,
    pub geometry: GeometrySummary,
    pub storage: StorageConditions,
    pub components: Vec<ComponentQuantity>,
    pub preparation_protocol: Vec<PreparationStep>,
    pub materials: MaterialRequirements,
}

impl FormulationReport {
    pub fn component(&self, name: &str) -> Option<&ComponentQuantity> {
        self.components.iter().find(|c| c.name == name)
    }
}
