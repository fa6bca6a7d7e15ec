use crate::core::templates::template::ComponentRole;
use serde::{Deserialize, Serialize};

/// The measured amount and cost of one bioink component for a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentQuantity {
    pub name: String,
    pub role: ComponentRole,
    /// Rounded amount, in `unit`.
    pub quantity: f64,
    /// `g` for dry components and `ml` for the solvent.
    pub unit: String,
    pub unit_cost_usd: f64,
    /// `quantity * unit_cost_usd`, rounded to the configured cost precision.
    pub cost_usd: f64,
}

/// How many living cells the print needs, adjusted to the patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRequirement {
    pub cell_types: Vec<String>,
    pub base_density_per_ml: f64,
    pub density_adjustment: f64,
    pub adjusted_density_per_ml: f64,
    pub cells_required: f64,
}

/// Bioink quantities for a generated geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formulation {
    pub organ_volume_ml: f64,
    pub overhead_factor: f64,
    /// Organ volume plus print overhead.
    pub printed_volume_ml: f64,
    pub components: Vec<ComponentQuantity>,
    pub total_cost_usd: f64,
    pub cells: CellRequirement,
}

impl Formulation {
    pub fn component(&self, name: &str) -> Option<&ComponentQuantity> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Sum of unrounded line costs, `Σ quantity × unit_cost`.
    pub fn exact_cost_usd(&self) -> f64 {
        self.components
            .iter()
            .map(|c| c.quantity * c.unit_cost_usd)
            .sum()
    }
}
