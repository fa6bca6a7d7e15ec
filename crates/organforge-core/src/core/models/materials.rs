use crate::core::templates::materials::BiologicKind;
use serde::{Deserialize, Serialize};

/// One scaffold material of the bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub cost_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiologicLine {
    pub name: String,
    pub kind: BiologicKind,
    pub amount: f64,
    pub unit: String,
    pub cost_usd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stimulation {
    Mechanical,
    Electrical,
    FlowPerfusion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub assay: String,
    pub cost_usd: f64,
}

/// Culture, maturation, and testing of the printed construct before release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessing {
    pub maturation_weeks: u32,
    pub medium_changes: u32,
    pub culture_medium_l: f64,
    pub culture_medium_cost_usd: f64,
    pub antibiotics_ml: f64,
    pub antibiotics_cost_usd: f64,
    pub stimulation: Vec<Stimulation>,
    pub maturation_cost_usd: f64,
    pub quality_control: Vec<QualityCheck>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub scaffold_usd: f64,
    pub biologics_usd: f64,
    pub culture_medium_usd: f64,
    pub antibiotics_usd: f64,
    pub maturation_usd: f64,
    pub quality_control_usd: f64,
    pub labor_usd: f64,
    pub equipment_usd: f64,
    pub subtotal_usd: f64,
    pub overhead_usd: f64,
    pub total_usd: f64,
}

impl CostBreakdown {
    /// The categories that make up the subtotal, in report order.
    pub fn categories(&self) -> [(&'static str, f64); 8] {
        [
            ("scaffold", self.scaffold_usd),
            ("biologics", self.biologics_usd),
            ("culture_medium", self.culture_medium_usd),
            ("antibiotics", self.antibiotics_usd),
            ("maturation", self.maturation_usd),
            ("quality_control", self.quality_control_usd),
            ("labor", self.labor_usd),
            ("equipment", self.equipment_usd),
        ]
    }
}

/// Everything besides the bioink that goes into producing one organ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirements {
    /// Construct volume the amounts were dosed for (the printed bioink volume).
    pub construct_volume_ml: f64,
    pub scaffold: Vec<MaterialLine>,
    pub biologics: Vec<BiologicLine>,
    pub post_processing: PostProcessing,
    pub costs: CostBreakdown,
}

impl MaterialRequirements {
    pub fn scaffold_material(&self, name: &str) -> Option<&MaterialLine> {
        self.scaffold.iter().find(|line| line.name == name)
    }

    pub fn biologic(&self, name: &str) -> Option<&BiologicLine> {
        self.biologics.iter().find(|line| line.name == name)
    }
}
