use super::config::FormulationConfig;
use crate::core::models::materials::{
    BiologicLine, CostBreakdown, MaterialLine, MaterialRequirements, PostProcessing,
    QualityCheck, Stimulation,
};
use crate::core::templates::template::OrganTemplate;
use crate::core::utils::rounding::round_to;
use thiserror::Error;
use tracing::debug;

const MATURATION_WEEKS: u32 = 4;
const MEDIUM_CHANGES_PER_WEEK: u32 = 3;
/// Medium volume per exchange, per milliliter of construct.
const MEDIUM_ML_PER_ML: f64 = 5.0;
const MEDIUM_COST_USD_PER_L: f64 = 25.0;
const ANTIBIOTIC_ML_PER_ML: f64 = 0.01;
const ANTIBIOTIC_COST_USD_PER_ML: f64 = 0.15;
const MATURATION_COST_USD_PER_ML: f64 = 2.5;
const QUALITY_CONTROL_USD: [(&str, f64); 4] = [
    ("histology", 150.0),
    ("immunofluorescence", 200.0),
    ("mechanical_testing", 300.0),
    ("viability_assay", 100.0),
];
const LABOR_USD: f64 = 2500.0;
const EQUIPMENT_USD: f64 = 800.0;
const OVERHEAD_RATE: f64 = 0.2;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterialsError {
    #[error("Cannot dose materials for a non-positive construct volume ({volume_ml} ml)")]
    NonPositiveVolume { volume_ml: f64 },
}

/// Builds the bill of materials for a printed construct of `construct_volume_ml`.
///
/// Scaffold materials and biologics come from the template and scale linearly with the
/// volume. Culture medium, antibiotics, and maturation also scale with the volume; quality
/// control, labor, and equipment are flat. Amounts are rounded to `quantity_decimals` and
/// costs to `cost_decimals`, with line costs computed from the unrounded amounts. The
/// subtotal is the sum of the rounded categories and the overhead is 20% of it.
///
/// # Errors
///
/// Returns [`MaterialsError::NonPositiveVolume`] when the volume is zero, negative, or not
/// finite.
pub fn bill_of_materials(
    template: &OrganTemplate,
    construct_volume_ml: f64,
    config: &FormulationConfig,
) -> Result<MaterialRequirements, MaterialsError> {
    if !construct_volume_ml.is_finite() || construct_volume_ml <= 0.0 {
        return Err(MaterialsError::NonPositiveVolume {
            volume_ml: construct_volume_ml,
        });
    }
    let volume = construct_volume_ml;
    let amount = |value: f64| round_to(value, config.quantity_decimals);
    let cost = |value: f64| round_to(value, config.cost_decimals);
    let recipe = &template.materials;

    let scaffold: Vec<MaterialLine> = recipe
        .scaffold
        .iter()
        .map(|material| {
            let grams = volume * material.grams_per_ml();
            MaterialLine {
                name: material.name.clone(),
                amount: amount(grams),
                unit: "g".to_string(),
                cost_usd: cost(grams / 1000.0 * material.cost_usd_per_kg),
            }
        })
        .collect();

    let biologics: Vec<BiologicLine> = recipe
        .biologics
        .iter()
        .map(|biologic| {
            let quantity = volume * biologic.amount_per_ml();
            BiologicLine {
                name: biologic.name.clone(),
                kind: biologic.kind,
                amount: amount(quantity),
                unit: biologic.kind.unit().to_string(),
                cost_usd: cost(quantity * biologic.unit_cost_usd),
            }
        })
        .collect();

    let post_processing = post_processing(template, volume, config);

    let scaffold_usd = cost(scaffold.iter().map(|line| line.cost_usd).sum());
    let biologics_usd = cost(biologics.iter().map(|line| line.cost_usd).sum());
    let quality_control_usd = cost(
        post_processing
            .quality_control
            .iter()
            .map(|check| check.cost_usd)
            .sum(),
    );
    let subtotal_usd = cost(
        scaffold_usd
            + biologics_usd
            + post_processing.culture_medium_cost_usd
            + post_processing.antibiotics_cost_usd
            + post_processing.maturation_cost_usd
            + quality_control_usd
            + LABOR_USD
            + EQUIPMENT_USD,
    );
    let overhead_usd = cost(subtotal_usd * OVERHEAD_RATE);
    let costs = CostBreakdown {
        scaffold_usd,
        biologics_usd,
        culture_medium_usd: post_processing.culture_medium_cost_usd,
        antibiotics_usd: post_processing.antibiotics_cost_usd,
        maturation_usd: post_processing.maturation_cost_usd,
        quality_control_usd,
        labor_usd: LABOR_USD,
        equipment_usd: EQUIPMENT_USD,
        subtotal_usd,
        overhead_usd,
        total_usd: cost(subtotal_usd + overhead_usd),
    };

    debug!(
        organ = %template.organ_type,
        construct_volume_ml,
        scaffold_usd,
        biologics_usd,
        total_usd = costs.total_usd,
        "Computed bill of materials."
    );

    Ok(MaterialRequirements {
        construct_volume_ml,
        scaffold,
        biologics,
        post_processing,
        costs,
    })
}

fn post_processing(
    template: &OrganTemplate,
    volume: f64,
    config: &FormulationConfig,
) -> PostProcessing {
    let medium_changes = MEDIUM_CHANGES_PER_WEEK * MATURATION_WEEKS;
    let culture_medium_l = volume * MEDIUM_ML_PER_ML * f64::from(medium_changes) / 1000.0;
    let antibiotics_ml = volume * ANTIBIOTIC_ML_PER_ML;

    let mut stimulation = vec![Stimulation::Mechanical];
    if template.materials.electrical_stimulation {
        stimulation.push(Stimulation::Electrical);
    }
    if template.materials.flow_perfusion {
        stimulation.push(Stimulation::FlowPerfusion);
    }

    PostProcessing {
        maturation_weeks: MATURATION_WEEKS,
        medium_changes,
        culture_medium_l: round_to(culture_medium_l, config.quantity_decimals),
        culture_medium_cost_usd: round_to(
            culture_medium_l * MEDIUM_COST_USD_PER_L,
            config.cost_decimals,
        ),
        antibiotics_ml: round_to(antibiotics_ml, config.quantity_decimals),
        antibiotics_cost_usd: round_to(
            antibiotics_ml * ANTIBIOTIC_COST_USD_PER_ML,
            config.cost_decimals,
        ),
        stimulation,
        maturation_cost_usd: round_to(volume * MATURATION_COST_USD_PER_ML, config.cost_decimals),
        quality_control: QUALITY_CONTROL_USD
            .iter()
            .map(|&(assay, cost_usd)| QualityCheck {
                assay: assay.to_string(),
                cost_usd,
            })
            .collect(),
    }
}
