use super::config::FormulationConfig;
use crate::core::models::biometrics::PatientBiometrics;
use crate::core::models::formulation::{CellRequirement, ComponentQuantity, Formulation};
use crate::core::models::geometry::GeneratedGeometry;
use crate::core::templates::template::OrganTemplate;
use crate::core::utils::rounding::{half_unit, round_to};
use thiserror::Error;
use tracing::debug;

const DENSITY_ADJUSTMENT_OFFSET: f64 = 0.8;
const DENSITY_ADJUSTMENT_SLOPE: f64 = 0.4;
const DENSITY_ADJUSTMENT_RANGE: (f64, f64) = (0.5, 1.5);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulationError {
    #[error("Cannot formulate bioink for a non-positive volume ({volume_ml} ml)")]
    NonPositiveVolume { volume_ml: f64 },
}

/// Computes the bioink components needed to print a geometry.
///
/// Each component amount is `volume × ratio × overhead_factor`, rounded to
/// `quantity_decimals`. Line costs are computed from the rounded amounts and rounded to
/// `cost_decimals`; the total is the sum of line costs. The cell requirement scales the
/// recipe's cell density by the patient's weight relative to the template's reference
/// patient.
///
/// # Errors
///
/// Returns [`FormulationError::NonPositiveVolume`] when the geometry's volume is zero,
/// negative, or not finite.
pub fn formulate(
    template: &OrganTemplate,
    geometry: &GeneratedGeometry,
    biometrics: &PatientBiometrics,
    config: &FormulationConfig,
) -> Result<Formulation, FormulationError> {
    let volume_ml = geometry.volume_ml;
    if !volume_ml.is_finite() || volume_ml <= 0.0 {
        return Err(FormulationError::NonPositiveVolume { volume_ml });
    }

    let recipe = &template.bioink;
    let printed_volume_ml = volume_ml * recipe.overhead_factor;

    let components: Vec<ComponentQuantity> = recipe
        .component_ratios()
        .into_iter()
        .map(|(component, ratio)| {
            let quantity = round_to(
                volume_ml * ratio * recipe.overhead_factor,
                config.quantity_decimals,
            );
            ComponentQuantity {
                name: component.name.clone(),
                role: component.role,
                quantity,
                unit: component.unit().to_string(),
                unit_cost_usd: component.unit_cost_usd,
                cost_usd: round_to(quantity * component.unit_cost_usd, config.cost_decimals),
            }
        })
        .collect();
    let total_cost_usd = components.iter().map(|c| c.cost_usd).sum();

    let cells = cell_requirement(template, biometrics, printed_volume_ml);

    debug!(
        organ = %template.organ_type,
        volume_ml,
        printed_volume_ml,
        total_cost_usd,
        cells_required = cells.cells_required,
        "Formulated bioink."
    );

    Ok(Formulation {
        organ_volume_ml: volume_ml,
        overhead_factor: recipe.overhead_factor,
        printed_volume_ml,
        components,
        total_cost_usd,
        cells,
    })
}

/// Largest permitted gap between a formulation's total and the exact sum of
/// `quantity × unit_cost` over `component_count` lines.
pub fn cost_tolerance(component_count: usize, config: &FormulationConfig) -> f64 {
    component_count as f64 * half_unit(config.cost_decimals)
}

/// Heavier patients receive a denser cell suspension, within fixed bounds.
///
/// The curve is `0.8 + 0.4·log2(w / w_ref)`, so a patient at the reference weight is
/// seeded at 80% of the recipe density and the full density is reached at roughly
/// 1.4× the reference weight.
pub fn cell_density_adjustment(weight_kg: f64, reference_weight_kg: f64) -> f64 {
    let (min, max) = DENSITY_ADJUSTMENT_RANGE;
    let log_ratio = (weight_kg / reference_weight_kg).log2();
    (DENSITY_ADJUSTMENT_OFFSET + DENSITY_ADJUSTMENT_SLOPE * log_ratio).clamp(min, max)
}

fn cell_requirement(
    template: &OrganTemplate,
    biometrics: &PatientBiometrics,
    printed_volume_ml: f64,
) -> CellRequirement {
    let base_density_per_ml = template.bioink.cell_density_per_ml;
    let density_adjustment =
        cell_density_adjustment(biometrics.weight_kg, template.reference.weight_kg);
    let adjusted_density_per_ml = base_density_per_ml * density_adjustment;
    CellRequirement {
        cell_types: template.cell_types.iter().cloned().collect(),
        base_density_per_ml,
        density_adjustment,
        adjusted_density_per_ml,
        cells_required: adjusted_density_per_ml * printed_volume_ml,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::geometry::Dimensions;
    use crate::core::templates::template::tests::sample_template;
    use crate::engine::config::GenerationConfig;
    use proptest::prelude::*;

    fn geometry_with_volume(volume_ml: f64) -> GeneratedGeometry {
        GeneratedGeometry {
            vertices: Vec::new(),
            faces: Vec::new(),
            volume_ml,
            surface_area_cm2: 0.0,
            dimensions_cm: Dimensions {
                length: 1.0,
                width: 1.0,
                height: 1.0,
            },
        }
    }

    fn default_config() -> FormulationConfig {
        GenerationConfig::default().formulation
    }

    fn reference_patient() -> PatientBiometrics {
        sample_template().reference
    }

    #[test]
    fn quantities_follow_volume_ratio_and_overhead() {
        let template = sample_template();
        let formulation = formulate(
            &template,
            &geometry_with_volume(100.0),
            &reference_patient(),
            &default_config(),
        )
        .unwrap();

        assert_eq!(formulation.printed_volume_ml, 125.0);
        let gelatin = formulation.component("gelatin").unwrap();
        assert_eq!(gelatin.quantity, 6.25);
        assert_eq!(gelatin.unit, "g");
        assert_eq!(gelatin.cost_usd, 0.16);

        let pbs = formulation.component("pbs_medium").unwrap();
        assert_eq!(pbs.unit, "ml");
        assert_eq!(pbs.quantity, 119.9375);
        assert_eq!(pbs.cost_usd, 0.96);
    }

    #[test]
    fn components_keep_recipe_order() {
        let template = sample_template();
        let formulation = formulate(
            &template,
            &geometry_with_volume(10.0),
            &reference_patient(),
            &default_config(),
        )
        .unwrap();
        let names: Vec<_> = formulation.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["gelatin", "calcium_chloride", "pbs_medium"]);
    }

    #[test]
    fn total_cost_is_sum_of_rounded_line_costs() {
        let template = sample_template();
        let formulation = formulate(
            &template,
            &geometry_with_volume(37.123),
            &reference_patient(),
            &default_config(),
        )
        .unwrap();
        let line_sum: f64 = formulation.components.iter().map(|c| c.cost_usd).sum();
        assert_eq!(formulation.total_cost_usd, line_sum);
    }

    #[test]
    fn non_positive_volume_is_rejected() {
        let template = sample_template();
        for volume in [0.0, -1.0, f64::NAN] {
            let err = formulate(
                &template,
                &geometry_with_volume(volume),
                &reference_patient(),
                &default_config(),
            )
            .unwrap_err();
            assert!(matches!(err, FormulationError::NonPositiveVolume { .. }));
        }
    }

    #[test]
    fn cell_density_adjustment_is_bounded() {
        assert!((cell_density_adjustment(70.0, 70.0) - 0.8).abs() < 1e-12);
        assert!((cell_density_adjustment(140.0, 70.0) - 1.2).abs() < 1e-12);
        assert_eq!(cell_density_adjustment(35.0, 70.0), 0.5);
        assert_eq!(cell_density_adjustment(1.0, 70.0), 0.5);
        assert_eq!(cell_density_adjustment(300.0, 70.0), 1.5);
    }

    #[test]
    fn reference_weight_is_seeded_below_recipe_density() {
        let adjustment = cell_density_adjustment(70.0, 70.0);
        assert!(adjustment < 1.0);
        let half_step = cell_density_adjustment(70.0 * 2f64.sqrt(), 70.0);
        assert!((half_step - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cells_required_cover_printed_volume() {
        let template = sample_template();
        let formulation = formulate(
            &template,
            &geometry_with_volume(8.0),
            &reference_patient(),
            &default_config(),
        )
        .unwrap();
        assert!((formulation.cells.density_adjustment - 0.8).abs() < 1e-12);
        assert!((formulation.cells.adjusted_density_per_ml - 20.0e6).abs() < 1e-3);
        assert!((formulation.cells.cells_required - 2.0e8).abs() < 1e-3);
        assert_eq!(formulation.cells.cell_types, ["podocytes"]);
    }

    proptest! {
        /// Rounding never moves the total further than half a cent per line from the exact
        /// cost of the rounded quantities.
        #[test]
        fn total_cost_stays_within_rounding_tolerance(
            volume in 0.01f64..5000.0,
            cost_decimals in 0u32..=4,
        ) {
            let template = sample_template();
            let config = FormulationConfig { quantity_decimals: 4, cost_decimals };
            let formulation = formulate(
                &template,
                &geometry_with_volume(volume),
                &reference_patient(),
                &config,
            )
            .unwrap();

            let gap = (formulation.total_cost_usd - formulation.exact_cost_usd()).abs();
            let tolerance = cost_tolerance(formulation.components.len(), &config);
            prop_assert!(gap <= tolerance + 1e-9, "gap {} > {}", gap, tolerance);
        }
    }
}
