use super::protocol::preparation_protocol;
use crate::core::models::biometrics::PatientBiometrics;
use crate::core::models::formulation::Formulation;
use crate::core::models::geometry::GeneratedGeometry;
use crate::core::models::materials::MaterialRequirements;
use crate::core::models::report::{FormulationReport, StorageConditions};
use crate::core::models::scale::ScaleFactor;
use crate::core::templates::template::OrganTemplate;

/// Print time grows linearly with the volumetric scale.
#[inline]
pub fn estimated_print_time_hours(template: &OrganTemplate, scale: &ScaleFactor) -> f64 {
    template.baseline_print_time_hours * scale.value
}

/// Aggregates the outputs of every pipeline stage into a single report.
pub fn assemble(
    biometrics: &PatientBiometrics,
    scale: &ScaleFactor,
    geometry: &GeneratedGeometry,
    formulation: &Formulation,
    materials: &MaterialRequirements,
    template: &OrganTemplate,
) -> FormulationReport {
    FormulationReport {
        organ_type: template.organ_type,
        display_name: template.display_name.clone(),
        complexity_tier: template.complexity_tier,
        total_cost_usd: formulation.total_cost_usd,
        estimated_print_time_hours: estimated_print_time_hours(template, scale),
        printed_volume_ml: formulation.printed_volume_ml,
        printing_viscosity_mpa_s: template.bioink.printing_viscosity_mpa_s,
        cells_required: formulation.cells.cells_required,
        adjusted_cell_density_per_ml: formulation.cells.adjusted_density_per_ml,
        cell_types: formulation.cells.cell_types.clone(),
        patient: *biometrics,
        scale_factor: *scale,
        geometry: geometry.summary(),
        storage: StorageConditions {
            temperature_c: template.bioink.storage_temperature_c,
            shelf_life_hours: template.bioink.shelf_life_hours,
        },
        components: formulation.components.clone(),
        preparation_protocol: preparation_protocol(template, formulation),
        materials: materials.clone(),
    }
}
