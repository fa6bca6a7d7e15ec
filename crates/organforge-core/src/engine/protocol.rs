use crate::core::models::formulation::{ComponentQuantity, Formulation};
use crate::core::models::report::PreparationStep;
use crate::core::templates::template::{ComponentRole, OrganTemplate};

const DISSOLUTION_TEMPERATURE_C: f64 = 37.0;
const DISSOLUTION_MINUTES: u32 = 30;
const SERVICE_WINDOW_MINUTES: u32 = 30;
const STERILE_FILTER_UM: f64 = 0.22;

struct ProtocolBuilder {
    steps: Vec<PreparationStep>,
}

impl ProtocolBuilder {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    fn instruction(&mut self, instruction: String) {
        self.push(instruction, None, None, None);
    }

    fn with_component(&mut self, instruction: String, component: &ComponentQuantity) {
        self.push(
            instruction,
            Some(component.name.clone()),
            Some(component.quantity),
            Some(component.unit.clone()),
        );
    }

    fn push(
        &mut self,
        instruction: String,
        component: Option<String>,
        amount: Option<f64>,
        unit: Option<String>,
    ) {
        self.steps.push(PreparationStep {
            step: self.steps.len() as u32 + 1,
            instruction,
            component,
            amount,
            unit,
        });
    }
}

fn display_name(component: &str) -> String {
    component.replace('_', " ")
}

/// Orders the bench steps that turn a formulation into a loaded print cartridge.
///
/// Polymers are dissolved in recipe order into the warmed solvent, cells are added to
/// the sterile-filtered solution, and crosslinkers come last, just before loading.
pub fn preparation_protocol(
    template: &OrganTemplate,
    formulation: &Formulation,
) -> Vec<PreparationStep> {
    let recipe = &template.bioink;
    let mut protocol = ProtocolBuilder::new();
    let by_role = |role: ComponentRole| {
        formulation
            .components
            .iter()
            .filter(move |component| component.role == role)
    };

    protocol.instruction(format!(
        "Pre-cool all solutions to {} °C",
        recipe.storage_temperature_c
    ));
    for solvent in by_role(ComponentRole::Solvent) {
        protocol.with_component(
            format!(
                "Prepare sterile {} in a biosafety cabinet",
                display_name(&solvent.name)
            ),
            solvent,
        );
    }
    for polymer in by_role(ComponentRole::Polymer) {
        protocol.with_component(
            format!(
                "Add {} and mix at {DISSOLUTION_TEMPERATURE_C} °C for {DISSOLUTION_MINUTES} minutes until fully dissolved",
                display_name(&polymer.name)
            ),
            polymer,
        );
    }
    protocol.instruction("Cool the solution to room temperature".to_string());
    protocol.instruction(format!(
        "Filter sterilize through a {STERILE_FILTER_UM} µm filter"
    ));

    let cells = &formulation.cells;
    if cells.cells_required > 0.0 {
        protocol.push(
            format!(
                "Resuspend cells ({}) at {:.3e} cells/ml in the polymer solution",
                cells.cell_types.join(", "),
                cells.adjusted_density_per_ml
            ),
            None,
            Some(cells.cells_required),
            Some("cells".to_string()),
        );
    }
    for crosslinker in by_role(ComponentRole::Crosslinker) {
        protocol.with_component(
            format!(
                "Add {} just before printing",
                display_name(&crosslinker.name)
            ),
            crosslinker,
        );
    }
    protocol.instruction("Load into the bioprinter cartridge".to_string());
    protocol.instruction(format!(
        "Begin printing within {SERVICE_WINDOW_MINUTES} minutes; discard unused bioink after {} hours at {} °C",
        recipe.shelf_life_hours, recipe.storage_temperature_c
    ));

    protocol.steps
}
