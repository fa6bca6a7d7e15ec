use crate::core::models::biometrics::PatientBiometrics;
use crate::core::models::formulation::Formulation;
use crate::core::models::geometry::GeneratedGeometry;
use crate::core::models::materials::MaterialRequirements;
use crate::core::models::organ::OrganType;
use crate::core::models::report::FormulationReport;
use crate::core::models::scale::{ScaleFactor, SizeAdjustment};
use crate::core::templates::registry::TemplateRegistry;
use crate::engine::config::GenerationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::{formulation, materials, report, scaling, tessellation};
use tracing::{info, instrument, warn};

/// One patient and one target organ.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Organ name as supplied by the caller; parsed case-insensitively.
    pub organ: String,
    pub biometrics: PatientBiometrics,
    pub size_adjustment: SizeAdjustment,
}

impl GenerationRequest {
    pub fn new(organ: impl Into<String>, biometrics: PatientBiometrics) -> Self {
        Self {
            organ: organ.into(),
            biometrics,
            size_adjustment: SizeAdjustment::None,
        }
    }

    pub fn with_size_adjustment(mut self, size_adjustment: SizeAdjustment) -> Self {
        self.size_adjustment = size_adjustment;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub organ_type: OrganType,
    pub scale: ScaleFactor,
    pub geometry: GeneratedGeometry,
    pub formulation: Formulation,
    pub materials: MaterialRequirements,
    pub report: FormulationReport,
}

#[instrument(skip_all, name = "generation_workflow", fields(organ = %request.organ))]
pub fn run(
    request: &GenerationRequest,
    registry: &TemplateRegistry,
    config: &GenerationConfig,
    reporter: &ProgressReporter,
) -> Result<GenerationResult, EngineError> {
    let template = reporter.phase("Template Lookup", || {
        info!("Resolving organ template.");
        registry
            .lookup(&request.organ)
            .map_err(EngineError::from)
    })?;

    let biometrics = &request.biometrics;
    let scale = reporter.phase("Scaling", || {
        info!(
            height_cm = biometrics.height_cm,
            weight_kg = biometrics.weight_kg,
            age_years = biometrics.age_years,
            "Computing scale factor."
        );
        scaling::compute_scale(template, biometrics).map_err(EngineError::from)
    })?;
    if scale.is_clamped() {
        warn!(
            raw = scale.raw,
            value = scale.value,
            bound = %scale.clamp,
            "Scale factor clamped to the organ's supported range."
        );
        reporter.report(Progress::Message(format!(
            "Scale {:.3} clamped to {:.3} ({} bound)",
            scale.raw, scale.value, scale.clamp
        )));
    }
    let scale = match request.size_adjustment {
        SizeAdjustment::None => scale,
        adjustment => {
            info!(%adjustment, "Applying requested size adjustment.");
            scale.with_adjustment(adjustment)
        }
    };

    let geometry = reporter.phase("Tessellation", || {
        info!(
            rings = config.tessellation.rings,
            segments = config.tessellation.segments,
            "Tessellating organ surface."
        );
        tessellation::generate(template, &scale, &config.tessellation).map_err(EngineError::from)
    })?;

    let formulation = reporter.phase("Formulation", || {
        info!(volume_ml = geometry.volume_ml, "Formulating bioink.");
        formulation::formulate(template, &geometry, biometrics, &config.formulation)
            .map_err(EngineError::from)
    })?;

    let materials = reporter.phase("Materials", || {
        info!(
            construct_volume_ml = formulation.printed_volume_ml,
            "Computing bill of materials."
        );
        materials::bill_of_materials(template, formulation.printed_volume_ml, &config.formulation)
            .map_err(EngineError::from)
    })?;

    let report = reporter.phase("Report Assembly", || {
        Ok::<_, EngineError>(report::assemble(
            biometrics,
            &scale,
            &geometry,
            &formulation,
            &materials,
            template,
        ))
    })?;

    info!(
        volume_ml = geometry.volume_ml,
        total_cost_usd = report.total_cost_usd,
        materials_cost_usd = materials.costs.total_usd,
        print_time_hours = report.estimated_print_time_hours,
        "Generation complete."
    );

    Ok(GenerationResult {
        organ_type: template.organ_type,
        scale,
        geometry,
        formulation,
        materials,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::report::ReportFormat;
    use crate::core::io::stl::{StlFormat, StlOptions};
    use crate::core::utils::mesh;
    use crate::engine::config::GenerationConfigBuilder;
    use crate::engine::formulation::cost_tolerance;
    use std::sync::{Arc, Mutex};

    fn test_config() -> GenerationConfig {
        GenerationConfigBuilder::new()
            .rings(16)
            .segments(32)
            .quantity_decimals(4)
            .cost_decimals(2)
            .build()
            .unwrap()
    }

    #[test]
    fn heart_for_reference_sized_adult_produces_complete_report() {
        let registry = TemplateRegistry::builtin().unwrap();
        let request = GenerationRequest::new("heart", PatientBiometrics::new(175.0, 70.0, 40.0));
        let result = run(&request, &registry, &test_config(), &ProgressReporter::new()).unwrap();

        assert_eq!(result.organ_type, OrganType::Heart);
        assert!((result.scale.value - 1.0).abs() <= 0.05);
        assert!(result.geometry.volume_ml > 0.0);
        assert!(result.report.total_cost_usd > 0.0);

        let heart = registry.get(OrganType::Heart).unwrap();
        for component in &heart.bioink.components {
            assert!(
                result.report.component(&component.name).is_some(),
                "missing {}",
                component.name
            );
        }

        let tolerance = cost_tolerance(result.formulation.components.len(), &test_config().formulation);
        assert!(
            (result.report.total_cost_usd - result.formulation.exact_cost_usd()).abs()
                <= tolerance + 1e-9
        );
    }

    #[test]
    fn every_organ_generates_a_closed_solid() {
        let registry = TemplateRegistry::builtin().unwrap();
        for organ_type in OrganType::ALL {
            let request =
                GenerationRequest::new(organ_type.as_str(), PatientBiometrics::new(160.0, 60.0, 30.0));
            let result = run(&request, &registry, &test_config(), &ProgressReporter::new()).unwrap();

            let topology = mesh::inspect_topology(result.geometry.vertex_count(), &result.geometry.faces);
            assert!(topology.is_closed_manifold(), "{organ_type}");
            assert!(result.geometry.volume_ml > 0.0, "{organ_type}");
            assert_eq!(result.report.organ_type, organ_type);
        }
    }

    #[test]
    fn identical_requests_are_bit_identical_down_to_exported_bytes() {
        let registry = TemplateRegistry::builtin().unwrap();
        for organ_type in OrganType::ALL {
            let request =
                GenerationRequest::new(organ_type.as_str(), PatientBiometrics::new(182.5, 81.2, 57.0));
            let first = run(&request, &registry, &test_config(), &ProgressReporter::new()).unwrap();
            let second = run(&request, &registry, &test_config(), &ProgressReporter::new()).unwrap();
            assert_eq!(first, second);

            for format in [StlFormat::Ascii, StlFormat::Binary] {
                let mut a = Vec::new();
                let mut b = Vec::new();
                format.write_to(&first.geometry, &StlOptions::default(), &mut a).unwrap();
                format.write_to(&second.geometry, &StlOptions::default(), &mut b).unwrap();
                assert_eq!(a, b);
            }
            assert_eq!(
                ReportFormat::Json.render(&first.report).unwrap(),
                ReportFormat::Json.render(&second.report).unwrap()
            );
        }
    }

    #[test]
    fn unknown_organ_fails_before_scaling() {
        let registry = TemplateRegistry::builtin().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));

        let request = GenerationRequest::new("lung", PatientBiometrics::new(175.0, 70.0, 40.0));
        let err = run(&request, &registry, &test_config(), &reporter).unwrap_err();

        assert!(matches!(err, EngineError::UnknownOrganType { ref name } if name == "lung"));
        assert_eq!(
            *events.lock().unwrap(),
            vec![Progress::PhaseStart {
                name: "Template Lookup"
            }]
        );
    }

    #[test]
    fn invalid_biometrics_terminate_the_request() {
        let registry = TemplateRegistry::builtin().unwrap();
        let request = GenerationRequest::new("kidney", PatientBiometrics::new(251.0, 70.0, 40.0));
        let err = run(&request, &registry, &test_config(), &ProgressReporter::new()).unwrap_err();
        assert!(err.to_string().contains("height_cm = 251"));
    }

    #[test]
    fn phases_run_in_pipeline_order() {
        let registry = TemplateRegistry::builtin().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));

        let request = GenerationRequest::new("liver", PatientBiometrics::new(170.0, 68.0, 45.0));
        let result = run(&request, &registry, &test_config(), &reporter).unwrap();

        let phases: Vec<_> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Progress::PhaseStart { name } => Some(*name),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            [
                "Template Lookup",
                "Scaling",
                "Tessellation",
                "Formulation",
                "Materials",
                "Report Assembly"
            ]
        );
        assert_eq!(result.report.materials, result.materials);
        assert_eq!(
            result.materials.construct_volume_ml,
            result.formulation.printed_volume_ml
        );
    }

    #[test]
    fn size_adjustment_grows_and_shrinks_the_organ() {
        let registry = TemplateRegistry::builtin().unwrap();
        let biometrics = PatientBiometrics::new(175.0, 70.0, 35.0);
        let generate = |adjustment| {
            let request = GenerationRequest::new("kidney", biometrics).with_size_adjustment(adjustment);
            run(&request, &registry, &test_config(), &ProgressReporter::new()).unwrap()
        };

        let plain = generate(SizeAdjustment::None);
        let enlarged = generate(SizeAdjustment::Enlarged);
        let reduced = generate(SizeAdjustment::Reduced);

        let length_ratio =
            enlarged.geometry.dimensions_cm.length / plain.geometry.dimensions_cm.length;
        assert!((length_ratio - 1.1).abs() < 1e-9);
        assert!((enlarged.geometry.volume_ml / plain.geometry.volume_ml - 1.331).abs() < 1e-9);
        assert!((reduced.geometry.volume_ml / plain.geometry.volume_ml - 0.729).abs() < 1e-9);

        assert_eq!(enlarged.report.scale_factor.adjustment, SizeAdjustment::Enlarged);
        assert_eq!(enlarged.report.scale_factor.raw, plain.report.scale_factor.raw);
        assert!(enlarged.report.estimated_print_time_hours > plain.report.estimated_print_time_hours);
        assert!(
            reduced.report.materials.costs.total_usd < plain.report.materials.costs.total_usd
        );
    }

    #[test]
    fn clamped_scale_is_reported_as_a_message() {
        let registry = TemplateRegistry::builtin().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));

        let request = GenerationRequest::new("ear", PatientBiometrics::new(50.0, 1.0, 30.0));
        let result = run(&request, &registry, &test_config(), &reporter).unwrap();

        assert!(result.scale.is_clamped());
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, Progress::Message(m) if m.contains("clamped"))));
    }
}
