use super::{OutputFiles, load_registry, validate_stem, write_outputs};
use crate::cli::GenerateArgs;
use crate::config::builder::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use organforge::core::models::biometrics::PatientBiometrics;
use organforge::core::models::report::FormulationReport;
use organforge::core::models::scale::SizeAdjustment;
use organforge::engine::progress::ProgressReporter;
use organforge::workflows;
use organforge::workflows::generate::GenerationRequest;
use std::fmt::Write as _;
use tokio::task;
use tracing::info;

pub async fn run(args: GenerateArgs) -> Result<()> {
    if let Some(name) = &args.name {
        validate_stem(name)?;
    }
    let app = build_config(&args.config)?;
    let registry = load_registry(app.templates_path.as_deref())?;

    let request = GenerationRequest::new(
        args.organ.clone(),
        PatientBiometrics::new(args.height, args.weight, args.age),
    )
    .with_size_adjustment(args.size_adjustment);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Starting organ generation workflow...");
    let result = task::block_in_place(|| {
        workflows::generate::run(&request, &registry, &app.generation, &reporter)
    })?;

    let stem = args
        .name
        .unwrap_or_else(|| result.organ_type.as_str().to_string());
    let files = write_outputs(&result, &args.output, &stem, &app.export)?;
    info!("Generation outputs written to '{}'.", args.output.display());

    print!("{}", render_summary(&result.report, &files));
    Ok(())
}

fn render_summary(report: &FormulationReport, files: &OutputFiles) -> String {
    let scale = &report.scale_factor;
    let mut out = String::new();
    let _ = writeln!(out, "\n{} ({})", report.display_name, report.complexity_tier);
    let _ = writeln!(
        out,
        "  Patient:          {} cm, {} kg, {} y",
        report.patient.height_cm, report.patient.weight_kg, report.patient.age_years
    );
    if scale.is_clamped() {
        let _ = writeln!(
            out,
            "  Scale factor:     {:.4} (clamped from {:.4}, {} bound)",
            scale.value, scale.raw, scale.clamp
        );
    } else {
        let _ = writeln!(out, "  Scale factor:     {:.4}", scale.value);
    }
    if scale.adjustment != SizeAdjustment::None {
        let _ = writeln!(
            out,
            "  Size adjustment:  {} (x{} per dimension)",
            scale.adjustment,
            scale.adjustment.linear_factor()
        );
    }
    let _ = writeln!(
        out,
        "  Volume:           {:.2} ml ({} vertices, {} faces)",
        report.geometry.volume_ml, report.geometry.vertex_count, report.geometry.face_count
    );
    let _ = writeln!(out, "  Printed volume:   {:.2} ml", report.printed_volume_ml);
    let _ = writeln!(out, "  Cells required:   {:.3e}", report.cells_required);
    let _ = writeln!(out, "  Bioink cost:      ${:.2}", report.total_cost_usd);
    let _ = writeln!(
        out,
        "  Materials cost:   ${:.2} (incl. ${:.2} overhead)",
        report.materials.costs.total_usd, report.materials.costs.overhead_usd
    );
    let _ = writeln!(
        out,
        "  Print time:       {:.1} h",
        report.estimated_print_time_hours
    );
    let _ = writeln!(out, "  Mesh:             {}", files.mesh.display());
    let _ = writeln!(out, "  Report:           {}", files.report.display());
    let _ = writeln!(out, "  Components:       {}", files.components.display());
    let _ = writeln!(out, "  Materials:        {}", files.materials.display());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;
    use crate::error::CliError;
    use organforge::engine::error::EngineError;
    use tempfile::tempdir;

    fn args(organ: &str, output: &std::path::Path) -> GenerateArgs {
        GenerateArgs {
            organ: organ.to_string(),
            height: 175.0,
            weight: 70.0,
            age: 40.0,
            output: output.to_path_buf(),
            name: None,
            size_adjustment: SizeAdjustment::None,
            config: ConfigArgs {
                rings: Some(12),
                segments: Some(24),
                ..ConfigArgs::default()
            },
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn generate_writes_named_outputs() {
        let dir = tempdir().unwrap();
        let mut args = args("Heart", dir.path());
        args.name = Some("patient-7".to_string());
        args.config.set_values = vec!["export.report-format=json".to_string()];

        run(args).await.unwrap();

        assert!(dir.path().join("patient-7.stl").is_file());
        assert!(dir.path().join("patient-7.components.csv").is_file());
        assert!(dir.path().join("patient-7.materials.csv").is_file());
        let report = std::fs::read_to_string(dir.path().join("patient-7.report.json")).unwrap();
        assert!(report.contains("\"organ_type\": \"heart\""));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn generate_defaults_stem_to_organ_name() {
        let dir = tempdir().unwrap();
        run(args("LIVER", dir.path())).await.unwrap();
        assert!(dir.path().join("liver.stl").is_file());
        assert!(dir.path().join("liver.report.toml").is_file());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn size_adjustment_is_recorded_in_the_report() {
        let dir = tempdir().unwrap();
        let mut args = args("kidney", dir.path());
        args.size_adjustment = SizeAdjustment::Enlarged;
        args.config.set_values = vec!["export.report-format=json".to_string()];

        run(args).await.unwrap();

        let report = std::fs::read_to_string(dir.path().join("kidney.report.json")).unwrap();
        assert!(report.contains("\"adjustment\": \"enlarged\""));
    }

    #[test]
    fn summary_mentions_adjustment_and_materials() {
        let registry = organforge::core::templates::registry::TemplateRegistry::builtin().unwrap();
        let config = organforge::engine::config::GenerationConfigBuilder::new()
            .rings(8)
            .segments(16)
            .quantity_decimals(4)
            .cost_decimals(2)
            .build()
            .unwrap();
        let request = GenerationRequest::new("ear", PatientBiometrics::new(170.0, 65.0, 30.0))
            .with_size_adjustment(SizeAdjustment::Reduced);
        let result =
            workflows::generate::run(&request, &registry, &config, &ProgressReporter::new())
                .unwrap();
        let files = OutputFiles {
            mesh: "ear.stl".into(),
            report: "ear.report.toml".into(),
            components: "ear.components.csv".into(),
            materials: "ear.materials.csv".into(),
        };

        let summary = render_summary(&result.report, &files);
        assert!(summary.contains("Size adjustment:  reduced (x0.9 per dimension)"));
        assert!(summary.contains("Materials cost:"));
        assert!(summary.contains("ear.materials.csv"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_organ_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let err = run(args("lung", &out)).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(EngineError::UnknownOrganType { .. })
        ));
        assert!(!out.exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_biometrics_are_reported() {
        let dir = tempdir().unwrap();
        let mut args = args("kidney", dir.path());
        args.height = 251.0;
        let err = run(args).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(EngineError::InvalidBiometrics { .. })
        ));
        assert!(err.to_string().contains("height_cm"));
    }
}
