use super::{OutputFiles, load_registry, validate_stem, write_outputs};
use crate::cli::BatchArgs;
use crate::config::builder::build_config;
use crate::config::models::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use organforge::core::models::biometrics::PatientBiometrics;
use organforge::core::models::scale::SizeAdjustment;
use organforge::core::templates::registry::TemplateRegistry;
use organforge::engine::progress::{Progress, ProgressReporter};
use organforge::workflows;
use organforge::workflows::generate::GenerationRequest;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{info, warn};

const SUMMARY_FILE: &str = "batch_summary.csv";

/// One patient row of a batch input file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchRow {
    pub patient_id: String,
    pub organ_type: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age_years: f64,
    /// Free-text clinical notes; "enlarged" or "reduced" adjusts the printed size.
    #[serde(default)]
    pub special_requirements: Option<String>,
}

impl BatchRow {
    fn output_stem(&self) -> String {
        format!(
            "{}_{}",
            self.patient_id.trim(),
            self.organ_type.trim().to_ascii_lowercase()
        )
    }

    fn request(&self) -> GenerationRequest {
        let size_adjustment = self
            .special_requirements
            .as_deref()
            .map(SizeAdjustment::from_notes)
            .unwrap_or_default();
        GenerationRequest::new(
            self.organ_type.clone(),
            PatientBiometrics::new(self.height_cm, self.weight_kg, self.age_years),
        )
        .with_size_adjustment(size_adjustment)
    }
}

#[derive(Debug)]
struct RowSuccess {
    files: OutputFiles,
    scale_factor: f64,
    volume_ml: f64,
    total_cost_usd: f64,
    materials_cost_usd: f64,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    patient_id: &'a str,
    organ_type: &'a str,
    status: &'static str,
    scale_factor: Option<f64>,
    volume_ml: Option<f64>,
    total_cost_usd: Option<f64>,
    materials_cost_usd: Option<f64>,
    mesh: Option<String>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs) -> Result<()> {
    let app = build_config(&args.config)?;
    let registry = load_registry(app.templates_path.as_deref())?;
    let rows = read_rows(&args.input)?;
    info!("Loaded {} batch row(s) from '{}'.", rows.len(), args.input.display());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let outcomes = task::block_in_place(|| {
        process_rows(&rows, &registry, &app, &args.output, &reporter)
    });

    let summary_path = write_summary(&args.output, &rows, &outcomes)?;
    let failed = report_outcomes(&rows, &outcomes);
    println!("Batch summary written to '{}'.", summary_path.display());

    if failed > 0 {
        return Err(CliError::Other(anyhow::anyhow!(
            "{} of {} batch row(s) failed",
            failed,
            rows.len()
        )));
    }
    Ok(())
}

/// Reads and checks every row before any work starts, so a malformed file fails fast.
pub fn read_rows(path: &Path) -> Result<Vec<BatchRow>> {
    let parse_error = |source: anyhow::Error| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<BatchRow>, _>>()
        .map_err(|e| parse_error(e.into()))?;

    if rows.is_empty() {
        return Err(parse_error(anyhow::anyhow!("no patient rows found")));
    }

    let mut stems = HashSet::new();
    for row in &rows {
        validate_stem(&row.patient_id)?;
        let stem = row.output_stem();
        if !stems.insert(stem.clone()) {
            return Err(parse_error(anyhow::anyhow!(
                "duplicate patient/organ pair '{}'",
                stem
            )));
        }
    }
    Ok(rows)
}

/// Runs every row on the rayon pool. Outcomes keep the input order.
fn process_rows(
    rows: &[BatchRow],
    registry: &TemplateRegistry,
    app: &AppConfig,
    output_dir: &Path,
    reporter: &ProgressReporter,
) -> Vec<Result<RowSuccess>> {
    reporter.report(Progress::TaskStart {
        total_steps: rows.len() as u64,
    });
    let outcomes = rows
        .par_iter()
        .map(|row| {
            let outcome = process_row(row, registry, app, output_dir);
            if let Err(e) = &outcome {
                warn!(patient = %row.patient_id, organ = %row.organ_type, "Batch row failed: {}", e);
            }
            reporter.report(Progress::TaskIncrement);
            outcome
        })
        .collect();
    reporter.report(Progress::TaskFinish);
    outcomes
}

fn process_row(
    row: &BatchRow,
    registry: &TemplateRegistry,
    app: &AppConfig,
    output_dir: &Path,
) -> Result<RowSuccess> {
    let result = workflows::generate::run(
        &row.request(),
        registry,
        &app.generation,
        &ProgressReporter::new(),
    )?;
    let files = write_outputs(&result, output_dir, &row.output_stem(), &app.export)?;
    Ok(RowSuccess {
        files,
        scale_factor: result.scale.value,
        volume_ml: result.geometry.volume_ml,
        total_cost_usd: result.report.total_cost_usd,
        materials_cost_usd: result.materials.costs.total_usd,
    })
}

fn write_summary(
    output_dir: &Path,
    rows: &[BatchRow],
    outcomes: &[Result<RowSuccess>],
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(SUMMARY_FILE);
    let mut writer = csv::Writer::from_path(&path)?;
    for (row, outcome) in rows.iter().zip(outcomes) {
        let summary = match outcome {
            Ok(success) => SummaryRow {
                patient_id: &row.patient_id,
                organ_type: &row.organ_type,
                status: "ok",
                scale_factor: Some(success.scale_factor),
                volume_ml: Some(success.volume_ml),
                total_cost_usd: Some(success.total_cost_usd),
                materials_cost_usd: Some(success.materials_cost_usd),
                mesh: Some(success.files.mesh.display().to_string()),
                error: None,
            },
            Err(e) => SummaryRow {
                patient_id: &row.patient_id,
                organ_type: &row.organ_type,
                status: "failed",
                scale_factor: None,
                volume_ml: None,
                total_cost_usd: None,
                materials_cost_usd: None,
                mesh: None,
                error: Some(e.to_string()),
            },
        };
        writer.serialize(summary)?;
    }
    writer.flush()?;
    Ok(path)
}

fn report_outcomes(rows: &[BatchRow], outcomes: &[Result<RowSuccess>]) -> usize {
    let mut failed = 0;
    for (row, outcome) in rows.iter().zip(outcomes) {
        match outcome {
            Ok(success) => println!(
                "✅ {} {}: scale {:.4}, {:.2} ml, bioink ${:.2}, materials ${:.2}",
                row.patient_id,
                row.organ_type,
                success.scale_factor,
                success.volume_ml,
                success.total_cost_usd,
                success.materials_cost_usd
            ),
            Err(e) => {
                failed += 1;
                println!("❌ {} {}: {}", row.patient_id, row.organ_type, e);
            }
        }
    }
    failed
}
