use crate::core::models::report::FormulationReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportWriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Toml,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Toml => "toml",
            ReportFormat::Json => "json",
        }
    }

    pub fn render(&self, report: &FormulationReport) -> Result<String, ReportWriteError> {
        Ok(match self {
            ReportFormat::Toml => toml::to_string_pretty(report)?,
            ReportFormat::Json => {
                let mut text = serde_json::to_string_pretty(report)?;
                text.push('\n');
                text
            }
        })
    }

    pub fn write_to(
        &self,
        report: &FormulationReport,
        writer: &mut impl Write,
    ) -> Result<(), ReportWriteError> {
        writer.write_all(self.render(report)?.as_bytes())?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(
        &self,
        report: &FormulationReport,
        path: P,
    ) -> Result<(), ReportWriteError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(report, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported report format '{0}' (expected 'toml' or 'json')")]
pub struct ParseReportFormatError(pub String);

impl FromStr for ReportFormat {
    type Err = ParseReportFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toml" => Ok(ReportFormat::Toml),
            "json" => Ok(ReportFormat::Json),
            _ => Err(ParseReportFormatError(s.to_string())),
        }
    }
}

#[derive(Serialize)]
struct ComponentRow<'a> {
    component: &'a str,
    role: String,
    quantity: f64,
    unit: &'a str,
    unit_cost_usd: f64,
    cost_usd: f64,
}

/// Writes the report's component table as CSV, one row per component in recipe order.
pub fn write_components_csv(
    report: &FormulationReport,
    writer: impl Write,
) -> Result<(), ReportWriteError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for component in &report.components {
        csv_writer.serialize(ComponentRow {
            component: &component.name,
            role: component.role.to_string(),
            quantity: component.quantity,
            unit: &component.unit,
            unit_cost_usd: component.unit_cost_usd,
            cost_usd: component.cost_usd,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_components_csv_to_path<P: AsRef<Path>>(
    report: &FormulationReport,
    path: P,
) -> Result<(), ReportWriteError> {
    write_components_csv(report, File::create(path)?)
}

#[derive(Serialize)]
struct MaterialRow<'a> {
    category: &'a str,
    item: &'a str,
    amount: Option<f64>,
    unit: Option<&'a str>,
    cost_usd: f64,
}

impl<'a> MaterialRow<'a> {
    fn flat(category: &'a str, item: &'a str, cost_usd: f64) -> Self {
        Self {
            category,
            item,
            amount: None,
            unit: None,
            cost_usd,
        }
    }
}

/// Writes the bill of materials as CSV: scaffold and biologic lines, post-processing
/// consumables and services, then the fixed costs, overhead, and total.
pub fn write_materials_csv(
    report: &FormulationReport,
    writer: impl Write,
) -> Result<(), ReportWriteError> {
    let materials = &report.materials;
    let post = &materials.post_processing;
    let costs = &materials.costs;
    let mut csv_writer = csv::Writer::from_writer(writer);

    for line in &materials.scaffold {
        csv_writer.serialize(MaterialRow {
            category: "scaffold",
            item: &line.name,
            amount: Some(line.amount),
            unit: Some(&line.unit),
            cost_usd: line.cost_usd,
        })?;
    }
    for line in &materials.biologics {
        let kind = line.kind.to_string();
        csv_writer.serialize(MaterialRow {
            category: &kind,
            item: &line.name,
            amount: Some(line.amount),
            unit: Some(&line.unit),
            cost_usd: line.cost_usd,
        })?;
    }
    csv_writer.serialize(MaterialRow {
        category: "culture_medium",
        item: "culture_medium",
        amount: Some(post.culture_medium_l),
        unit: Some("L"),
        cost_usd: post.culture_medium_cost_usd,
    })?;
    csv_writer.serialize(MaterialRow {
        category: "antibiotics",
        item: "penicillin_streptomycin",
        amount: Some(post.antibiotics_ml),
        unit: Some("ml"),
        cost_usd: post.antibiotics_cost_usd,
    })?;
    csv_writer.serialize(MaterialRow {
        category: "maturation",
        item: "bioreactor_maturation",
        amount: Some(f64::from(post.maturation_weeks)),
        unit: Some("weeks"),
        cost_usd: post.maturation_cost_usd,
    })?;
    for check in &post.quality_control {
        csv_writer.serialize(MaterialRow::flat("quality_control", &check.assay, check.cost_usd))?;
    }
    for (item, cost_usd) in [
        ("labor", costs.labor_usd),
        ("equipment", costs.equipment_usd),
        ("overhead", costs.overhead_usd),
        ("total", costs.total_usd),
    ] {
        csv_writer.serialize(MaterialRow::flat("summary", item, cost_usd))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_materials_csv_to_path<P: AsRef<Path>>(
    report: &FormulationReport,
    path: P,
) -> Result<(), ReportWriteError> {
    write_materials_csv(report, File::create(path)?)
}
