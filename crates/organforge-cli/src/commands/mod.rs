pub mod batch;
pub mod generate;
pub mod templates;

use crate::config::models::ExportSettings;
use crate::error::{CliError, Result};
use organforge::core::io::report::{write_components_csv_to_path, write_materials_csv_to_path};
use organforge::core::io::stl::StlOptions;
use organforge::core::templates::registry::TemplateRegistry;
use organforge::engine::error::EngineError;
use organforge::workflows::generate::GenerationResult;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files written for one generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub mesh: PathBuf,
    pub report: PathBuf,
    pub components: PathBuf,
    pub materials: PathBuf,
}

impl OutputFiles {
    pub fn new(dir: &Path, stem: &str, export: &ExportSettings) -> Self {
        Self {
            mesh: dir.join(format!("{stem}.stl")),
            report: dir.join(format!(
                "{stem}.report.{}",
                export.report_format.extension()
            )),
            components: dir.join(format!("{stem}.components.csv")),
            materials: dir.join(format!("{stem}.materials.csv")),
        }
    }
}

/// Loads the template registry from `path`, or the built-in set when no path is given.
pub fn load_registry(path: Option<&Path>) -> Result<TemplateRegistry> {
    let registry = match path {
        Some(path) => {
            info!("Loading organ templates from '{}'.", path.display());
            TemplateRegistry::load(path)
        }
        None => {
            debug!("Using built-in organ templates.");
            TemplateRegistry::builtin()
        }
    }
    .map_err(EngineError::from)?;
    Ok(registry)
}

/// Output stems become file names, so they must be plain names.
pub fn validate_stem(stem: &str) -> Result<()> {
    let invalid = stem.trim().is_empty()
        || stem.contains(['/', '\\'])
        || stem == "."
        || stem == "..";
    if invalid {
        return Err(CliError::Argument(format!(
            "'{}' cannot be used as an output file name",
            stem
        )));
    }
    Ok(())
}

/// Writes the mesh, report, component table, and bill of materials of `result` into `dir`.
pub fn write_outputs(
    result: &GenerationResult,
    dir: &Path,
    stem: &str,
    export: &ExportSettings,
) -> Result<OutputFiles> {
    std::fs::create_dir_all(dir)?;
    let files = OutputFiles::new(dir, stem, export);

    let stl_options = StlOptions {
        units: export.units,
        solid_name: stem.to_string(),
    };
    export
        .stl_format
        .write_to_path(&result.geometry, &stl_options, &files.mesh)
        .map_err(|e| export_error(&files.mesh, e))?;
    export
        .report_format
        .write_to_path(&result.report, &files.report)
        .map_err(|e| export_error(&files.report, e))?;
    write_components_csv_to_path(&result.report, &files.components)
        .map_err(|e| export_error(&files.components, e))?;
    write_materials_csv_to_path(&result.report, &files.materials)
        .map_err(|e| export_error(&files.materials, e))?;

    debug!(
        mesh = %files.mesh.display(),
        report = %files.report.display(),
        components = %files.components.display(),
        materials = %files.materials.display(),
        "Wrote generation outputs."
    );
    Ok(files)
}

fn export_error(path: &Path, source: impl Into<anyhow::Error>) -> CliError {
    CliError::Export {
        path: path.to_path_buf(),
        source: source.into(),
    }
}
