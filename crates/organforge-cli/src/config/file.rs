use crate::error::{CliError, Result};
use organforge::core::io::report::ReportFormat;
use organforge::core::io::stl::{LengthUnit, StlFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileTessellationConfig {
    pub rings: Option<u32>,
    pub segments: Option<u32>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileFormulationConfig {
    #[serde(rename = "quantity-decimals")]
    pub quantity_decimals: Option<u32>,
    #[serde(rename = "cost-decimals")]
    pub cost_decimals: Option<u32>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileExportConfig {
    #[serde(rename = "stl-format")]
    pub stl_format: Option<StlFormat>,
    pub units: Option<LengthUnit>,
    #[serde(rename = "report-format")]
    pub report_format: Option<ReportFormat>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub templates: Option<PathBuf>,
    pub tessellation: Option<FileTessellationConfig>,
    pub formulation: Option<FileFormulationConfig>,
    pub export: Option<FileExportConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration file: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
