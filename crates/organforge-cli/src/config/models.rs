use organforge::core::io::report::ReportFormat;
use organforge::core::io::stl::{LengthUnit, StlFormat};
use organforge::engine::config::GenerationConfig;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSettings {
    pub stl_format: StlFormat,
    pub units: LengthUnit,
    pub report_format: ReportFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `None` selects the built-in template set.
    pub templates_path: Option<PathBuf>,
    pub generation: GenerationConfig,
    pub export: ExportSettings,
}
