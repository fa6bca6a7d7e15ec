use thiserror::Error;

use super::config::ConfigError;
use super::formulation::FormulationError;
use super::materials::MaterialsError;
use super::tessellation::GeometryError;
use crate::core::models::biometrics::BiometricsError;
use crate::core::models::organ::ParseOrganTypeError;
use crate::core::templates::registry::TemplateLoadError;

/// Failures that terminate a generation request.
///
/// Apart from the scale clamp recorded in the report, the engine never degrades a result:
/// every error here aborts the whole request.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown organ type '{name}' (expected one of: heart, liver, kidney, ear)")]
    UnknownOrganType { name: String },

    #[error("Invalid patient biometrics: {source}")]
    InvalidBiometrics {
        #[from]
        source: BiometricsError,
    },

    #[error("Geometry generation failed: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Bioink formulation failed: {source}")]
    Formulation {
        #[from]
        source: FormulationError,
    },

    #[error("Material calculation failed: {source}")]
    Materials {
        #[from]
        source: MaterialsError,
    },

    #[error("Template registry error: {source}")]
    Template {
        #[from]
        source: TemplateLoadError,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl From<ParseOrganTypeError> for EngineError {
    fn from(err: ParseOrganTypeError) -> Self {
        EngineError::UnknownOrganType { name: err.0 }
    }
}
