use super::template::{OrganTemplate, TemplateValidationError};
use crate::core::models::organ::{OrganType, ParseOrganTypeError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const BUILTIN_TEMPLATES: &str = include_str!("../../../data/templates.toml");
const BUILTIN_SOURCE: &str = "<builtin templates>";

#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("No template defined for organ type '{0}'")]
    MissingTemplate(OrganType),
    #[error("Organ type '{0}' is defined more than once")]
    DuplicateTemplate(OrganType),
    #[error("Invalid template for '{organ_type}': {source}")]
    InvalidTemplate {
        organ_type: OrganType,
        #[source]
        source: TemplateValidationError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateFile {
    template: Vec<OrganTemplate>,
}

/// The read-only table of organ templates, one per supported organ type.
///
/// A registry is complete by construction: every [`OrganType`] has exactly one validated
/// template, so [`TemplateRegistry::get`] never fails for a successfully built registry.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<OrganType, OrganTemplate>,
}

impl TemplateRegistry {
    /// Parses the template table compiled into the library.
    pub fn builtin() -> Result<Self, TemplateLoadError> {
        Self::from_toml_str(BUILTIN_TEMPLATES, BUILTIN_SOURCE)
    }

    pub fn load(path: &Path) -> Result<Self, TemplateLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| TemplateLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.to_string_lossy())
    }

    /// Parses a template table. `source` names the origin of `content` in error messages.
    pub fn from_toml_str(content: &str, source: &str) -> Result<Self, TemplateLoadError> {
        let file: TemplateFile = toml::from_str(content).map_err(|e| TemplateLoadError::Toml {
            path: source.to_string(),
            source: e,
        })?;
        let registry = Self::from_templates(file.template)?;
        debug!(
            source,
            templates = registry.templates.len(),
            "Loaded organ template table."
        );
        Ok(registry)
    }

    pub fn from_templates(templates: Vec<OrganTemplate>) -> Result<Self, TemplateLoadError> {
        let mut by_type = BTreeMap::new();
        for template in templates {
            template
                .validate()
                .map_err(|source| TemplateLoadError::InvalidTemplate {
                    organ_type: template.organ_type,
                    source,
                })?;
            let organ_type = template.organ_type;
            if by_type.insert(organ_type, template).is_some() {
                return Err(TemplateLoadError::DuplicateTemplate(organ_type));
            }
        }
        if let Some(missing) = OrganType::ALL
            .iter()
            .find(|organ_type| !by_type.contains_key(*organ_type))
        {
            return Err(TemplateLoadError::MissingTemplate(*missing));
        }
        Ok(Self { templates: by_type })
    }

    pub fn get(&self, organ_type: OrganType) -> Option<&OrganTemplate> {
        self.templates.get(&organ_type)
    }

    /// Resolves a user-supplied organ name to its template.
    pub fn lookup(&self, organ_name: &str) -> Result<&OrganTemplate, ParseOrganTypeError> {
        let organ_type: OrganType = organ_name.parse()?;
        self.get(organ_type)
            .ok_or_else(|| ParseOrganTypeError(organ_name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrganTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::templates::template::tests::sample_template;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn fixture_set() -> Vec<OrganTemplate> {
        OrganType::ALL
            .iter()
            .map(|&organ_type| OrganTemplate {
                organ_type,
                display_name: organ_type.as_str().to_uppercase(),
                ..sample_template()
            })
            .collect()
    }

    #[test]
    fn builtin_table_contains_every_organ() {
        let registry = TemplateRegistry::builtin().unwrap();
        assert_eq!(registry.len(), OrganType::ALL.len());
        for organ_type in OrganType::ALL {
            let template = registry.get(organ_type).unwrap();
            assert_eq!(template.organ_type, organ_type);
            assert!(!template.bioink.components.is_empty());
            assert!(!template.cell_types.is_empty());
        }
    }

    #[test]
    fn builtin_heart_recipe_has_expected_components() {
        let registry = TemplateRegistry::builtin().unwrap();
        let heart = registry.lookup("heart").unwrap();
        let names: Vec<_> = heart
            .bioink
            .components
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "gelatin",
                "alginate",
                "hyaluronic_acid",
                "collagen",
                "fibrinogen",
                "calcium_chloride",
                "thrombin",
                "pbs_medium",
            ]
        );
    }

    #[test]
    fn lookup_rejects_unknown_organ_names() {
        let registry = TemplateRegistry::builtin().unwrap();
        let err = registry.lookup("lung").unwrap_err();
        assert_eq!(err, ParseOrganTypeError("lung".to_string()));
    }

    #[test]
    fn lookup_accepts_mixed_case_names() {
        let registry = TemplateRegistry::builtin().unwrap();
        assert_eq!(
            registry.lookup(" Kidney").unwrap().organ_type,
            OrganType::Kidney
        );
    }

    #[test]
    fn from_templates_rejects_missing_organs() {
        let mut templates = fixture_set();
        templates.retain(|t| t.organ_type != OrganType::Liver);
        let err = TemplateRegistry::from_templates(templates).unwrap_err();
        assert!(matches!(
            err,
            TemplateLoadError::MissingTemplate(OrganType::Liver)
        ));
    }

    #[test]
    fn from_templates_rejects_duplicate_organs() {
        let mut templates = fixture_set();
        templates.push(templates[0].clone());
        let err = TemplateRegistry::from_templates(templates).unwrap_err();
        assert!(matches!(
            err,
            TemplateLoadError::DuplicateTemplate(OrganType::Heart)
        ));
    }

    #[test]
    fn from_templates_rejects_invalid_recipes() {
        let mut templates = fixture_set();
        templates[3].bioink.components[0].unit_cost_usd = -1.0;
        let err = TemplateRegistry::from_templates(templates).unwrap_err();
        match err {
            TemplateLoadError::InvalidTemplate { organ_type, source } => {
                assert_eq!(organ_type, OrganType::Ear);
                assert!(matches!(
                    source,
                    TemplateValidationError::NegativeCost { .. }
                ));
                assert!(source.to_string().contains("unit cost"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_round_trips_a_serialized_table() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("templates.toml");
        let builtin = TemplateRegistry::builtin().unwrap();

        let mut content = String::new();
        for template in builtin.iter() {
            #[derive(serde::Serialize)]
            struct Wrapper<'a> {
                template: [&'a OrganTemplate; 1],
            }
            content.push_str(&toml::to_string(&Wrapper { template: [template] }).unwrap());
            content.push('\n');
        }
        File::create(&file_path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();

        let loaded = TemplateRegistry::load(&file_path).unwrap();
        for organ_type in OrganType::ALL {
            assert_eq!(loaded.get(organ_type), builtin.get(organ_type));
        }
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("absent.toml");
        let err = TemplateRegistry::load(&file_path).unwrap_err();
        match err {
            TemplateLoadError::Io { path, .. } => assert!(path.ends_with("absent.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_reports_malformed_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("broken.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "[[template]]\norgan_type = \"heart\"\nunknown = 1").unwrap();

        let err = TemplateRegistry::load(&file_path).unwrap_err();
        assert!(matches!(err, TemplateLoadError::Toml { .. }));
    }
}
