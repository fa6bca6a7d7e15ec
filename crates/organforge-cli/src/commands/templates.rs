use super::load_registry;
use crate::cli::{TemplatesArgs, TemplatesCommands};
use crate::error::{CliError, Result};
use organforge::core::templates::registry::TemplateRegistry;
use organforge::engine::error::EngineError;
use std::fmt::Write as _;

pub fn run(args: TemplatesArgs) -> Result<()> {
    let registry = load_registry(args.templates.as_deref())?;
    let output = match args.command {
        TemplatesCommands::List => render_list(&registry),
        TemplatesCommands::Show { organ } => render_show(&registry, &organ)?,
    };
    print!("{}", output);
    Ok(())
}

fn render_list(registry: &TemplateRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:<20} {:<7} {:>18} {:>12} {:>10}",
        "ORGAN", "NAME", "TIER", "REFERENCE", "SCALE", "COMPONENTS"
    );
    for template in registry.iter() {
        let reference = format!(
            "{}cm/{}kg/{}y",
            template.reference.height_cm, template.reference.weight_kg, template.reference.age_years
        );
        let range = format!(
            "{}-{}",
            template.scaling.min_scale, template.scaling.max_scale
        );
        let _ = writeln!(
            out,
            "{:<8} {:<20} {:<7} {:>18} {:>12} {:>10}",
            template.organ_type.as_str(),
            template.display_name,
            template.complexity_tier.to_string(),
            reference,
            range,
            template.bioink.components.len()
        );
    }
    out
}

fn render_show(registry: &TemplateRegistry, organ: &str) -> Result<String> {
    let template = registry.lookup(organ).map_err(EngineError::from)?;
    toml::to_string_pretty(template).map_err(|e| CliError::Other(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use organforge::core::models::organ::OrganType;
    use organforge::core::templates::template::OrganTemplate;

    #[test]
    fn list_has_one_line_per_template() {
        let registry = TemplateRegistry::builtin().unwrap();
        let listing = render_list(&registry);
        assert_eq!(listing.lines().count(), 1 + registry.len());
        for organ in OrganType::ALL {
            assert!(listing.lines().any(|l| l.starts_with(organ.as_str())));
        }
    }

    #[test]
    fn show_renders_a_loadable_template() {
        let registry = TemplateRegistry::builtin().unwrap();
        let text = render_show(&registry, "Kidney").unwrap();
        let parsed: OrganTemplate = toml::from_str(&text).unwrap();
        assert_eq!(&parsed, registry.get(OrganType::Kidney).unwrap());
    }

    #[test]
    fn show_rejects_unknown_organs() {
        let registry = TemplateRegistry::builtin().unwrap();
        let err = render_show(&registry, "lung").unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(EngineError::UnknownOrganType { .. })
        ));
    }
}
