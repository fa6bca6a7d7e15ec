use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, ExportSettings};
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use organforge::engine::config::GenerationConfigBuilder;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Merges built-in defaults, the config file, `--set` overrides and explicit flags,
/// in increasing order of precedence.
pub fn build_config(args: &ConfigArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        let mut file_config = FileConfig::from_file(config_path)?;
        file_config.templates = file_config
            .templates
            .map(|path| relative_to(config_path, path));
        file_config
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let tessellation = file_config.tessellation.take().unwrap_or_default();
    let formulation = file_config.formulation.take().unwrap_or_default();
    let export = file_config.export.take().unwrap_or_default();

    let generation = GenerationConfigBuilder::new()
        .rings(
            args.rings
                .or(tessellation.rings)
                .unwrap_or(defaults.rings),
        )
        .segments(
            args.segments
                .or(tessellation.segments)
                .unwrap_or(defaults.segments),
        )
        .quantity_decimals(
            formulation
                .quantity_decimals
                .unwrap_or(defaults.quantity_decimals),
        )
        .cost_decimals(formulation.cost_decimals.unwrap_or(defaults.cost_decimals))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let export = ExportSettings {
        stl_format: args
            .stl_format
            .or(export.stl_format)
            .unwrap_or(defaults.stl_format),
        units: args.units.or(export.units).unwrap_or(defaults.units),
        report_format: args
            .report_format
            .or(export.report_format)
            .unwrap_or(defaults.report_format),
    };

    Ok(AppConfig {
        templates_path: args.templates.clone().or(file_config.templates),
        generation,
        export,
    })
}

/// Template paths in a config file are resolved against the file's directory.
fn relative_to(config_path: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match config_path.parent() {
        Some(dir) => dir.join(path),
        None => path,
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "templates" => {
                config.templates = Some(PathBuf::from(value_str.trim()));
            }
            "tessellation.rings" => {
                config
                    .tessellation
                    .get_or_insert_with(Default::default)
                    .rings = Some(parse_value(key, value_str, "integer")?);
            }
            "tessellation.segments" => {
                config
                    .tessellation
                    .get_or_insert_with(Default::default)
                    .segments = Some(parse_value(key, value_str, "integer")?);
            }
            "formulation.quantity-decimals" => {
                config
                    .formulation
                    .get_or_insert_with(Default::default)
                    .quantity_decimals = Some(parse_value(key, value_str, "integer")?);
            }
            "formulation.cost-decimals" => {
                config
                    .formulation
                    .get_or_insert_with(Default::default)
                    .cost_decimals = Some(parse_value(key, value_str, "integer")?);
            }
            "export.stl-format" => {
                config
                    .export
                    .get_or_insert_with(Default::default)
                    .stl_format = Some(parse_value(key, value_str, "STL format")?);
            }
            "export.units" => {
                config.export.get_or_insert_with(Default::default).units =
                    Some(parse_value(key, value_str, "unit")?);
            }
            "export.report-format" => {
                config
                    .export
                    .get_or_insert_with(Default::default)
                    .report_format = Some(parse_value(key, value_str, "report format")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
