use clap::{Args, Parser, Subcommand};
use organforge::core::io::report::ReportFormat;
use organforge::core::io::stl::{LengthUnit, StlFormat};
use organforge::core::models::scale::SizeAdjustment;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "OrganForge CLI - Derive patient-specific organ geometry and bioink formulations from height, weight, and age.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used by `batch`.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the mesh, formulation report, and component table for one patient.
    Generate(GenerateArgs),
    /// Generate outputs for every patient listed in a CSV file.
    Batch(BatchArgs),
    /// Inspect the organ templates available to the pipeline.
    Templates(TemplatesArgs),
}

/// Options shared by every command that runs the generation pipeline.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Load organ templates from a TOML file instead of the built-in set.
    #[arg(long, value_name = "PATH")]
    pub templates: Option<PathBuf>,

    /// Mesh output encoding (ascii or binary).
    #[arg(long, value_name = "FORMAT")]
    pub stl_format: Option<StlFormat>,

    /// Length unit of mesh coordinates (mm or cm).
    #[arg(long, value_name = "UNIT")]
    pub units: Option<LengthUnit>,

    /// Report encoding (toml or json).
    #[arg(long, value_name = "FORMAT")]
    pub report_format: Option<ReportFormat>,

    /// Number of latitude bands in the tessellated surface.
    #[arg(long, value_name = "INT")]
    pub rings: Option<u32>,

    /// Number of vertices around each latitude ring.
    #[arg(long, value_name = "INT")]
    pub segments: Option<u32>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S tessellation.rings=64
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Organ to generate (heart, kidney, liver, ear).
    #[arg(long, required = true, value_name = "ORGAN")]
    pub organ: String,

    /// Patient height in centimeters.
    #[arg(long, required = true, value_name = "CM")]
    pub height: f64,

    /// Patient weight in kilograms.
    #[arg(long, required = true, value_name = "KG")]
    pub weight: f64,

    /// Patient age in years.
    #[arg(long, required = true, value_name = "YEARS")]
    pub age: f64,

    /// Directory that receives the output files.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Base name of the output files. Defaults to the organ name.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Print the organ larger or smaller than its biometric size
    /// (none, enlarged = every dimension x1.1, reduced = x0.9).
    #[arg(long, value_name = "ADJUSTMENT", default_value_t = SizeAdjustment::None)]
    pub size_adjustment: SizeAdjustment,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// CSV file with columns patient_id,organ_type,height_cm,weight_kg,age_years and an
    /// optional special_requirements column ("enlarged" or "reduced" adjusts the size).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory that receives the output files.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `templates` subcommand.
#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Load organ templates from a TOML file instead of the built-in set.
    #[arg(long, value_name = "PATH")]
    pub templates: Option<PathBuf>,

    #[command(subcommand)]
    pub command: TemplatesCommands,
}

#[derive(Subcommand, Debug)]
pub enum TemplatesCommands {
    /// List every organ template with its reference patient and scale range.
    List,
    /// Show the full template of one organ.
    Show {
        /// Organ name (case-insensitive).
        #[arg(required = true)]
        organ: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_parses_flags_and_shared_options() {
        let cli = Cli::try_parse_from([
            "organforge",
            "-vv",
            "generate",
            "--organ",
            "heart",
            "--height",
            "175",
            "--weight",
            "70",
            "--age",
            "40",
            "-o",
            "out",
            "--stl-format",
            "ascii",
            "--units",
            "cm",
            "-S",
            "tessellation.rings=24",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate command");
        };
        assert_eq!(args.organ, "heart");
        assert_eq!(args.height, 175.0);
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.config.stl_format, Some(StlFormat::Ascii));
        assert_eq!(args.config.units, Some(LengthUnit::Centimeters));
        assert_eq!(args.config.set_values, ["tessellation.rings=24"]);
        assert_eq!(args.size_adjustment, SizeAdjustment::None);
    }

    #[test]
    fn generate_accepts_a_size_adjustment() {
        let base = [
            "organforge", "generate", "--organ", "ear", "--height", "160", "--weight", "55",
            "--age", "9", "-o", "out",
        ];
        let cli = Cli::try_parse_from(base.iter().copied().chain(["--size-adjustment", "Reduced"]))
            .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate command");
        };
        assert_eq!(args.size_adjustment, SizeAdjustment::Reduced);

        let result =
            Cli::try_parse_from(base.iter().copied().chain(["--size-adjustment", "huge"]));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_units_are_rejected_by_the_parser() {
        let result = Cli::try_parse_from([
            "organforge",
            "batch",
            "-i",
            "patients.csv",
            "-o",
            "out",
            "--units",
            "inch",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["organforge", "-q", "-v", "templates", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn templates_show_takes_an_organ() {
        let cli = Cli::try_parse_from(["organforge", "templates", "show", "Liver"]).unwrap();
        let Commands::Templates(args) = cli.command else {
            panic!("expected templates command");
        };
        assert!(matches!(args.command, TemplatesCommands::Show { organ } if organ == "Liver"));
    }
}
