use organforge::core::io::report::ReportFormat;
use organforge::core::io::stl::{LengthUnit, StlFormat};
use organforge::engine::config::{
    DEFAULT_COST_DECIMALS, DEFAULT_QUANTITY_DECIMALS, DEFAULT_RINGS, DEFAULT_SEGMENTS,
};

pub struct DefaultsConfig {
    pub rings: u32,
    pub segments: u32,
    pub quantity_decimals: u32,
    pub cost_decimals: u32,
    pub stl_format: StlFormat,
    pub units: LengthUnit,
    pub report_format: ReportFormat,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            rings: DEFAULT_RINGS,
            segments: DEFAULT_SEGMENTS,
            quantity_decimals: DEFAULT_QUANTITY_DECIMALS,
            cost_decimals: DEFAULT_COST_DECIMALS,
            stl_format: StlFormat::Binary,
            units: LengthUnit::Millimeters,
            report_format: ReportFormat::Toml,
        }
    }
}
