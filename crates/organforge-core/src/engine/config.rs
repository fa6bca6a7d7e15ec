use thiserror::Error;

pub const DEFAULT_RINGS: u32 = 48;
pub const DEFAULT_SEGMENTS: u32 = 96;
pub const DEFAULT_QUANTITY_DECIMALS: u32 = 4;
pub const DEFAULT_COST_DECIMALS: u32 = 2;

pub const MIN_RINGS: u32 = 2;
pub const MIN_SEGMENTS: u32 = 3;
/// Upper resolution bounds. At the limit the grid has about 16.8 million faces, well
/// inside `u32` vertex indexing.
pub const MAX_RINGS: u32 = 2048;
pub const MAX_SEGMENTS: u32 = 4096;
const MAX_DECIMALS: u32 = 9;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Resolution of the latitude/longitude tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TessellationConfig {
    /// Number of latitude bands between the poles.
    pub rings: u32,
    /// Number of vertices around each latitude ring.
    pub segments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulationConfig {
    pub quantity_decimals: u32,
    pub cost_decimals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationConfig {
    pub tessellation: TessellationConfig,
    pub formulation: FormulationConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tessellation: TessellationConfig {
                rings: DEFAULT_RINGS,
                segments: DEFAULT_SEGMENTS,
            },
            formulation: FormulationConfig {
                quantity_decimals: DEFAULT_QUANTITY_DECIMALS,
                cost_decimals: DEFAULT_COST_DECIMALS,
            },
        }
    }
}

#[derive(Default)]
pub struct GenerationConfigBuilder {
    rings: Option<u32>,
    segments: Option<u32>,
    quantity_decimals: Option<u32>,
    cost_decimals: Option<u32>,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rings(mut self, rings: u32) -> Self {
        self.rings = Some(rings);
        self
    }
    pub fn segments(mut self, segments: u32) -> Self {
        self.segments = Some(segments);
        self
    }
    pub fn quantity_decimals(mut self, decimals: u32) -> Self {
        self.quantity_decimals = Some(decimals);
        self
    }
    pub fn cost_decimals(mut self, decimals: u32) -> Self {
        self.cost_decimals = Some(decimals);
        self
    }

    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        let tessellation = TessellationConfig {
            rings: within(
                "rings",
                self.rings.ok_or(ConfigError::MissingParameter("rings"))?,
                MIN_RINGS,
                MAX_RINGS,
            )?,
            segments: within(
                "segments",
                self.segments
                    .ok_or(ConfigError::MissingParameter("segments"))?,
                MIN_SEGMENTS,
                MAX_SEGMENTS,
            )?,
        };
        let formulation = FormulationConfig {
            quantity_decimals: at_most(
                "quantity_decimals",
                self.quantity_decimals
                    .ok_or(ConfigError::MissingParameter("quantity_decimals"))?,
                MAX_DECIMALS,
            )?,
            cost_decimals: at_most(
                "cost_decimals",
                self.cost_decimals
                    .ok_or(ConfigError::MissingParameter("cost_decimals"))?,
                MAX_DECIMALS,
            )?,
        };
        Ok(GenerationConfig {
            tessellation,
            formulation,
        })
    }
}

fn within(name: &'static str, value: u32, min: u32, max: u32) -> Result<u32, ConfigError> {
    if value < min {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be at least {min}, got {value}"),
        });
    }
    at_most(name, value, max)
}

fn at_most(name: &'static str, value: u32, max: u32) -> Result<u32, ConfigError> {
    if value > max {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be at most {max}, got {value}"),
        });
    }
    Ok(value)
}
