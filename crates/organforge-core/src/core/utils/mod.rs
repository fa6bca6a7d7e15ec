pub mod mesh;
pub mod rounding;
