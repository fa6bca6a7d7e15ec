//! # Core Module
//!
//! This module provides the fundamental building blocks of OrganForge: the data that
//! describes organs and patients, and the utilities that turn meshes into numbers and
//! exchange files.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Organ types, patient biometrics, and generated geometry
//! - **Organ Templates** ([`templates`]) - Per-organ reference data and the read-only registry
//! - **File I/O** ([`io`]) - STL mesh export and structured report serialization
//! - **Utilities** ([`utils`]) - Mesh measurement, topology validation, and numeric rounding
//!
//! ## Units
//!
//! Lengths are centimeters, volumes are milliliters (cubic centimeters), areas are square
//! centimeters, masses are grams, and costs are US dollars unless a writer is explicitly
//! asked to convert.

pub mod io;
pub mod models;
pub mod templates;
pub mod utils;
