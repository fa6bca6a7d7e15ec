//! # Core Models Module
//!
//! This module contains the plain data structures that flow through the organ-generation
//! pipeline.
//!
//! ## Key Components
//!
//! - [`organ`] - The closed set of supported organ types and their name lookup
//! - [`biometrics`] - Patient height, weight, and age with enforced bounds
//! - [`geometry`] - The tessellated, measured solid produced for a single request
//! - [`scale`] - The volumetric scale factor derived from a patient's biometrics
//! - [`formulation`] - Per-component bioink quantities, costs, and cell requirements
//! - [`materials`] - Scaffold, biologic, and post-processing bill of materials
//! - [`report`] - The aggregated, serializable result of one generation request
//!
//! All models are cheap to clone and carry no interior mutability, so they can be moved
//! freely between threads that each run an independent request.

pub mod biometrics;
pub mod formulation;
pub mod geometry;
pub mod materials;
pub mod organ;
pub mod report;
pub mod scale;
