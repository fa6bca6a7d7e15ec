//! # Engine Module
//!
//! This module implements the stages of the organ-generation pipeline. Each stage is a
//! pure function of its inputs: templates come in by shared reference, results go out by
//! value, and no stage keeps state between calls.
//!
//! ## Architecture
//!
//! - **Scaling** ([`scaling`]) - Derives a volumetric scale factor from patient biometrics
//! - **Tessellation** ([`tessellation`]) - Builds and validates the closed organ mesh
//! - **Formulation** ([`formulation`]) - Computes bioink component quantities and costs
//! - **Protocol** ([`protocol`]) - Orders the bioink preparation steps
//! - **Materials** ([`materials`]) - Scaffold, biologic, and post-processing bill of materials
//! - **Report Assembly** ([`report`]) - Aggregates every stage into a single report
//! - **Configuration** ([`config`]) - Tessellation resolution and rounding precision
//! - **Progress Monitoring** ([`progress`]) - Optional callbacks for front ends
//! - **Error Handling** ([`error`]) - The request-terminal error taxonomy
//!
//! Stages never perform I/O and never print; diagnostics go through `tracing`.

pub mod config;
pub mod error;
pub mod formulation;
pub mod materials;
pub mod progress;
pub mod protocol;
pub mod report;
pub mod scaling;
pub mod tessellation;
