//! # OrganForge Core Library
//!
//! A library for deriving patient-specific organ geometry and the bioink formulation
//! required to print it, from a patient's height, weight, and age.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture so that every stage of the
//! pipeline stays a pure function of its inputs and can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`OrganType`, `PatientBiometrics`,
//!   `GeneratedGeometry`), the read-only organ template registry, mesh measurement
//!   utilities, and writers for the solid-model and report exchange formats.
//!
//! - **[`engine`]: The Logic Core.** The pipeline stages: biometric scaling, tessellation,
//!   bioink formulation, preparation protocol, and report assembly, together with their
//!   configuration, error taxonomy, and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Ties the registry and the stages together into a
//!   single linear organ-generation request.

pub mod core;
pub mod engine;
pub mod workflows;
