//! # Workflows Module
//!
//! High-level entry points that run the whole organ-generation pipeline for one request.
//!
//! - **Generation Workflow** ([`generate`]) - Resolves the organ template, scales it to
//!   the patient, tessellates the surface, formulates the bioink, and assembles the
//!   report, reporting progress for each phase.
//!
//! Requests are independent. A single [`crate::core::templates::TemplateRegistry`] may be
//! shared by reference across any number of concurrent runs.

pub mod generate;
