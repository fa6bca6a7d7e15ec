//! # Organ Template Module
//!
//! Static, per-organ reference data and the registry that serves it.
//!
//! ## Overview
//!
//! Every organ-specific number in OrganForge lives here as data rather than as code: the
//! reference patient a geometry was authored for, its baseline dimensions and parametric
//! shape, the scaling curve, the cell types, print-time baseline, the bioink recipe, and
//! the scaffold and biologic inputs of the bill of materials.
//! The pipeline stages are single generic functions parameterized by an [`OrganTemplate`].
//!
//! ## Key Components
//!
//! - [`template`] - The template data types and their invariants
//! - [`materials`] - Scaffold materials and culture biologics dosed per milliliter
//! - [`registry`] - Loading, validating, and looking up templates
//!
//! ## Usage
//!
//! ```ignore
//! use organforge::core::templates::registry::TemplateRegistry;
//!
//! let registry = TemplateRegistry::builtin()?;
//! let heart = registry.lookup("heart")?;
//! ```

pub mod materials;
pub mod registry;
pub mod template;

pub use registry::TemplateRegistry;
pub use template::OrganTemplate;
