//! Provides output functionality for generated organs.
//!
//! Meshes are written through the [`traits::MeshFile`] interface, with ASCII and binary
//! STL implementations in [`stl`]. Reports are serialized to TOML or JSON, and their
//! component table to CSV, by [`report`]. Every writer accepts any [`std::io::Write`];
//! only the `*_to_path` helpers touch the filesystem.

pub mod report;
pub mod stl;
pub mod traits;
