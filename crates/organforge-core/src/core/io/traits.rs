use crate::core::models::geometry::GeneratedGeometry;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Defines the interface for writing mesh exchange formats.
///
/// Implementors serialize a [`GeneratedGeometry`] deterministically: identical geometry
/// and options always produce identical bytes.
pub trait MeshFile {
    /// Format-specific output settings.
    type Options: Default;

    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes a mesh to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh cannot be represented in the format or the writer
    /// fails.
    fn write_to(
        geometry: &GeneratedGeometry,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a mesh to a file path, creating or truncating the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        geometry: &GeneratedGeometry,
        options: &Self::Options,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(geometry, options, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
