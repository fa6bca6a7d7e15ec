use super::traits::MeshFile;
use crate::core::models::geometry::GeneratedGeometry;
use crate::core::utils::mesh::face_normal;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

const HEADER_SIZE: usize = 80;
const DEFAULT_SOLID_NAME: &str = "organforge";

#[derive(Debug, Error)]
pub enum StlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Mesh has {0} faces, more than a binary STL can index")]
    TooManyFaces(usize),
}

/// Length unit of exported coordinates. Geometry is always computed in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "cm")]
    Centimeters,
}

impl LengthUnit {
    pub fn per_centimeter(&self) -> f64 {
        match self {
            LengthUnit::Millimeters => 10.0,
            LengthUnit::Centimeters => 1.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Centimeters => "cm",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported length unit '{0}' (expected 'mm' or 'cm')")]
pub struct ParseLengthUnitError(pub String);

impl FromStr for LengthUnit {
    type Err = ParseLengthUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeters" => Ok(LengthUnit::Millimeters),
            "cm" | "centimeters" => Ok(LengthUnit::Centimeters),
            _ => Err(ParseLengthUnitError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StlOptions {
    pub units: LengthUnit,
    /// Name written after `solid` in ASCII output and into the binary header.
    pub solid_name: String,
}

impl Default for StlOptions {
    fn default() -> Self {
        Self {
            units: LengthUnit::default(),
            solid_name: DEFAULT_SOLID_NAME.to_string(),
        }
    }
}

/// Unit-length facet normal, or zero for a degenerate triangle.
fn unit_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    let normal = face_normal(a, b, c);
    let len = normal.norm();
    if len > f64::EPSILON {
        normal / len
    } else {
        Vector3::zeros()
    }
}

pub struct AsciiStl;

impl MeshFile for AsciiStl {
    type Options = StlOptions;
    type Error = StlError;

    fn write_to(
        geometry: &GeneratedGeometry,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let scale = options.units.per_centimeter();
        writeln!(writer, "solid {}", options.solid_name)?;
        for [a, b, c] in geometry.triangles() {
            let n = unit_normal(a, b, c);
            writeln!(writer, "  facet normal {:.6e} {:.6e} {:.6e}", n.x, n.y, n.z)?;
            writeln!(writer, "    outer loop")?;
            for v in [a, b, c] {
                writeln!(
                    writer,
                    "      vertex {:.6e} {:.6e} {:.6e}",
                    v.x * scale,
                    v.y * scale,
                    v.z * scale
                )?;
            }
            writeln!(writer, "    endloop")?;
            writeln!(writer, "  endfacet")?;
        }
        writeln!(writer, "endsolid {}", options.solid_name)?;
        Ok(())
    }
}

pub struct BinaryStl;

impl BinaryStl {
    fn header(options: &StlOptions) -> [u8; HEADER_SIZE] {
        let mut header = [b' '; HEADER_SIZE];
        let text = format!(
            "OrganForge binary STL {} units={}",
            options.solid_name, options.units
        );
        let bytes = text.as_bytes();
        let len = bytes.len().min(HEADER_SIZE);
        header[..len].copy_from_slice(&bytes[..len]);
        header
    }

    fn write_vec(writer: &mut impl Write, v: [f64; 3]) -> io::Result<()> {
        for component in v {
            writer.write_all(&(component as f32).to_le_bytes())?;
        }
        Ok(())
    }
}

impl MeshFile for BinaryStl {
    type Options = StlOptions;
    type Error = StlError;

    fn write_to(
        geometry: &GeneratedGeometry,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let face_count = u32::try_from(geometry.face_count())
            .map_err(|_| StlError::TooManyFaces(geometry.face_count()))?;
        let scale = options.units.per_centimeter();

        writer.write_all(&Self::header(options))?;
        writer.write_all(&face_count.to_le_bytes())?;
        for [a, b, c] in geometry.triangles() {
            let n = unit_normal(a, b, c);
            Self::write_vec(writer, [n.x, n.y, n.z])?;
            for v in [a, b, c] {
                Self::write_vec(writer, [v.x * scale, v.y * scale, v.z * scale])?;
            }
            writer.write_all(&0u16.to_le_bytes())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    Ascii,
    #[default]
    Binary,
}

impl StlFormat {
    pub fn write_to(
        &self,
        geometry: &GeneratedGeometry,
        options: &StlOptions,
        writer: &mut impl Write,
    ) -> Result<(), StlError> {
        match self {
            StlFormat::Ascii => AsciiStl::write_to(geometry, options, writer),
            StlFormat::Binary => BinaryStl::write_to(geometry, options, writer),
        }
    }

    pub fn write_to_path<P: AsRef<Path>>(
        &self,
        geometry: &GeneratedGeometry,
        options: &StlOptions,
        path: P,
    ) -> Result<(), StlError> {
        match self {
            StlFormat::Ascii => AsciiStl::write_to_path(geometry, options, path),
            StlFormat::Binary => BinaryStl::write_to_path(geometry, options, path),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported STL format '{0}' (expected 'ascii' or 'binary')")]
pub struct ParseStlFormatError(pub String);

impl FromStr for StlFormat {
    type Err = ParseStlFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascii" => Ok(StlFormat::Ascii),
            "binary" => Ok(StlFormat::Binary),
            _ => Err(ParseStlFormatError(s.to_string())),
        }
    }
}

impl fmt::Display for StlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StlFormat::Ascii => "ascii",
            StlFormat::Binary => "binary",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::geometry::Dimensions;
    use tempfile::tempdir;

    fn tetrahedron() -> GeneratedGeometry {
        GeneratedGeometry {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            faces: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
            volume_ml: 1.0 / 6.0,
            surface_area_cm2: 1.5 + 3f64.sqrt() / 2.0,
            dimensions_cm: Dimensions {
                length: 1.0,
                width: 1.0,
                height: 1.0,
            },
        }
    }

    fn read_f32(bytes: &[u8], offset: usize) -> f32 {
        f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn binary_layout_has_header_count_and_fifty_byte_records() {
        let mut buf = Vec::new();
        BinaryStl::write_to(&tetrahedron(), &StlOptions::default(), &mut buf).unwrap();

        assert_eq!(buf.len(), 80 + 4 + 4 * 50);
        assert!(buf.starts_with(b"OrganForge binary STL organforge units=mm"));
        assert_eq!(u32::from_le_bytes(buf[80..84].try_into().unwrap()), 4);

        // First facet is the bottom face: normal -z, second vertex (0,1,0) in mm.
        let record = 84;
        assert_eq!(read_f32(&buf, record + 8), -1.0);
        assert_eq!(read_f32(&buf, record + 12 + 12 + 4), 10.0);
        assert_eq!(&buf[record + 48..record + 50], &[0, 0]);
    }

    #[test]
    fn binary_output_respects_centimeter_units() {
        let options = StlOptions {
            units: LengthUnit::Centimeters,
            ..StlOptions::default()
        };
        let mut buf = Vec::new();
        BinaryStl::write_to(&tetrahedron(), &options, &mut buf).unwrap();
        assert_eq!(read_f32(&buf, 84 + 12 + 12 + 4), 1.0);
    }

    #[test]
    fn ascii_layout_lists_every_facet() {
        let mut buf = Vec::new();
        AsciiStl::write_to(&tetrahedron(), &StlOptions::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.first(), Some(&"solid organforge"));
        assert_eq!(lines.last(), Some(&"endsolid organforge"));
        assert_eq!(lines.len(), 2 + 4 * 7);
        assert_eq!(lines[1], "  facet normal 0.000000e0 0.000000e0 -1.000000e0");
        assert_eq!(lines[4], "      vertex 0.000000e0 1.000000e1 0.000000e0");
        assert_eq!(text.matches("endfacet").count(), 4);
    }

    #[test]
    fn identical_geometry_produces_identical_bytes() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        StlFormat::Ascii
            .write_to(&tetrahedron(), &StlOptions::default(), &mut first)
            .unwrap();
        StlFormat::Ascii
            .write_to(&tetrahedron(), &StlOptions::default(), &mut second)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn write_to_path_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mesh.stl");
        StlFormat::Binary
            .write_to_path(&tetrahedron(), &StlOptions::default(), &path)
            .unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 284);
    }

    #[test]
    fn length_unit_parses_symbols() {
        assert_eq!("mm".parse::<LengthUnit>(), Ok(LengthUnit::Millimeters));
        assert_eq!(" CM ".parse::<LengthUnit>(), Ok(LengthUnit::Centimeters));
        assert!("inch".parse::<LengthUnit>().is_err());
    }

    #[test]
    fn stl_format_parses_names() {
        assert_eq!("ASCII".parse::<StlFormat>(), Ok(StlFormat::Ascii));
        assert_eq!("binary".parse::<StlFormat>(), Ok(StlFormat::Binary));
        assert!("obj".parse::<StlFormat>().is_err());
    }
}
