use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Extents of an organ along its three principal axes, in centimeters.
///
/// `width` runs along x, `length` along y, and `height` along z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn scaled(&self, linear_factor: f64) -> Self {
        Self {
            length: self.length * linear_factor,
            width: self.width * linear_factor,
            height: self.height * linear_factor,
        }
    }

    /// Semi-axes of the enclosing ellipsoid as an `(x, y, z)` vector.
    pub fn semi_axes(&self) -> Vector3<f64> {
        Vector3::new(self.width / 2.0, self.length / 2.0, self.height / 2.0)
    }
}

/// A closed, outward-oriented triangle mesh produced for a single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedGeometry {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<[u32; 3]>,
    pub volume_ml: f64,
    pub surface_area_cm2: f64,
    pub dimensions_cm: Dimensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometrySummary {
    pub vertex_count: usize,
    pub face_count: usize,
    pub volume_ml: f64,
    pub surface_area_cm2: f64,
    pub dimensions_cm: Dimensions,
}

impl GeneratedGeometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn triangles(&self) -> impl Iterator<Item = [&Point3<f64>; 3]> + '_ {
        self.faces.iter().map(|&[a, b, c]| {
            [
                &self.vertices[a as usize],
                &self.vertices[b as usize],
                &self.vertices[c as usize],
            ]
        })
    }

    pub fn summary(&self) -> GeometrySummary {
        GeometrySummary {
            vertex_count: self.vertex_count(),
            face_count: self.face_count(),
            volume_ml: self.volume_ml,
            surface_area_cm2: self.surface_area_cm2,
            dimensions_cm: self.dimensions_cm,
        }
    }
}
