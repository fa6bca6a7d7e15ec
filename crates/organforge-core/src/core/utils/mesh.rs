use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// Faces whose area falls at or below this value (cm²) are reported as degenerate.
pub const DEGENERATE_AREA_EPSILON: f64 = 1e-12;

/// Signed volume enclosed by a closed triangle mesh, via the divergence theorem.
///
/// Positive when faces wind counter-clockwise seen from outside. Only meaningful for
/// closed meshes.
pub fn signed_volume(vertices: &[Point3<f64>], faces: &[[u32; 3]]) -> f64 {
    let mut volume = 0.0;
    for &[i0, i1, i2] in faces {
        let v0 = vertices[i0 as usize].coords;
        let v1 = vertices[i1 as usize].coords;
        let v2 = vertices[i2 as usize].coords;
        volume += v0.dot(&v1.cross(&v2));
    }
    volume / 6.0
}

pub fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    face_normal(a, b, c).norm() / 2.0
}

/// Unnormalized normal of a triangle; its direction follows the winding order.
#[inline]
pub fn face_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    (b - a).cross(&(c - a))
}

pub fn surface_area(vertices: &[Point3<f64>], faces: &[[u32; 3]]) -> f64 {
    faces
        .iter()
        .map(|&[a, b, c]| {
            triangle_area(
                &vertices[a as usize],
                &vertices[b as usize],
                &vertices[c as usize],
            )
        })
        .sum()
}

/// Counts of the topological defects that keep a triangle mesh from being a closed,
/// consistently oriented 2-manifold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyReport {
    pub edge_count: usize,
    /// Undirected edges used by a number of faces other than two.
    pub non_manifold_edges: usize,
    /// Directed edges traversed by more than one face.
    pub repeated_directed_edges: usize,
    /// Faces referencing a vertex index outside the vertex list.
    pub out_of_range_faces: usize,
}

impl TopologyReport {
    pub fn is_closed_manifold(&self) -> bool {
        self.non_manifold_edges == 0 && self.out_of_range_faces == 0
    }

    pub fn is_consistently_oriented(&self) -> bool {
        self.repeated_directed_edges == 0
    }
}

/// Builds the edge adjacency of `faces` and tallies its defects.
pub fn inspect_topology(vertex_count: usize, faces: &[[u32; 3]]) -> TopologyReport {
    let mut undirected: HashMap<(u32, u32), usize> = HashMap::with_capacity(faces.len() * 3 / 2);
    let mut directed: HashMap<(u32, u32), usize> = HashMap::with_capacity(faces.len() * 3);
    let mut out_of_range_faces = 0;

    for face in faces {
        if face.iter().any(|&v| v as usize >= vertex_count) {
            out_of_range_faces += 1;
            continue;
        }
        for k in 0..3 {
            let (v0, v1) = (face[k], face[(k + 1) % 3]);
            *directed.entry((v0, v1)).or_default() += 1;
            *undirected.entry(normalize_edge(v0, v1)).or_default() += 1;
        }
    }

    TopologyReport {
        edge_count: undirected.len(),
        non_manifold_edges: undirected.values().filter(|&&n| n != 2).count(),
        repeated_directed_edges: directed.values().filter(|&&n| n > 1).count(),
        out_of_range_faces,
    }
}

/// Number of faces that repeat a vertex index or enclose (almost) no area.
pub fn count_degenerate_faces(vertices: &[Point3<f64>], faces: &[[u32; 3]]) -> usize {
    faces
        .iter()
        .filter(|&&[a, b, c]| {
            a == b
                || b == c
                || a == c
                || triangle_area(
                    &vertices[a as usize],
                    &vertices[b as usize],
                    &vertices[c as usize],
                ) <= DEGENERATE_AREA_EPSILON
        })
        .count()
}

#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}
