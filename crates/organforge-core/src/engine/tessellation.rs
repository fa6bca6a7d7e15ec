use super::config::{MAX_RINGS, MAX_SEGMENTS, MIN_RINGS, MIN_SEGMENTS, TessellationConfig};
use crate::core::models::geometry::{Dimensions, GeneratedGeometry};
use crate::core::models::scale::ScaleFactor;
use crate::core::templates::template::{
    OrganTemplate, ShapeDescriptor, TemplateValidationError,
};
use crate::core::utils::mesh;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid shape parameters: {0}")]
    InvalidShape(#[from] TemplateValidationError),
    #[error("Scale factor must be positive, got {value}")]
    NonPositiveScale { value: f64 },
    #[error(
        "Tessellation of {rings} x {segments} is outside the supported range ({min_rings}..={max_rings} rings, {min_segments}..={max_segments} segments)",
        min_rings = MIN_RINGS,
        max_rings = MAX_RINGS,
        min_segments = MIN_SEGMENTS,
        max_segments = MAX_SEGMENTS
    )]
    UnsupportedResolution { rings: u32, segments: u32 },
    #[error("Mesh is not a closed manifold: {edges} edge(s) are not shared by exactly two faces")]
    NonManifold { edges: usize },
    #[error("Mesh orientation is inconsistent: {edges} directed edge(s) are used more than once")]
    InconsistentOrientation { edges: usize },
    #[error("Mesh contains {count} degenerate face(s)")]
    DegenerateFaces { count: usize },
    #[error("Mesh encloses a non-positive volume ({volume} ml)")]
    NonPositiveVolume { volume: f64 },
}

/// Builds the closed organ surface for a scaled template.
///
/// The template's dimensions are multiplied by the linear scale `value^(1/3)`, the shape
/// is sampled on a latitude/longitude grid with `rings` bands and `segments` vertices per
/// ring, and every face winds counter-clockwise seen from outside. The mesh is validated
/// before its volume and area are measured.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidShape`] for shape parameters that cannot produce a
/// positive radius, [`GeometryError::NonPositiveScale`] and
/// [`GeometryError::UnsupportedResolution`] for unusable inputs, and the other variants
/// when the produced mesh fails validation.
pub fn generate(
    template: &OrganTemplate,
    scale: &ScaleFactor,
    config: &TessellationConfig,
) -> Result<GeneratedGeometry, GeometryError> {
    template.shape.validate()?;
    if !scale.value.is_finite() || scale.value <= 0.0 {
        return Err(GeometryError::NonPositiveScale { value: scale.value });
    }
    let (vertex_count, face_count) =
        grid_size(config.rings, config.segments).ok_or(GeometryError::UnsupportedResolution {
            rings: config.rings,
            segments: config.segments,
        })?;

    let dimensions_cm = template.dimensions_cm.scaled(scale.linear());
    let vertices = sample_vertices(&template.shape, &dimensions_cm, config, vertex_count);
    let faces = lat_long_faces(config.rings, config.segments, face_count);

    let volume_ml = validate_mesh(&vertices, &faces)?;
    let surface_area_cm2 = mesh::surface_area(&vertices, &faces);

    debug!(
        organ = %template.organ_type,
        vertices = vertices.len(),
        faces = faces.len(),
        volume_ml,
        surface_area_cm2,
        "Tessellated organ surface."
    );

    Ok(GeneratedGeometry {
        vertices,
        faces,
        volume_ml,
        surface_area_cm2,
        dimensions_cm,
    })
}

/// Checks that a mesh is a closed, consistently oriented, non-degenerate solid and
/// returns its enclosed volume.
pub fn validate_mesh(vertices: &[Point3<f64>], faces: &[[u32; 3]]) -> Result<f64, GeometryError> {
    let topology = mesh::inspect_topology(vertices.len(), faces);
    if !topology.is_closed_manifold() {
        return Err(GeometryError::NonManifold {
            edges: topology.non_manifold_edges + topology.out_of_range_faces,
        });
    }
    if !topology.is_consistently_oriented() {
        return Err(GeometryError::InconsistentOrientation {
            edges: topology.repeated_directed_edges,
        });
    }
    let degenerate = mesh::count_degenerate_faces(vertices, faces);
    if degenerate > 0 {
        return Err(GeometryError::DegenerateFaces { count: degenerate });
    }
    let volume = mesh::signed_volume(vertices, faces);
    if volume.is_nan() || volume <= 0.0 {
        return Err(GeometryError::NonPositiveVolume { volume });
    }
    Ok(volume)
}

/// Vertex and face counts of a `rings × segments` grid, or `None` when the grid is outside
/// the configured resolution range or its indices would overflow `u32`.
fn grid_size(rings: u32, segments: u32) -> Option<(usize, usize)> {
    if !(MIN_RINGS..=MAX_RINGS).contains(&rings) || !(MIN_SEGMENTS..=MAX_SEGMENTS).contains(&segments)
    {
        return None;
    }
    let ring_vertices = (rings - 1).checked_mul(segments)?;
    let vertices = ring_vertices.checked_add(2)?;
    let faces = ring_vertices.checked_mul(2)?;
    Some((vertices as usize, faces as usize))
}

/// Vertex layout: top pole, then `rings - 1` rings of `segments` vertices from top to
/// bottom, then the bottom pole.
fn sample_vertices(
    shape: &ShapeDescriptor,
    dimensions: &Dimensions,
    config: &TessellationConfig,
    vertex_count: usize,
) -> Vec<Point3<f64>> {
    let semi_axes = dimensions.semi_axes();
    let place = |radius: f64, theta: f64, phi: f64| -> Point3<f64> {
        let direction = Vector3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
        Point3::from(direction.component_mul(&semi_axes) * radius)
    };

    let (rings, segments) = (config.rings, config.segments);
    let mut vertices = Vec::with_capacity(vertex_count);

    vertices.push(Point3::new(0.0, 0.0, shape.pole_radius(0.0) * semi_axes.z));
    for i in 1..rings {
        let phi = PI * f64::from(i) / f64::from(rings);
        for j in 0..segments {
            let theta = 2.0 * PI * f64::from(j) / f64::from(segments);
            vertices.push(place(shape.radius(theta, phi), theta, phi));
        }
    }
    vertices.push(Point3::new(0.0, 0.0, -shape.pole_radius(PI) * semi_axes.z));
    vertices
}

fn lat_long_faces(rings: u32, segments: u32, face_count: usize) -> Vec<[u32; 3]> {
    let ring_vertex = |ring: u32, j: u32| 1 + (ring - 1) * segments + (j % segments);
    let top = 0;
    let bottom = 1 + (rings - 1) * segments;
    let last_ring = rings - 1;

    let mut faces = Vec::with_capacity(face_count);
    for j in 0..segments {
        faces.push([top, ring_vertex(1, j), ring_vertex(1, j + 1)]);
    }
    for ring in 1..last_ring {
        for j in 0..segments {
            let a = ring_vertex(ring, j);
            let b = ring_vertex(ring, j + 1);
            let c = ring_vertex(ring + 1, j);
            let d = ring_vertex(ring + 1, j + 1);
            faces.push([a, c, d]);
            faces.push([a, d, b]);
        }
    }
    for j in 0..segments {
        faces.push([ring_vertex(last_ring, j), bottom, ring_vertex(last_ring, j + 1)]);
    }
    faces
}
