use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::mesh::{Dimension, GeometryError, MAX_VERTICES, Mesh};

/// Fewest radial segments that still enclose a volume.
pub const MIN_RADIAL_SEGMENTS: u32 = 3;

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
const MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Parameterized solid description, as stored in scene configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolidShape {
    Cube,
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    Cone {
        radius: f32,
        height: f32,
        radial_segments: u32,
    },
}

impl SolidShape {
    pub fn default_cylinder() -> Self {
        SolidShape::Cylinder {
            radius_top: 0.5,
            radius_bottom: 0.5,
            height: 1.5,
            radial_segments: 32,
        }
    }

    pub fn default_cone() -> Self {
        SolidShape::Cone {
            radius: 0.5,
            height: 1.5,
            radial_segments: 32,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SolidShape::Cube => "cube",
            SolidShape::Cylinder { .. } => "cylinder",
            SolidShape::Cone { .. } => "cone",
        }
    }

    pub fn build(&self) -> Result<Mesh, GeometryError> {
        match *self {
            SolidShape::Cube => Ok(build_cube()),
            SolidShape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => build_cylinder(radius_top, radius_bottom, height, radial_segments),
            SolidShape::Cone {
                radius,
                height,
                radial_segments,
            } => build_cone(radius, height, radial_segments),
        }
    }
}

/// Hello-triangle geometry: three 2D positions, no colors, no indices.
pub fn build_triangle() -> Mesh {
    #[rustfmt::skip]
    let positions = vec![
        // Top middle
        0.0, 0.5,
        // Bottom left
        -0.5, -0.5,
        // Bottom right
        0.5, -0.5,
    ];
    Mesh {
        dimension: Dimension::Two,
        positions,
        colors: Vec::new(),
        indices: Vec::new(),
    }
}

/// Generate the 24-vertex cube (edge 2, centered) with one solid color per face.
pub fn build_cube() -> Mesh {
    #[rustfmt::skip]
    let positions = vec![
        // Front
        -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,
        // Back
        -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,   1.0,  1.0, -1.0,   1.0, -1.0, -1.0,
        // Top
        -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,   1.0,  1.0,  1.0,   1.0,  1.0, -1.0,
        // Bottom
        -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,   1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,
        // Right
         1.0, -1.0, -1.0,   1.0,  1.0, -1.0,   1.0,  1.0,  1.0,   1.0, -1.0,  1.0,
        // Left
        -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,
    ];

    let face_colors = [RED, GREEN, BLUE, YELLOW, MAGENTA, CYAN];
    let mut colors = Vec::with_capacity(24 * 4);
    let mut indices = Vec::with_capacity(36);
    for (face, color) in face_colors.iter().enumerate() {
        for _ in 0..4 {
            colors.extend_from_slice(color);
        }
        let base = (face * 4) as u16;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh {
        dimension: Dimension::Three,
        positions,
        colors,
        indices,
    }
}

/// Generate a capped cylinder (or frustum when the radii differ).
///
/// Layout: `radial_segments + 1` top/bottom rim pairs (the last pair closes
/// the seam), then the top and bottom cap centers.
pub fn build_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> Result<Mesh, GeometryError> {
    check_dimension("radius_top", radius_top)?;
    check_dimension("radius_bottom", radius_bottom)?;
    check_dimension("height", height)?;
    let segments = check_segments(radial_segments)?;
    check_vertex_count(2 * (segments + 1) + 2)?;

    let half_height = f64::from(height) / 2.0;
    let mut positions = Vec::with_capacity((2 * (segments + 1) + 2) * 3);
    let mut colors = Vec::with_capacity((2 * (segments + 1) + 2) * 4);
    let mut indices: Vec<u16> = Vec::with_capacity(segments * 12);

    for i in 0..=segments {
        let (cos_theta, sin_theta) = ring_angle(i, segments);

        push_position(
            &mut positions,
            f64::from(radius_top) * cos_theta,
            half_height,
            f64::from(radius_top) * sin_theta,
        );
        push_position(
            &mut positions,
            f64::from(radius_bottom) * cos_theta,
            -half_height,
            f64::from(radius_bottom) * sin_theta,
        );
        colors.extend_from_slice(&GREEN);
        colors.extend_from_slice(&GREEN);

        if i > 0 {
            let offset = (i * 2) as u16;
            indices.extend_from_slice(&[offset - 2, offset - 1, offset]);
            indices.extend_from_slice(&[offset - 1, offset, offset + 1]);
        }
    }

    push_position(&mut positions, 0.0, half_height, 0.0);
    push_position(&mut positions, 0.0, -half_height, 0.0);
    colors.extend_from_slice(&WHITE);
    colors.extend_from_slice(&WHITE);

    let top_center = (positions.len() / 3 - 2) as u16;
    let bottom_center = top_center + 1;
    for i in 0..segments {
        let first = (i * 2) as u16;
        let second = (((i + 1) % segments) * 2) as u16;
        indices.extend_from_slice(&[first, second, top_center]);
        indices.extend_from_slice(&[first + 1, second + 1, bottom_center]);
    }

    tracing::debug!(
        "cylinder: {} segments, {} vertices, {} indices",
        segments,
        positions.len() / 3,
        indices.len()
    );

    Ok(Mesh {
        dimension: Dimension::Three,
        positions,
        colors,
        indices,
    })
}

/// Generate a cone with its apex on +Y and a fan-triangulated base.
///
/// Layout: apex, `radial_segments + 1` base rim vertices, base center.
/// The base fan covers rim pairs `(i, i + 1)` for `i in 1..radial_segments`,
/// which leaves the closing wedge between the last two rim vertices open.
pub fn build_cone(radius: f32, height: f32, radial_segments: u32) -> Result<Mesh, GeometryError> {
    check_dimension("radius", radius)?;
    check_dimension("height", height)?;
    let segments = check_segments(radial_segments)?;
    check_vertex_count(segments + 3)?;

    let half_height = f64::from(height) / 2.0;
    let mut positions = Vec::with_capacity((segments + 3) * 3);
    let mut colors = Vec::with_capacity((segments + 3) * 4);
    let mut indices: Vec<u16> = Vec::with_capacity(segments * 6);

    push_position(&mut positions, 0.0, half_height, 0.0);
    colors.extend_from_slice(&RED);

    for i in 0..=segments {
        let (cos_theta, sin_theta) = ring_angle(i, segments);
        push_position(
            &mut positions,
            f64::from(radius) * cos_theta,
            -half_height,
            f64::from(radius) * sin_theta,
        );
        colors.extend_from_slice(&RED);
    }

    for i in 1..=segments as u16 {
        indices.extend_from_slice(&[0, i, i + 1]);
    }

    push_position(&mut positions, 0.0, -half_height, 0.0);
    colors.extend_from_slice(&WHITE);

    let center = (positions.len() / 3 - 1) as u16;
    for i in 1..segments as u16 {
        indices.extend_from_slice(&[center, i + 1, i]);
    }

    tracing::debug!(
        "cone: {} segments, {} vertices, {} indices",
        segments,
        positions.len() / 3,
        indices.len()
    );

    Ok(Mesh {
        dimension: Dimension::Three,
        positions,
        colors,
        indices,
    })
}

fn ring_angle(i: usize, segments: usize) -> (f64, f64) {
    let theta = (i as f64 / segments as f64) * TAU;
    (theta.cos(), theta.sin())
}

fn push_position(positions: &mut Vec<f32>, x: f64, y: f64, z: f64) {
    positions.extend_from_slice(&[x as f32, y as f32, z as f32]);
}

fn check_segments(radial_segments: u32) -> Result<usize, GeometryError> {
    if radial_segments < MIN_RADIAL_SEGMENTS {
        return Err(GeometryError::TooFewSegments {
            segments: radial_segments,
            min: MIN_RADIAL_SEGMENTS,
        });
    }
    Ok(radial_segments as usize)
}

fn check_vertex_count(count: usize) -> Result<(), GeometryError> {
    if count > MAX_VERTICES {
        return Err(GeometryError::TooManyVertices { count });
    }
    Ok(())
}

fn check_dimension(name: &'static str, value: f32) -> Result<(), GeometryError> {
    if !value.is_finite() || value < 0.0 {
        return Err(GeometryError::InvalidDimension { name, value });
    }
    Ok(())
}
