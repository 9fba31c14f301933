//! Geometry Builder: procedural vertex/color/index arrays for the demo solids.
//!
//! # Invariants
//! - Generators are pure: identical parameters give bit-identical meshes.
//! - Every index is below the vertex count, and the vertex count fits 16-bit indices.
//! - 3D meshes carry exactly one RGBA color per vertex.

mod mesh;
mod shapes;

pub use mesh::{COLOR_STRIDE, Dimension, GeometryError, MAX_VERTICES, Mesh, MeshStats};
pub use shapes::{
    MIN_RADIAL_SEGMENTS, SolidShape, build_cone, build_cube, build_cylinder, build_triangle,
};

pub fn crate_info() -> &'static str {
    "solids-geometry v0.1.0"
}
