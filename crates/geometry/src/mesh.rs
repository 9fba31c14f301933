use serde::{Deserialize, Serialize};
use std::path::Path;

/// Components per vertex color (RGBA).
pub const COLOR_STRIDE: usize = 4;

/// Largest vertex count addressable by a 16-bit index buffer.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Errors from mesh generation and validation.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("radial segments must be at least {min}, got {segments}")]
    TooFewSegments { segments: u32, min: u32 },
    #[error("mesh needs {count} vertices but 16-bit indices address at most 65536")]
    TooManyVertices { count: usize },
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidDimension { name: &'static str, value: f32 },
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },
    #[error("{attribute} has {len} floats, expected {expected}")]
    AttributeLengthMismatch {
        attribute: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Number of position components per vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    /// `x, y` positions (screen-space demo geometry).
    Two,
    /// `x, y, z` positions.
    Three,
}

impl Dimension {
    pub fn components(self) -> usize {
        match self {
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }
}

/// Flat vertex/color/index arrays ready for upload.
///
/// Positions are tightly packed with a stride of `dimension.components()`,
/// colors with a stride of [`COLOR_STRIDE`]. `colors` and `indices` may be
/// empty; a mesh without indices is drawn as a plain triangle list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub dimension: Dimension,
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / self.dimension.components()
    }

    /// Number of primitives drawn: indexed triangles, or vertex triples when
    /// the mesh has no index buffer.
    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.vertex_count() / 3
        } else {
            self.indices.len() / 3
        }
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Check stride, color pairing, index range and the 16-bit ceiling.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let stride = self.dimension.components();
        if self.positions.len() % stride != 0 {
            return Err(GeometryError::AttributeLengthMismatch {
                attribute: "positions",
                len: self.positions.len(),
                expected: self.positions.len() / stride * stride,
            });
        }

        let vertex_count = self.vertex_count();
        if vertex_count > MAX_VERTICES {
            return Err(GeometryError::TooManyVertices {
                count: vertex_count,
            });
        }

        if !self.colors.is_empty() && self.colors.len() != vertex_count * COLOR_STRIDE {
            return Err(GeometryError::AttributeLengthMismatch {
                attribute: "colors",
                len: self.colors.len(),
                expected: vertex_count * COLOR_STRIDE,
            });
        }

        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        Ok(())
    }

    /// Summarize counts and axis-aligned bounds.
    pub fn stats(&self) -> MeshStats {
        let stride = self.dimension.components();
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for vertex in self.positions.chunks_exact(stride) {
            for (axis, &value) in vertex.iter().enumerate() {
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
            }
        }
        if stride == 2 {
            min[2] = 0.0;
            max[2] = 0.0;
        }
        if self.positions.is_empty() {
            min = [0.0; 3];
            max = [0.0; 3];
        }

        MeshStats {
            vertex_count: self.vertex_count(),
            index_count: self.indices.len(),
            triangle_count: self.triangle_count(),
            has_colors: !self.colors.is_empty(),
            min,
            max,
        }
    }

    /// Write the mesh as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), GeometryError> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, self)?;
        tracing::debug!(
            "wrote mesh ({} vertices) to {}",
            self.vertex_count(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Read a mesh from JSON and validate it.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let file = std::fs::File::open(path.as_ref())?;
        let mesh: Self = serde_json::from_reader(file)?;
        mesh.validate()?;
        Ok(mesh)
    }
}

/// Summary of a mesh for logs and tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshStats {
    pub vertex_count: usize,
    pub index_count: usize,
    pub triangle_count: usize,
    pub has_colors: bool,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl std::fmt::Display for MeshStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "vertices={} indices={} triangles={} colors={} bounds=({:.2}, {:.2}, {:.2})..({:.2}, {:.2}, {:.2})",
            self.vertex_count,
            self.index_count,
            self.triangle_count,
            self.has_colors,
            self.min[0],
            self.min[1],
            self.min[2],
            self.max[0],
            self.max[1],
            self.max[2]
        )
    }
}
