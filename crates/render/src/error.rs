use solids_geometry::GeometryError;

use crate::config::ConfigError;
use crate::context::ShaderStage;

/// Errors from render setup. Once a renderer is set up, drawing is infallible.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no suitable rendering context: {0}")]
    ContextUnavailable(String),
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompileFailed { stage: ShaderStage, log: String },
    #[error("failed to link GPU program: {0}")]
    ProgramLinkFailed(String),
    #[error("failed to get attribute location for {0}")]
    AttributeNotFound(String),
    #[error("mesh has {actual}-component {attribute}, program expects {expected}")]
    MeshLayoutMismatch {
        attribute: String,
        expected: usize,
        actual: usize,
    },
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("invalid scene configuration: {0}")]
    Config(#[from] ConfigError),
}
