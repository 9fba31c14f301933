//! Rendering layer: renderer-agnostic setup and draw loop for the demos.
//!
//! # Invariants
//! - Setup either returns a ready renderer or a [`RenderError`]; no partial renderers.
//! - Each solid owns its uploaded geometry; nothing is shared between draws but the program.
//! - Once a loop is stopped it never draws again.
//!
//! Backends implement [`GraphicsContext`]. [`RecordingContext`] is a headless
//! implementation that records frames instead of rasterizing them.

mod animation;
mod camera;
mod config;
mod context;
mod error;
mod program;
mod recording;
mod renderer;
mod scene;
pub mod shaders;
mod triangle;

pub use animation::{AnimationLoop, Clock, LoopState, SteppedClock, StopHandle, SystemClock};
pub use camera::{Projection, aspect_ratio, model_transform, model_view_projection};
pub use config::{ConfigError, SceneConfig, SolidConfig, SolidInstance};
pub use context::{
    AttributeSemantic, DrawCall, Frame, GraphicsContext, Primitive, ProgramLayout,
    ResolvedAttribute, ShaderStage, VertexAttribute, Viewport,
};
pub use error::RenderError;
pub use program::{Program, ShaderPair, build_program, check_mesh_layout, upload_mesh};
pub use recording::{
    RecordedDraw, RecordedFrame, RecordedGeometry, RecordedProgram, RecordedShader,
    RecordingContext,
};
pub use renderer::{Demo, DemoKind, Renderer};
pub use scene::SceneRenderer;
pub use triangle::{TRIANGLE_CLEAR_COLOR, TriangleRenderer};

pub fn crate_info() -> &'static str {
    "solids-render v0.1.0"
}
