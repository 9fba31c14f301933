//! wgpu backend for the solids demos.
//!
//! [`GpuContext`] implements [`solids_render::GraphicsContext`] on top of a
//! window surface. Shaders are validated and reflected with naga before wgpu
//! sees them; pipeline errors are captured with validation error scopes and
//! returned as logs.
//!
//! # Invariants
//! - Every geometry owns its vertex, index and transform buffers.
//! - Indices are always uploaded as `u16`.
//! - A frame is acquired at most once and presented at most once.

mod gpu;

pub use gpu::{GpuContext, GpuGeometry, GpuProgram, GpuShader};
