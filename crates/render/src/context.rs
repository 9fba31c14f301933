use glam::Mat4;
use solids_geometry::Mesh;

/// Pipeline stage a shader module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Which mesh array feeds a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSemantic {
    Position,
    Color,
}

/// A named vertex input declared by a shader pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub semantic: AttributeSemantic,
    /// Float components per vertex.
    pub components: usize,
}

/// A vertex attribute with its shader location resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAttribute {
    pub attribute: VertexAttribute,
    pub location: u32,
}

/// Everything a context needs to link a program besides the shaders.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramLayout {
    pub label: &'static str,
    pub attributes: Vec<ResolvedAttribute>,
    /// Whether the vertex stage reads a per-draw transform uniform.
    pub uses_transform: bool,
}

/// Pixel rectangle draws are rasterized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// How a draw consumes its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Indexed triangle list over the first `index_count` indices.
    Indexed { index_count: u32 },
    /// Non-indexed triangle list over the first `vertex_count` vertices.
    Arrays { vertex_count: u32 },
}

/// One draw: geometry, its transform and the primitive range.
pub struct DrawCall<'a, G> {
    pub geometry: &'a G,
    pub transform: Mat4,
    pub primitive: Primitive,
}

/// A complete frame for one program: clear, viewport, ordered draws.
pub struct Frame<'a, G> {
    pub clear_color: [f32; 4],
    pub viewport: Viewport,
    pub draws: Vec<DrawCall<'a, G>>,
}

/// Opaque rendering capabilities supplied by a backend.
///
/// Program setup is written once against this trait (see
/// [`build_program`](crate::build_program)); backends only translate each
/// capability to their API. Compile and link failures return the backend's
/// log text.
pub trait GraphicsContext {
    type Shader;
    type Program;
    type Geometry;

    /// Compile one shader stage.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;

    /// Release a shader that will not be linked.
    fn delete_shader(&mut self, shader: Self::Shader);

    /// Location of a named vertex input, if the shader declares it.
    fn attribute_location(&self, vertex_shader: &Self::Shader, name: &str) -> Option<u32>;

    /// Link both stages into a program. The shaders are consumed either way.
    fn link_program(
        &mut self,
        vertex: Self::Shader,
        fragment: Self::Shader,
        layout: &ProgramLayout,
    ) -> Result<Self::Program, String>;

    /// Upload a mesh into buffers owned by the returned geometry.
    fn create_geometry(&mut self, program: &Self::Program, mesh: &Mesh) -> Self::Geometry;

    /// Clear, set the viewport and issue every draw in order.
    fn submit(&mut self, program: &Self::Program, frame: &Frame<'_, Self::Geometry>);

    /// Current drawable size in pixels.
    fn surface_size(&self) -> (u32, u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_stage_display() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }

    #[test]
    fn full_viewport_starts_at_origin() {
        let vp = Viewport::full(640, 480);
        assert_eq!((vp.x, vp.y, vp.width, vp.height), (0, 0, 640, 480));
    }
}
