use glam::Mat4;
use solids_geometry::Mesh;

use crate::context::{Frame, GraphicsContext, Primitive, ProgramLayout, ShaderStage, Viewport};
use crate::shaders::{ShaderInterface, reflect_shader};

/// Headless context that records frames instead of rasterizing them.
///
/// Shader compilation parses and validates WGSL with naga and checks the
/// stage's entry point; attribute lookup reads the entry point's bindings.
/// Linking checks that every fragment input is written by the vertex stage.
/// Useful for tests, the CLI frame dump, and exercising setup error paths.
#[derive(Debug)]
pub struct RecordingContext {
    width: u32,
    height: u32,
    next_id: u32,
    live_shaders: usize,
    fail_next_link: Option<String>,
    geometries: usize,
    frames: Vec<RecordedFrame>,
}

#[derive(Debug)]
pub struct RecordedShader {
    interface: ShaderInterface,
}

#[derive(Debug, Clone)]
pub struct RecordedProgram {
    pub id: u32,
    pub label: &'static str,
}

#[derive(Debug, Clone)]
pub struct RecordedGeometry {
    pub id: u32,
    pub vertex_count: usize,
    pub index_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub geometry: u32,
    pub transform: Mat4,
    pub primitive: Primitive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub program: u32,
    pub label: &'static str,
    pub clear_color: [f32; 4],
    pub viewport: Viewport,
    pub draws: Vec<RecordedDraw>,
}

impl RecordingContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_id: 1,
            live_shaders: 0,
            fail_next_link: None,
            geometries: 0,
            frames: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Shaders compiled but neither linked nor deleted.
    pub fn live_shaders(&self) -> usize {
        self.live_shaders
    }

    /// Make the next `link_program` call fail with `log`.
    pub fn fail_next_link(&mut self, log: impl Into<String>) {
        self.fail_next_link = Some(log.into());
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn take_frames(&mut self) -> Vec<RecordedFrame> {
        std::mem::take(&mut self.frames)
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsContext for RecordingContext {
    type Shader = RecordedShader;
    type Program = RecordedProgram;
    type Geometry = RecordedGeometry;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<RecordedShader, String> {
        let interface = reflect_shader(stage, source)?;
        self.live_shaders += 1;
        Ok(RecordedShader { interface })
    }

    fn delete_shader(&mut self, _shader: RecordedShader) {
        self.live_shaders -= 1;
    }

    fn attribute_location(&self, vertex_shader: &RecordedShader, name: &str) -> Option<u32> {
        vertex_shader.interface.attribute_location(name)
    }

    fn link_program(
        &mut self,
        vertex: RecordedShader,
        fragment: RecordedShader,
        layout: &ProgramLayout,
    ) -> Result<RecordedProgram, String> {
        self.live_shaders -= 2;
        vertex.interface.check_link(&fragment.interface)?;
        if let Some(log) = self.fail_next_link.take() {
            return Err(log);
        }
        Ok(RecordedProgram {
            id: self.next_id(),
            label: layout.label,
        })
    }

    fn create_geometry(&mut self, _program: &RecordedProgram, mesh: &Mesh) -> RecordedGeometry {
        self.geometries += 1;
        RecordedGeometry {
            id: self.next_id(),
            vertex_count: mesh.vertex_count(),
            index_count: mesh.indices.len(),
        }
    }

    fn submit(&mut self, program: &RecordedProgram, frame: &Frame<'_, RecordedGeometry>) {
        let draws = frame
            .draws
            .iter()
            .map(|draw| RecordedDraw {
                geometry: draw.geometry.id,
                transform: draw.transform,
                primitive: draw.primitive,
            })
            .collect();
        self.frames.push(RecordedFrame {
            program: program.id,
            label: program.label,
            clear_color: frame.clear_color,
            viewport: frame.viewport,
            draws,
        });
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
