use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use solids_geometry::Mesh;
use solids_render::shaders::{FRAGMENT_ENTRY, ShaderInterface, VERTEX_ENTRY, reflect_shader};
use solids_render::{
    AttributeSemantic, Frame, GraphicsContext, Primitive, ProgramLayout, RenderError,
    ResolvedAttribute, ShaderStage,
};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    mvp: [[f32; 4]; 4],
}

impl Uniforms {
    fn new(mvp: Mat4) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
        }
    }
}

/// A validated WGSL module plus its reflected entry point interface.
pub struct GpuShader {
    module: wgpu::ShaderModule,
    interface: ShaderInterface,
}

/// A render pipeline linked from a vertex/fragment pair.
pub struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: Option<wgpu::BindGroupLayout>,
    attributes: Vec<ResolvedAttribute>,
}

/// Buffers owned by one mesh: one vertex buffer per program attribute, an
/// optional index buffer, and its own transform uniform.
pub struct GpuGeometry {
    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    uniform: Option<(wgpu::Buffer, wgpu::BindGroup)>,
}

struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// wgpu device bound to a window surface.
///
/// Frames are acquired lazily by [`GraphicsContext::submit`] (or explicitly
/// with [`GpuContext::acquire_frame`] when overlays draw into the same
/// target) and shown with [`GpuContext::present`].
pub struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    current: Option<SurfaceFrame>,
}

impl GpuContext {
    /// Create a device and configure a surface for `target`.
    ///
    /// Every failure here means the environment cannot render and maps to
    /// [`RenderError::ContextUnavailable`].
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| unavailable(format!("failed to create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| unavailable("no compatible GPU adapter found".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("solids_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| unavailable(format!("failed to create device: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let Some(&first_format) = surface_caps.formats.first() else {
            return Err(unavailable("surface reports no supported formats".into()));
        };
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(first_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_texture(&device, config.width, config.height);

        tracing::info!(
            "GPU initialized with {} backend ({})",
            adapter.get_info().backend.to_str(),
            adapter.get_info().name
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            current: None,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_texture(&self.device, self.config.width, self.config.height);
        tracing::debug!("surface resized to {}x{}", self.config.width, self.config.height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Acquire the next surface texture if none is held. Returns `false` when
    /// this frame has to be skipped.
    pub fn acquire_frame(&mut self) -> bool {
        if self.current.is_some() {
            return true;
        }
        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.current = Some(SurfaceFrame { texture, view });
                true
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                tracing::warn!("surface lost or outdated, reconfigured and skipped frame");
                false
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                false
            }
        }
    }

    /// View of the acquired frame, for overlays drawn after the scene.
    pub fn frame_view(&self) -> Option<&wgpu::TextureView> {
        self.current.as_ref().map(|frame| &frame.view)
    }

    /// Present the acquired frame, if any.
    pub fn present(&mut self) {
        if let Some(frame) = self.current.take() {
            frame.texture.present();
        }
    }

    /// Run `f` inside a validation error scope and report the first error.
    fn validated<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> Result<T, String> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(error) => Err(error.to_string()),
            None => Ok(value),
        }
    }
}

impl GraphicsContext for GpuContext {
    type Shader = GpuShader;
    type Program = GpuProgram;
    type Geometry = GpuGeometry;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<GpuShader, String> {
        let label = match stage {
            ShaderStage::Vertex => "vertex_shader",
            ShaderStage::Fragment => "fragment_shader",
        };
        let interface = reflect_shader(stage, source)?;
        let module = self.validated(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })?;
        Ok(GpuShader { module, interface })
    }

    fn delete_shader(&mut self, shader: GpuShader) {
        drop(shader);
    }

    fn attribute_location(&self, vertex_shader: &GpuShader, name: &str) -> Option<u32> {
        vertex_shader.interface.attribute_location(name)
    }

    fn link_program(
        &mut self,
        vertex: GpuShader,
        fragment: GpuShader,
        layout: &ProgramLayout,
    ) -> Result<GpuProgram, String> {
        vertex.interface.check_link(&fragment.interface)?;

        let formats = layout
            .attributes
            .iter()
            .map(|a| vertex_format(a.attribute.components))
            .collect::<Result<Vec<_>, _>>()?;

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = layout
            .attributes
            .iter()
            .zip(&formats)
            .map(|(a, format)| {
                [wgpu::VertexAttribute {
                    format: *format,
                    offset: 0,
                    shader_location: a.location,
                }]
            })
            .collect();

        // One tightly packed buffer per attribute, in layout order.
        let buffers: Vec<wgpu::VertexBufferLayout> = layout
            .attributes
            .iter()
            .zip(&attributes)
            .map(|(a, attribute)| wgpu::VertexBufferLayout {
                array_stride: (a.attribute.components * std::mem::size_of::<f32>()) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attribute,
            })
            .collect();

        let uniform_layout = layout.uses_transform.then(|| {
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("transform_bind_group_layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                })
        });
        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = uniform_layout.iter().collect();
        let surface_format = self.config.format;

        let pipeline = self.validated(|device| {
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(layout.label),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &[],
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(layout.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        })?;

        Ok(GpuProgram {
            pipeline,
            uniform_layout,
            attributes: layout.attributes.clone(),
        })
    }

    fn create_geometry(&mut self, program: &GpuProgram, mesh: &Mesh) -> GpuGeometry {
        let vertex_buffers = program
            .attributes
            .iter()
            .map(|a| {
                let data: &[f32] = match a.attribute.semantic {
                    AttributeSemantic::Position => &mesh.positions,
                    AttributeSemantic::Color => &mesh.colors,
                };
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(a.attribute.name),
                        contents: bytemuck::cast_slice(data),
                        usage: wgpu::BufferUsages::VERTEX,
                    })
            })
            .collect();

        let index_buffer = mesh.is_indexed().then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("index_buffer"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
        });

        let uniform = program.uniform_layout.as_ref().map(|layout| {
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("transform_buffer"),
                    contents: bytemuck::bytes_of(&Uniforms::new(Mat4::IDENTITY)),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("transform_bind_group"),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            (buffer, bind_group)
        });

        GpuGeometry {
            vertex_buffers,
            index_buffer,
            uniform,
        }
    }

    fn submit(&mut self, program: &GpuProgram, frame: &Frame<'_, GpuGeometry>) {
        if !self.acquire_frame() {
            return;
        }
        let Some(target) = &self.current else {
            return;
        };

        for draw in &frame.draws {
            if let Some((buffer, _)) = &draw.geometry.uniform {
                self.queue
                    .write_buffer(buffer, 0, bytemuck::bytes_of(&Uniforms::new(draw.transform)));
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("solids_encoder"),
            });

        {
            let [r, g, b, a] = frame.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("solids_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let vp = frame.viewport;
            pass.set_viewport(
                vp.x as f32,
                vp.y as f32,
                vp.width as f32,
                vp.height as f32,
                0.0,
                1.0,
            );
            pass.set_pipeline(&program.pipeline);

            for draw in &frame.draws {
                let geometry = draw.geometry;
                if let Some((_, bind_group)) = &geometry.uniform {
                    pass.set_bind_group(0, bind_group, &[]);
                }
                for (slot, buffer) in geometry.vertex_buffers.iter().enumerate() {
                    pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                match draw.primitive {
                    Primitive::Indexed { index_count } => {
                        if let Some(index_buffer) = &geometry.index_buffer {
                            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                            pass.draw_indexed(0..index_count, 0, 0..1);
                        }
                    }
                    Primitive::Arrays { vertex_count } => {
                        pass.draw(0..vertex_count, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

fn unavailable(reason: String) -> RenderError {
    tracing::error!("{reason}");
    RenderError::ContextUnavailable(reason)
}

fn vertex_format(components: usize) -> Result<wgpu::VertexFormat, String> {
    match components {
        1 => Ok(wgpu::VertexFormat::Float32),
        2 => Ok(wgpu::VertexFormat::Float32x2),
        3 => Ok(wgpu::VertexFormat::Float32x3),
        4 => Ok(wgpu::VertexFormat::Float32x4),
        n => Err(format!("unsupported attribute width: {n} floats")),
    }
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_formats_cover_demo_attributes() {
        assert_eq!(vertex_format(2), Ok(wgpu::VertexFormat::Float32x2));
        assert_eq!(vertex_format(3), Ok(wgpu::VertexFormat::Float32x3));
        assert_eq!(vertex_format(4), Ok(wgpu::VertexFormat::Float32x4));
        assert!(vertex_format(5).is_err());
    }

    #[test]
    fn uniforms_are_column_major() {
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let u = Uniforms::new(m);
        assert_eq!(u.mvp[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(std::mem::size_of::<Uniforms>(), 64);
    }
}
