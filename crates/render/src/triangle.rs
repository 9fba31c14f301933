use glam::Mat4;
use solids_geometry::build_triangle;

use crate::context::{DrawCall, Frame, GraphicsContext, Primitive, Viewport};
use crate::error::RenderError;
use crate::program::{Program, build_program, upload_mesh};
use crate::renderer::Renderer;
use crate::shaders::TRIANGLE_SHADERS;

/// Background for the hello triangle.
pub const TRIANGLE_CLEAR_COLOR: [f32; 4] = [0.08, 0.08, 0.08, 1.0];

/// Single fixed-color triangle, drawn without an index buffer.
pub struct TriangleRenderer<C: GraphicsContext> {
    program: Program<C>,
    geometry: C::Geometry,
    vertex_count: u32,
}

impl<C: GraphicsContext> TriangleRenderer<C> {
    pub fn setup(ctx: &mut C) -> Result<Self, RenderError> {
        let program = build_program(ctx, &TRIANGLE_SHADERS)?;
        let mesh = build_triangle();
        let geometry = upload_mesh(ctx, &program, &mesh)?;
        tracing::info!("hello triangle ready");
        Ok(Self {
            program,
            geometry,
            vertex_count: mesh.vertex_count() as u32,
        })
    }
}

impl<C: GraphicsContext> Renderer<C> for TriangleRenderer<C> {
    fn render(&self, ctx: &mut C, _time: f32) {
        let (width, height) = ctx.surface_size();
        let frame = Frame {
            clear_color: TRIANGLE_CLEAR_COLOR,
            viewport: Viewport::full(width, height),
            draws: vec![DrawCall {
                geometry: &self.geometry,
                transform: Mat4::IDENTITY,
                primitive: Primitive::Arrays {
                    vertex_count: self.vertex_count,
                },
            }],
        };
        ctx.submit(&self.program.handle, &frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingContext;

    #[test]
    fn draws_three_vertices_without_indices() {
        let mut ctx = RecordingContext::new(640, 480);
        let triangle = TriangleRenderer::setup(&mut ctx).unwrap();
        triangle.render(&mut ctx, 0.0);

        let frame = &ctx.frames()[0];
        assert_eq!(frame.label, "hello_triangle");
        assert_eq!(frame.clear_color, TRIANGLE_CLEAR_COLOR);
        assert_eq!(frame.viewport, Viewport::full(640, 480));
        assert_eq!(frame.draws.len(), 1);
        assert_eq!(
            frame.draws[0].primitive,
            Primitive::Arrays { vertex_count: 3 }
        );
    }

    #[test]
    fn time_does_not_move_the_triangle() {
        let mut ctx = RecordingContext::new(640, 480);
        let triangle = TriangleRenderer::setup(&mut ctx).unwrap();
        triangle.render(&mut ctx, 0.0);
        triangle.render(&mut ctx, 10.0);
        let frames = ctx.frames();
        assert_eq!(frames[0], frames[1]);
    }
}
