use glam::Mat4;

use crate::camera::{Projection, aspect_ratio, model_view_projection};
use crate::config::{SceneConfig, SolidInstance};
use crate::context::{DrawCall, Frame, GraphicsContext, Primitive, Viewport};
use crate::error::RenderError;
use crate::program::{Program, build_program, upload_mesh};
use crate::renderer::Renderer;
use crate::shaders::SOLID_SHADERS;

/// A solid with its own uploaded geometry.
struct SolidDraw<C: GraphicsContext> {
    instance: SolidInstance,
    geometry: C::Geometry,
}

/// Draws the configured solids every frame, each rotating about X and Y.
///
/// Geometry is uploaded once per solid at setup; each frame only the
/// model-view-projection matrices are recomputed.
pub struct SceneRenderer<C: GraphicsContext> {
    program: Program<C>,
    solids: Vec<SolidDraw<C>>,
    projection: Projection,
    clear_color: [f32; 4],
}

impl<C: GraphicsContext> SceneRenderer<C> {
    /// Check the projection, link the solid program and upload every solid
    /// in `config`.
    pub fn setup(ctx: &mut C, config: &SceneConfig) -> Result<Self, RenderError> {
        if let Err(e) = config.validate_projection() {
            tracing::error!("{e}");
            return Err(e.into());
        }
        let program = build_program(ctx, &SOLID_SHADERS)?;

        let mut solids = Vec::with_capacity(config.solids.len());
        for instance in config.instances()? {
            let geometry = upload_mesh(ctx, &program, &instance.mesh)?;
            tracing::debug!(
                "uploaded {} ({} vertices, {} indices) at {}",
                instance.name,
                instance.mesh.vertex_count(),
                instance.mesh.indices.len(),
                instance.offset
            );
            solids.push(SolidDraw { instance, geometry });
        }

        tracing::info!("scene ready with {} solids", solids.len());

        Ok(Self {
            program,
            solids,
            projection: config.projection,
            clear_color: config.clear_color,
        })
    }

    pub fn solids(&self) -> impl Iterator<Item = &SolidInstance> {
        self.solids.iter().map(|solid| &solid.instance)
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Model-view-projection matrix of every solid, in draw order.
    pub fn transforms(&self, aspect: f32, time: f32) -> Vec<Mat4> {
        let projection = self.projection.matrix(aspect);
        self.solids
            .iter()
            .map(|solid| model_view_projection(projection, solid.instance.offset, time))
            .collect()
    }

    /// Build the frame for a `width` x `height` surface at `time` seconds.
    pub fn frame(&self, width: u32, height: u32, time: f32) -> Frame<'_, C::Geometry> {
        let transforms = self.transforms(aspect_ratio(width, height), time);
        let draws = self
            .solids
            .iter()
            .zip(transforms)
            .map(|(solid, transform)| DrawCall {
                geometry: &solid.geometry,
                transform,
                primitive: Primitive::Indexed {
                    index_count: solid.instance.mesh.indices.len() as u32,
                },
            })
            .collect();

        Frame {
            clear_color: self.clear_color,
            viewport: Viewport::full(width, height),
            draws,
        }
    }
}

impl<C: GraphicsContext> Renderer<C> for SceneRenderer<C> {
    fn render(&self, ctx: &mut C, time: f32) {
        let (width, height) = ctx.surface_size();
        let frame = self.frame(width, height, time);
        ctx.submit(&self.program.handle, &frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::recording::RecordingContext;
    use glam::Vec3;
    use solids_geometry::SolidShape;

    fn setup(ctx: &mut RecordingContext) -> SceneRenderer<RecordingContext> {
        SceneRenderer::setup(ctx, &SceneConfig::default()).unwrap()
    }

    #[test]
    fn setup_uploads_each_solid_once() {
        let mut ctx = RecordingContext::new(800, 600);
        let scene = setup(&mut ctx);
        assert_eq!(ctx.geometry_count(), 3);
        let names: Vec<&str> = scene.solids().map(|s| s.name).collect();
        assert_eq!(names, vec!["cube", "cylinder", "cone"]);
        let uploaded: Vec<(usize, usize)> = scene
            .solids
            .iter()
            .map(|s| (s.geometry.vertex_count, s.geometry.index_count))
            .collect();
        assert_eq!(uploaded, vec![(24, 36), (68, 384), (35, 189)]);
        assert_eq!(scene.projection(), Projection::default());

        scene.render(&mut ctx, 0.0);
        scene.render(&mut ctx, 0.5);
        assert_eq!(ctx.geometry_count(), 3);
    }

    #[test]
    fn frame_draws_full_index_counts_in_order() {
        let mut ctx = RecordingContext::new(800, 600);
        let scene = setup(&mut ctx);
        scene.render(&mut ctx, 1.0);

        let frame = &ctx.frames()[0];
        let counts: Vec<Primitive> = frame.draws.iter().map(|d| d.primitive).collect();
        assert_eq!(
            counts,
            vec![
                Primitive::Indexed { index_count: 36 },
                Primitive::Indexed { index_count: 384 },
                Primitive::Indexed { index_count: 189 },
            ]
        );
        assert_eq!(frame.viewport, Viewport::full(800, 600));
        assert_eq!(frame.label, "solids");
    }

    #[test]
    fn cube_mvp_matches_composition() {
        let mut ctx = RecordingContext::new(1280, 720);
        let scene = setup(&mut ctx);
        let t = 3.75_f32;
        scene.render(&mut ctx, t);

        let aspect = 1280.0 / 720.0;
        let expected = Mat4::perspective_rh(45.0_f32.to_radians(), aspect, 0.1, 100.0)
            * Mat4::from_translation(Vec3::new(-3.0, 0.0, -7.0))
            * Mat4::from_rotation_x(t)
            * Mat4::from_rotation_y(t);
        let cube = ctx.frames()[0].draws[0].transform;
        assert!(cube.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn aspect_follows_surface_size() {
        let mut ctx = RecordingContext::new(800, 800);
        let scene = setup(&mut ctx);
        scene.render(&mut ctx, 0.0);
        ctx.resize(1600, 800);
        scene.render(&mut ctx, 0.0);

        let frames = ctx.frames();
        assert_ne!(frames[0].draws[0].transform, frames[1].draws[0].transform);
        assert_eq!(frames[1].viewport.width, 1600);
    }

    #[test]
    fn solids_share_time_but_not_offset() {
        let mut ctx = RecordingContext::new(800, 600);
        let scene = setup(&mut ctx);
        let transforms = scene.transforms(4.0 / 3.0, 2.0);
        assert_eq!(transforms.len(), 3);
        assert_ne!(transforms[0], transforms[1]);
        assert_ne!(transforms[1], transforms[2]);
    }

    #[test]
    fn invalid_solid_aborts_setup() {
        let mut ctx = RecordingContext::new(800, 600);
        let mut config = SceneConfig::default();
        config.solids[2].shape = SolidShape::Cone {
            radius: 1.0,
            height: 1.0,
            radial_segments: 1,
        };
        let result = SceneRenderer::setup(&mut ctx, &config);
        assert!(matches!(result, Err(RenderError::Geometry(_))));
    }

    #[test]
    fn invalid_projection_aborts_setup() {
        let mut ctx = RecordingContext::new(800, 600);
        let mut config = SceneConfig::default();
        config.projection.near = 0.0;
        config.projection.far = -5.0;
        let result = SceneRenderer::setup(&mut ctx, &config);
        assert!(matches!(
            result,
            Err(RenderError::Config(ConfigError::InvalidProjection(_)))
        ));
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.geometry_count(), 0);
    }

    #[test]
    fn link_failure_aborts_setup() {
        let mut ctx = RecordingContext::new(800, 600);
        ctx.fail_next_link("boom");
        let result = SceneRenderer::setup(&mut ctx, &SceneConfig::default());
        assert!(matches!(result, Err(RenderError::ProgramLinkFailed(_))));
        assert_eq!(ctx.geometry_count(), 0);
    }
}
