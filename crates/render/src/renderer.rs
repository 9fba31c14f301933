use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;
use crate::context::GraphicsContext;
use crate::error::RenderError;
use crate::scene::SceneRenderer;
use crate::triangle::TriangleRenderer;

/// Renderer-agnostic interface. Every demo implements this trait.
///
/// A renderer owns its program and geometry; the context is passed in on
/// every call so no GPU state is hidden in globals.
pub trait Renderer<C: GraphicsContext> {
    /// Render one frame at `time` seconds since the host clock's origin.
    fn render(&self, ctx: &mut C, time: f32);
}

/// Which demo to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoKind {
    /// Rotating cube, cylinder and cone.
    #[default]
    Scene,
    /// Static hello triangle.
    Triangle,
}

/// One of the demos, set up against a context.
pub enum Demo<C: GraphicsContext> {
    Scene(SceneRenderer<C>),
    Triangle(TriangleRenderer<C>),
}

impl<C: GraphicsContext> Demo<C> {
    pub fn setup(ctx: &mut C, kind: DemoKind, config: &SceneConfig) -> Result<Self, RenderError> {
        match kind {
            DemoKind::Scene => SceneRenderer::setup(ctx, config).map(Demo::Scene),
            DemoKind::Triangle => TriangleRenderer::setup(ctx).map(Demo::Triangle),
        }
    }

    pub fn kind(&self) -> DemoKind {
        match self {
            Demo::Scene(_) => DemoKind::Scene,
            Demo::Triangle(_) => DemoKind::Triangle,
        }
    }
}

impl<C: GraphicsContext> Renderer<C> for Demo<C> {
    fn render(&self, ctx: &mut C, time: f32) {
        match self {
            Demo::Scene(scene) => scene.render(ctx, time),
            Demo::Triangle(triangle) => triangle.render(ctx, time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingContext;

    #[test]
    fn demo_setup_dispatches() {
        let mut ctx = RecordingContext::new(100, 100);
        let scene = Demo::setup(&mut ctx, DemoKind::Scene, &SceneConfig::default()).unwrap();
        let triangle = Demo::setup(&mut ctx, DemoKind::Triangle, &SceneConfig::default()).unwrap();
        assert_eq!(scene.kind(), DemoKind::Scene);
        assert_eq!(triangle.kind(), DemoKind::Triangle);

        scene.render(&mut ctx, 0.0);
        triangle.render(&mut ctx, 0.0);
        let draws: Vec<usize> = ctx.frames().iter().map(|f| f.draws.len()).collect();
        assert_eq!(draws, vec![3, 1]);
    }

    #[test]
    fn default_demo_is_scene() {
        assert_eq!(DemoKind::default(), DemoKind::Scene);
    }
}
