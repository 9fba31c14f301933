use anyhow::Result;
use clap::{Parser, ValueEnum};
use egui::Context as EguiContext;
use solids_render::{
    AnimationLoop, Clock, Demo, DemoKind, GraphicsContext, LoopState, SceneConfig, StopHandle,
    SystemClock,
};
use solids_render_wgpu::GpuContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "solids-desktop", about = "Rotating solids and hello triangle demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Demo to run
    #[arg(long, value_enum, default_value_t = DemoArg::Scene)]
    demo: DemoArg,

    /// Scene configuration (JSON). Defaults to the cube, cylinder and cone.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DemoArg {
    Scene,
    Triangle,
}

impl From<DemoArg> for DemoKind {
    fn from(arg: DemoArg) -> Self {
        match arg {
            DemoArg::Scene => DemoKind::Scene,
            DemoArg::Triangle => DemoKind::Triangle,
        }
    }
}

/// What the overlay shows for the current frame.
struct OverlayStats {
    demo: DemoKind,
    elapsed_secs: f32,
    frames: u64,
}

struct DesktopApp {
    demo: DemoKind,
    config: SceneConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    animation: Option<AnimationLoop<Demo<GpuContext>>>,
    clock: SystemClock,
    show_overlay: bool,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl DesktopApp {
    fn new(demo: DemoKind, config: SceneConfig) -> Self {
        Self {
            demo,
            config,
            window: None,
            gpu: None,
            animation: None,
            clock: SystemClock::new(),
            show_overlay: true,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn stop(&self) {
        if let Some(animation) = &self.animation {
            animation.stop();
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if key == KeyCode::F1 {
            self.show_overlay = !self.show_overlay;
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(gpu), Some(animation)) =
            (&self.window, &mut self.gpu, &mut self.animation)
        else {
            return;
        };

        if animation.frame(gpu, self.clock.now_ms()) == LoopState::Stopped {
            return;
        }

        if self.show_overlay {
            if let (Some(egui_winit), Some(egui_renderer)) =
                (&mut self.egui_winit, &mut self.egui_renderer)
            {
                let stats = OverlayStats {
                    demo: self.demo,
                    elapsed_secs: animation.elapsed_secs(),
                    frames: animation.frames(),
                };
                paint_overlay(
                    &self.egui_ctx,
                    egui_winit,
                    egui_renderer,
                    window,
                    gpu,
                    &stats,
                    &animation.stop_handle(),
                );
            }
        }

        gpu.present();
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let title = match self.demo {
            DemoKind::Scene => "Solids",
            DemoKind::Triangle => "Hello Triangle",
        };
        let attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let mut gpu = match GpuContext::new(window.clone(), size.width, size.height) {
            Ok(gpu) => gpu,
            Err(e) => {
                tracing::error!("{e}");
                event_loop.exit();
                return;
            }
        };

        let demo = match Demo::setup(&mut gpu, self.demo, &self.config) {
            Ok(demo) => demo,
            Err(e) => {
                tracing::error!("demo setup failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(gpu.device(), gpu.surface_format(), None, 1, false);

        self.animation = Some(AnimationLoop::new(demo));
        self.clock = SystemClock::new();
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        self.gpu = Some(gpu);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Esc stops the loop even while egui has keyboard focus.
        if let WindowEvent::KeyboardInput { event: key, .. } = &event {
            if is_stop_key(key.physical_key, key.state) {
                self.stop();
            }
        }

        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.handle_key(key),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(animation)) = (&self.window, &self.animation) else {
            return;
        };
        if animation.state() == LoopState::Stopped {
            event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            window.request_redraw();
        }
    }
}

fn is_stop_key(key: PhysicalKey, state: ElementState) -> bool {
    key == PhysicalKey::Code(KeyCode::Escape) && state == ElementState::Pressed
}

fn paint_overlay(
    egui_ctx: &EguiContext,
    egui_winit: &mut egui_winit::State,
    egui_renderer: &mut egui_wgpu::Renderer,
    window: &Window,
    gpu: &GpuContext,
    stats: &OverlayStats,
    stop: &StopHandle,
) {
    let Some(view) = gpu.frame_view() else {
        return;
    };
    let device = gpu.device();
    let queue = gpu.queue();

    let raw_input = egui_winit.take_egui_input(window);
    let full_output = egui_ctx.run(raw_input, |ctx| {
        egui::Window::new("Animation")
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Demo: {:?}", stats.demo));
                ui.label(format!("Elapsed: {:.2} s", stats.elapsed_secs));
                ui.label(format!("Frames: {}", stats.frames));
                ui.separator();
                if ui.button("Stop").clicked() {
                    stop.stop();
                }
                ui.small("Esc: stop | F1: toggle overlay");
            });
    });

    egui_winit.handle_platform_output(window, full_output.platform_output);

    let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
    let (width, height) = gpu.surface_size();
    let screen_descriptor = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [width, height],
        pixels_per_point: full_output.pixels_per_point,
    };

    for (id, image_delta) in &full_output.textures_delta.set {
        egui_renderer.update_texture(device, queue, *id, image_delta);
    }
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("egui_encoder"),
    });
    egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
    {
        let mut pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            })
            .forget_lifetime();
        egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
    }
    queue.submit(std::iter::once(encoder.finish()));
    for id in &full_output.textures_delta.free {
        egui_renderer.free_texture(id);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("solids-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(cli.demo.into(), config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_press_stops() {
        assert!(is_stop_key(
            PhysicalKey::Code(KeyCode::Escape),
            ElementState::Pressed
        ));
    }

    #[test]
    fn other_keys_and_releases_do_not_stop() {
        assert!(!is_stop_key(
            PhysicalKey::Code(KeyCode::Escape),
            ElementState::Released
        ));
        assert!(!is_stop_key(PhysicalKey::Code(KeyCode::F1), ElementState::Pressed));
    }
}
