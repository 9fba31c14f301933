use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use solids_geometry::SolidShape;
use solids_render::{
    AnimationLoop, Demo, DemoKind, RecordedFrame, RecordingContext, SceneConfig, SteppedClock,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solids-cli", about = "CLI tool for the solids demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Generate one solid and print its stats
    Mesh {
        #[arg(value_enum)]
        shape: ShapeArg,
        /// Segments around the axis (cylinder and cone)
        #[arg(short, long, default_value = "32")]
        segments: u32,
        /// Radius (cone, and both cylinder caps unless overridden)
        #[arg(long, default_value = "0.5")]
        radius: f32,
        /// Cylinder top cap radius
        #[arg(long)]
        radius_top: Option<f32>,
        /// Cylinder bottom cap radius
        #[arg(long)]
        radius_bottom: Option<f32>,
        /// Height along the Y axis (cylinder and cone)
        #[arg(long, default_value = "1.5")]
        height: f32,
        /// Write the mesh as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a demo headless and print the recorded draws
    Frames {
        /// Number of frames to draw
        #[arg(short, long, default_value = "3")]
        count: u64,
        /// Milliseconds between frames
        #[arg(long, default_value = "16")]
        step_ms: f64,
        #[arg(long, value_enum, default_value_t = DemoArg::Scene)]
        demo: DemoArg,
        /// Scene configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
    },
    /// Write the default scene configuration
    Config {
        #[arg(short, long, default_value = "scene.json")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Cube,
    Cylinder,
    Cone,
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

fn print_frame(index: usize, frame: &RecordedFrame) {
    println!(
        "frame {index}: program={} viewport={}x{} clear={:?}",
        frame.label, frame.viewport.width, frame.viewport.height, frame.clear_color
    );
    for draw in &frame.draws {
        println!("  geometry {} {:?}", draw.geometry, draw.primitive);
        for row in 0..4 {
            let r = draw.transform.row(row);
            println!("    [{:>9.4} {:>9.4} {:>9.4} {:>9.4}]", r.x, r.y, r.z, r.w);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("solids-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("geometry: {}", solids_geometry::crate_info());
            println!("render: {}", solids_render::crate_info());
        }
        Commands::Mesh {
            shape,
            segments,
            radius,
            radius_top,
            radius_bottom,
            height,
            output,
        } => {
            let shape = match shape {
                ShapeArg::Cube => SolidShape::Cube,
                ShapeArg::Cylinder => SolidShape::Cylinder {
                    radius_top: radius_top.unwrap_or(radius),
                    radius_bottom: radius_bottom.unwrap_or(radius),
                    height,
                    radial_segments: segments,
                },
                ShapeArg::Cone => SolidShape::Cone {
                    radius,
                    height,
                    radial_segments: segments,
                },
            };
            let mesh = shape
                .build()
                .with_context(|| format!("failed to build {}", shape.name()))?;
            println!("{}: {}", shape.name(), mesh.stats());

            if let Some(path) = output {
                mesh.save_json(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("wrote {}", path.display());
            }
        }
        Commands::Frames {
            count,
            step_ms,
            demo,
            config,
            width,
            height,
        } => {
            let config = match config {
                Some(path) => SceneConfig::load(&path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
                None => SceneConfig::default(),
            };

            let mut ctx = RecordingContext::new(width, height);
            let demo = Demo::setup(&mut ctx, demo.into(), &config)?;
            let mut animation = AnimationLoop::new(demo);
            let mut clock = SteppedClock::new(0.0, step_ms);
            let drawn = animation.run(&mut ctx, &mut clock, Some(count));
            tracing::debug!("drew {drawn} frames, t={:.3}s", animation.elapsed_secs());

            for (index, frame) in ctx.take_frames().iter().enumerate() {
                print_frame(index, frame);
            }
        }
        Commands::Config { output } => {
            SceneConfig::default()
                .save(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("wrote {}", output.display());
        }
    }

    Ok(())
}
