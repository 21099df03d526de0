//! # Orbit Viewer
//!
//! Headless run of the viewer pipeline: generates a mesh on a worker thread,
//! lays it out, uploads it to an in-memory context, attaches it to a scene and
//! spins it with an orbit controller for a number of simulated frames. A ring
//! of overlay points is mapped to device space alongside.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use glam::{Vec2, Vec3};
use mesh_viewer::geometry::{Geometry, MemoryContext, SceneAttachment};
use mesh_viewer::scene::{AngleAnimation, Material, OrbitController, Scene, SharedTransform};
use mesh_viewer::worker::{CirclePoints, GenerationWorker};
use mesh_viewer::{
    CanvasOverlay, IndexFormat, LayoutPolicy, LogicalFrame, MeshData, Shape, ViewerConfig,
    ViewerResult,
};

/// Mesh choice for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum CliShape {
    /// Cube with edge length --size.
    #[default]
    Cube,
    /// UV sphere with --stacks, --slices and --radius.
    Sphere,
    /// The fallback torus (R=5, r=1, 100 rings, 20 slices).
    Torus,
    /// Subdivided octahedron with --depth and --radius.
    Geosphere,
    /// Spherical harmonic surface with --depth and --coefficients.
    Harmonic,
}

/// Orbit viewer arguments.
#[derive(Parser, Debug)]
#[command(
    name = "orbit_viewer",
    about = "Generate a mesh and spin it with an orbit controller",
    version
)]
struct Args {
    /// Mesh to generate.
    #[arg(long, default_value = "cube", value_enum)]
    shape: CliShape,

    /// Cube edge length.
    #[arg(long, default_value = "2.0")]
    size: f32,

    /// UV sphere latitude bands.
    #[arg(long, default_value = "16")]
    stacks: u32,

    /// UV sphere longitude bands.
    #[arg(long, default_value = "32")]
    slices: u32,

    /// Sphere radius.
    #[arg(long, default_value = "1.0")]
    radius: f32,

    /// Subdivision depth for geosphere and harmonic shapes.
    #[arg(long, default_value = "3")]
    depth: u32,

    /// Harmonic coefficients ((l+1)^2 values, l at most 8).
    #[arg(long, value_delimiter = ',', default_value = "0,0,0,1")]
    coefficients: Vec<f32>,

    /// Pack all attributes into one interleaved buffer.
    #[arg(long)]
    interleaved: bool,

    /// Use 16-bit indices.
    #[arg(long)]
    index16: bool,

    /// Orbit radius (0 spins the mesh in place).
    #[arg(long, default_value_t = mesh_viewer::scene::DEFAULT_ORBIT_RADIUS)]
    orbit_radius: f32,

    /// Duration of one full turn in milliseconds.
    #[arg(long, default_value = "4000")]
    duration_ms: u64,

    /// Number of simulated frames.
    #[arg(long, default_value = "60")]
    ticks: u32,

    /// Simulated frame time in milliseconds.
    #[arg(long, default_value = "16")]
    frame_ms: u64,

    /// Number of overlay points on the ring.
    #[arg(long, default_value = "12")]
    points: u32,
}

impl Args {
    fn shape(&self) -> Shape {
        match self.shape {
            CliShape::Cube => Shape::Cube { size: self.size },
            CliShape::Sphere => Shape::UvSphere {
                stacks: self.stacks,
                slices: self.slices,
                radius: self.radius,
            },
            CliShape::Torus => Shape::torus_fallback(),
            CliShape::Geosphere => Shape::Geosphere {
                depth: self.depth,
                radius: self.radius,
            },
            CliShape::Harmonic => Shape::Harmonic {
                depth: self.depth,
                coefficients: self.coefficients.clone(),
            },
        }
    }

    fn config(&self) -> ViewerResult<ViewerConfig> {
        Ok(ViewerConfig {
            animation: AngleAnimation::full_turn(Duration::from_millis(self.duration_ms))?,
            orbit_radius: self.orbit_radius,
            layout_policy: if self.interleaved {
                LayoutPolicy::Interleaved
            } else {
                LayoutPolicy::Planar
            },
            index_format: if self.index16 {
                IndexFormat::Uint16
            } else {
                IndexFormat::Uint32
            },
            ..ViewerConfig::default()
        }
        .with_shape(self.shape()))
    }
}

fn build_mesh(config: &ViewerConfig) -> ViewerResult<MeshData> {
    let mut worker: GenerationWorker<ViewerResult<MeshData>> =
        GenerationWorker::new("mesh-generation");
    worker.start_mesh(config.shape.clone())?;
    match worker.wait()? {
        Some(mesh) => mesh,
        None => {
            log::warn!("Worker produced no mesh, using the torus fallback");
            Shape::torus_fallback().generate()
        }
    }
}

fn run(args: &Args) -> ViewerResult<()> {
    let config = args.config()?;

    let mesh = build_mesh(&config)?;
    let geometry = Geometry::build(&mesh, &config.layout_builder())?;

    let mut context = MemoryContext::new();
    let uploaded = geometry.upload(&mut context)?;
    log::info!(
        "Uploaded {} buffers ({} bytes), {} indices as {:?}",
        uploaded.buffers().len(),
        context.total_bytes(),
        uploaded.index().count,
        uploaded.index().format
    );

    let mut scene = Scene::from_config(&config);
    let transform = SharedTransform::default();
    let entity = scene.attach(geometry, Material::default(), transform.clone());

    let mut controller = OrbitController::with_state(transform, 0.0, config.orbit_radius)?;

    let frame_time = Duration::from_millis(args.frame_ms);
    let mut pushes = 0;
    for tick in 0..args.ticks {
        let elapsed = frame_time * tick;
        if config.animation.drive(&mut controller, elapsed)? {
            pushes += 1;
        }
        if let Some(entity) = scene.entity(entity) {
            let origin = entity.transform.get().transform_point(Vec3::ZERO);
            log::debug!(
                "Frame {}: angle {:.2}, origin {}",
                tick,
                controller.angle(),
                origin
            );
        }
    }
    log::info!(
        "Ran {} frames, {} transform updates, final angle {:.2}",
        args.ticks,
        pushes,
        controller.angle()
    );

    let frame = LogicalFrame::new(config.device_rect())?;
    let mut points: GenerationWorker<Vec<Vec2>> = GenerationWorker::new("point-generation");
    points.start_points(CirclePoints { count: args.points }, 0.5)?;
    let mut overlay = CanvasOverlay::new();
    overlay.set_points(points.wait()?.unwrap_or_default());
    let markers = overlay.point_markers(&frame, mesh_viewer::canvas::POINT_RADIUS);
    for marker in &markers {
        log::debug!("Marker at {} radii {}", marker.center, marker.radii);
    }
    log::info!(
        "Overlay: {} grid lines, {} markers on a {}x{} canvas",
        overlay
            .grid_lines(&frame, mesh_viewer::canvas::GRID_DIVISIONS)
            .len(),
        markers.len(),
        config.width,
        config.height
    );

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting orbit viewer: {:?}", args.shape);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
