//! Electric Field Line Visualisation
//!
//! Loads a scene, traces its field lines (or vector glyphs), packs them into
//! GPU-ready buffers and reports what a renderer would be handed. Usage:
//!
//! ```text
//! fieldlines [scene.json]
//! ```

use field_physics::{Mutation, VectorField};
use field_renderer::{
    CameraEvent, FrameScheduler, IndexedVertexBuffer, LineVertex, MeshRegistry, OrbitCamera,
    RenderableShellGeometry,
};
use field_scene::{BindTarget, Scene, SceneConfig, SceneError, SceneKind, SceneRegistry};
use field_tracing::{FieldLineSet, FieldLineTracer, TraceEnd, TracerParams, VectorFieldTracer};
use glam::{DVec3, Vec2};
use std::process::ExitCode;

const DEMO_SCENE: &str = include_str!("../scenes/dipole.json");
const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;
const LINE_WIDTH_PX: f32 = 1.5;
const FLUX_RESOLUTION: usize = 64;

fn load_scene() -> Result<Scene, SceneError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(path)?,
        None => {
            log::info!("No scene given, using the built-in dipole");
            SceneConfig::from_json(DEMO_SCENE)?
        }
    };
    let (scene, skipped) = config.build_lenient()?;
    if !skipped.is_empty() {
        log::warn!("{} element(s) skipped", skipped.len());
    }
    Ok(scene)
}

/// Per-session state: everything one visualisation needs between frames.
struct Session {
    tracer: FieldLineTracer,
    lines: FieldLineSet,
    line_buffer: IndexedVertexBuffer<LineVertex>,
    vectors: VectorFieldTracer,
    meshes: MeshRegistry,
    camera: OrbitCamera,
    scheduler: FrameScheduler,
}

impl Session {
    fn new() -> Self {
        Self {
            tracer: FieldLineTracer::new(TracerParams::default()),
            lines: FieldLineSet::new(),
            line_buffer: IndexedVertexBuffer::default(),
            vectors: VectorFieldTracer::default(),
            meshes: MeshRegistry::default(),
            camera: OrbitCamera::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            scheduler: FrameScheduler::new(),
        }
    }

    /// Retrace the scene and repack every buffer.
    fn retrace(&mut self, scene: &Scene) {
        let seeds = scene.seeds(0.0);
        match scene.kind {
            SceneKind::ElectricField => {
                self.tracer.generate_all(scene.field(), &seeds, &mut self.lines);
                let allocation = self
                    .lines
                    .write_geometry(&mut self.line_buffer, self.tracer.params.arrow_size);

                let count = |end: TraceEnd| self.lines.iter().filter(|l| l.end() == end).count();
                log::info!(
                    "{} field lines: {} reached a sink, {} hit the point budget, {} in zero field, {} non-finite",
                    self.lines.len(),
                    count(TraceEnd::Stopped),
                    count(TraceEnd::PointBudget),
                    count(TraceEnd::NoField),
                    count(TraceEnd::NonFinite)
                );
                log::info!(
                    "Line buffer: {} vertices, {} indices ({:?})",
                    self.line_buffer.vertex_count(),
                    self.line_buffer.index_count(),
                    allocation
                );
            }
            SceneKind::SimpleVectorField => {
                let buffer = self.vectors.generate_field(scene.field(), &seeds);
                log::info!(
                    "Vector glyphs: {} vertices, {} indices for {} start points",
                    buffer.vertex_count(),
                    buffer.index_count(),
                    seeds.len()
                );
            }
        }
    }

    fn report_shapes(&mut self, scene: &Scene) {
        let shapes = scene
            .charges
            .distributions()
            .iter()
            .map(|d| (d.shape_kind(), d.model_matrix()))
            .chain(scene.surfaces.iter().map(|s| (s.shape_kind(), s.model_matrix())));
        for (kind, model) in shapes {
            let mesh = self.meshes.get(kind);
            log::debug!(
                "{kind:?}: {} vertices, origin at {:?}",
                mesh.vertices.len(),
                model.w_axis.truncate()
            );
        }

        for surface in &scene.surfaces {
            let flux = surface.flux(&scene.charges, FLUX_RESOLUTION);
            log::info!(
                "Gaussian surface {}: flux {:.4} (encloses {:.4} by Gauss's law)",
                surface.name().unwrap_or("<unnamed>"),
                flux,
                flux / (4.0 * std::f64::consts::PI)
            );
        }
    }

    /// Draw if a frame is owed.
    fn frame(&mut self, scene: &Scene) {
        let Some(request) = self.scheduler.begin_frame() else {
            return;
        };
        if request.retrace {
            self.retrace(scene);
        }
        let uniform = self.camera.to_uniform(
            Vec2::new(WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32),
            LINE_WIDTH_PX * scene.scale as f32,
        );
        log::debug!(
            "Frame {}: {} input event(s), {} bytes of camera uniform",
            self.scheduler.frames(),
            request.events,
            std::mem::size_of_val(&uniform)
        );
    }
}

fn run() -> Result<(), SceneError> {
    let scene = load_scene()?;
    let mut registry = SceneRegistry::new();
    let (key, _) = registry.register(scene);
    let Some(scene) = registry.get_mut(&key) else {
        return Ok(());
    };

    log::info!(
        "Scene '{key}': {} charges, {} distributions, {} Gaussian surfaces, total charge {:.3}",
        scene.charges.charges().len(),
        scene.charges.distributions().len(),
        scene.surfaces.len(),
        scene.charges.total_charge()
    );
    log::info!("Field at origin: {:?}", scene.field().field(DVec3::ZERO));

    let mut session = Session::new();
    session.report_shapes(scene);
    session.scheduler.request_retrace();
    session.frame(scene);

    // A burst of drag and wheel input folds into one redraw
    for step in 0..10 {
        let dx = 0.02 * step as f32;
        session
            .scheduler
            .handle(&mut session.camera, CameraEvent::Rotate { dx, dy: 0.01 });
    }
    session
        .scheduler
        .handle(&mut session.camera, CameraEvent::Zoom(-4.0));
    session.frame(scene);

    // A bound control moves its charge: retrace into the same buffers
    let bound = scene.bindings.first().map(|b| b.target);
    if let Some(BindTarget::Charge(index)) = bound {
        let position = scene.charges.charges()[index].position() + DVec3::Y * 0.5;
        match scene.charges.apply(Mutation::MoveCharge { index, position }) {
            Ok(changes) => {
                log::info!("Moved charge {index}: {changes:?}");
                scene.charges.take_changes();
                session.scheduler.request_retrace();
                session.frame(scene);
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    log::info!("Rendered {} frame(s)", session.scheduler.frames());
    Ok(())
}

fn main() -> ExitCode {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting field line visualisation...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
