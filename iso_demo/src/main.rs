//! Headless isometric scene demo
//!
//! Builds a small walled courtyard with a few wanderers, ticks it, captures
//! frames through a camera that follows the first wanderer and logs the
//! resulting draw order and what sits under the screen centre.
//!
//! Usage: `iso_demo [config.toml|config.ron]`

use std::collections::BTreeSet;
use std::sync::Arc;

use iso_engine::prelude::*;
use iso_engine::scene::DrawCommand;
use nalgebra::{Rotation2, Vector2};
use thiserror::Error;

const COURTYARD: i32 = 24;
const WANDERERS: u64 = 6;
const TICKS: usize = 120;
const DELTA_TIME: f32 = 1.0 / 30.0;
const VIEWPORT: Rect2I = Rect2I { x: 0, y: 0, width: 1280, height: 720 };

/// Demo-level errors
#[derive(Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

struct DemoApp {
    config: SceneConfig,
    physics: Arc<TestPhysicsWorld>,
    graph: SceneGraph,
    camera: SceneCamera,
    buffer: Option<TopologicalSceneBuffer>,
    wanderers: Vec<Arc<TestEntity>>,
}

impl DemoApp {
    fn new(config: SceneConfig) -> Result<Self, DemoError> {
        config.validate()?;
        log::info!("Creating demo scene (sector dimension {})", config.sector_dimension);

        let physics = Arc::new(TestPhysicsWorld::new());
        let world = Arc::clone(&physics) as Arc<dyn PhysicsWorld>;
        let graph = SceneGraph::with_physics(&config, world);
        let buffer = TopologicalSceneBuffer::isometric(&config)?;

        Ok(Self {
            config,
            physics,
            graph,
            camera: SceneCamera::new(),
            buffer: Some(buffer),
            wanderers: Vec::new(),
        })
    }

    fn initialize(&mut self) {
        let mut ring = BTreeSet::new();
        for i in 0..COURTYARD {
            ring.extend([(i, 0), (i, COURTYARD - 1), (0, i), (COURTYARD - 1, i)]);
        }

        let mut next_id = 1;
        for (x, y) in ring {
            self.graph.add(
                TestEntity::builder(next_id)
                    .name("wall")
                    .location(Vec3::new(x as f32, y as f32, 0.0))
                    .collidable(true)
                    .static_entity(true)
                    .build(),
            );
            next_id += 1;
        }

        let centre = COURTYARD as f32 / 2.0;
        for i in 0..WANDERERS {
            let angle = std::f32::consts::TAU * i as f32 / WANDERERS as f32;
            let heading: Vector2<f32> = Rotation2::new(angle) * Vector2::x();
            let wanderer = TestEntity::builder(next_id + i)
                .name(format!("wanderer-{i}"))
                .location(Vec3::new(centre, centre, 0.0))
                .size(Vec3::new(0.5, 0.5, 1.5))
                .collidable(true)
                .velocity(Vec3::new(heading.x, heading.y, 0.0) * 2.0)
                .build();
            self.graph.add(wanderer.clone());
            self.wanderers.push(wanderer);
        }

        if let Some(hero) = self.wanderers.first() {
            self.camera.add_effect(Arc::new(HideEntityObstructionsEffect::new(hero.id(), 0.35)));
        }
        self.camera.set_bounds(Some(Rect2::new(0.0, 0.0, COURTYARD as f32, COURTYARD as f32)));

        log::info!(
            "Scene ready: {} entities in {} sectors, {} region sensors",
            self.graph.len(),
            self.graph.sector_count(),
            self.physics.sensors().len()
        );
    }

    fn update(&mut self, delta_time: f32) {
        for wanderer in &self.wanderers {
            let location = wanderer.location();
            let tile = Vec2i::new(location.x.floor() as i32, location.y.floor() as i32);
            if !self.graph.tile_effects(tile).is_traversable(&**wanderer) {
                log::debug!("{} is blocked at {tile:?}", wanderer.name());
            }
            // Bounce off the courtyard walls.
            if location.x < 1.0 || location.x > COURTYARD as f32 - 2.0
                || location.y < 1.0 || location.y > COURTYARD as f32 - 2.0
            {
                let centre = COURTYARD as f32 / 2.0;
                let inward = Vec3::new(centre - location.x, centre - location.y, 0.0);
                if let Some(direction) = inward.try_normalize(f32::EPSILON) {
                    wanderer.set_velocity(direction * 2.0);
                }
            }
        }

        self.graph.update(delta_time);
    }

    fn render(&mut self, frame: usize) {
        let Some(buffer) = self.buffer.take() else {
            return;
        };
        if let Some(hero) = self.wanderers.first() {
            self.camera.look_at(hero.location());
        }

        let mut scene = self.camera.capture(&self.graph, buffer, VIEWPORT, 1.0);
        let mut target = RecordingTarget::new();
        scene.render(&mut target, 0, 0, 1.0, VIEWPORT);

        let sprites = target
            .commands()
            .iter()
            .filter(|command| matches!(command, DrawCommand::Sprite { .. }))
            .count();
        let picked = scene
            .pick::<TestEntity>(VIEWPORT.width / 2, VIEWPORT.height / 2, 1.0)
            .map_or_else(|| "nothing".to_string(), |entity| entity.name().to_string());

        if frame % 30 == 0 {
            log::info!("Frame {frame}: {sprites} sprite draw(s), centre shows {picked}");
            log::debug!("Draw order: {:?}", target.sprite_names());
        }
        self.buffer = Some(scene.into_inner());
    }

    fn run(&mut self, ticks: usize) {
        log::info!("Running {ticks} tick(s) at {:.1} Hz", 1.0 / DELTA_TIME);
        for frame in 0..ticks {
            self.update(DELTA_TIME);
            self.render(frame);
        }
        log::info!(
            "Finished with {} sectors and tile size {}x{}",
            self.graph.sector_count(),
            self.config.tile_width,
            self.config.tile_height
        );
    }
}

fn load_config() -> Result<SceneConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading scene configuration from {path}");
            Ok(SceneConfig::load_from_file(&path)?)
        }
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    iso_engine::foundation::logging::init();

    log::info!("Starting isometric scene demo");
    let config = load_config()?;
    let mut app = DemoApp::new(config)?;
    app.initialize();
    app.run(TICKS);
    log::info!("Demo finished");
    Ok(())
}
