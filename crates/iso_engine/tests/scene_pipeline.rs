//! End-to-end tests: scene graph → camera → scene buffer → render target

use std::sync::Arc;

use iso_engine::prelude::*;
use iso_engine::search::{BinaryOperation, BinarySearchFilter, NotSearchFilter};

fn config() -> SceneConfig {
    let config: SceneConfig =
        toml::from_str("sector_dimension = 8\nworker_threads = 2\n").expect("valid toml");
    config.validate().expect("valid config");
    config
}

fn wall(id: u64, x: f32, y: f32) -> Arc<TestEntity> {
    TestEntity::builder(id)
        .name(format!("wall-{id}"))
        .location(Vec3::new(x, y, 0.0))
        .collidable(true)
        .static_entity(true)
        .build()
}

#[test]
fn test_walls_block_collidable_walkers_only() {
    iso_engine::foundation::logging::init_for_tests();
    let config = config();
    let physics = Arc::new(TestPhysicsWorld::new());
    let world = Arc::clone(&physics) as Arc<dyn PhysicsWorld>;
    let mut graph = SceneGraph::with_physics(&config, world);

    for (i, x) in (0..4).map(|x| x as f32).enumerate() {
        graph.add(wall(i as u64 + 1, x + 6.0, 2.0));
    }
    let hero = TestEntity::builder(10).name("hero").collidable(true).build();
    let ghost = TestEntity::builder(11).name("ghost").build();
    graph.add(hero.clone());
    graph.add(ghost.clone());
    graph.update(0.016);

    // Walls span the boundary between sectors (0, 0) and (1, 0).
    assert_eq!(graph.sectors_of(EntityId::new(2)).len(), 2);
    assert!(physics.sensors().len() >= 2);

    let blocked = graph.tile_effects(Vec2i::new(8, 2));
    assert_eq!(blocked.len(), 1);
    assert!(!blocked.is_traversable(&*hero));
    assert!(blocked.is_traversable(&*ghost));
    assert!(graph.tile_effects(Vec2i::new(8, 5)).is_traversable(&*hero));

    let region = RectangleSearchFilter::new(Rect2::new(5.0, 0.0, 6.0, 4.0));
    let tiles = graph.tile_effects_in(&region);
    assert_eq!(tiles.iter().filter(|effects| !effects.is_empty()).count(), 4);
}

#[test]
fn test_camera_frame_hides_obstructions_and_picks_topmost() {
    let config = config();
    let mut graph = SceneGraph::new(&config);
    let hero = TestEntity::builder(1).name("hero").location(Vec3::new(0.0, 0.0, -1.0)).build();
    let pillar = wall(2, 0.0, 0.0);
    graph.add(hero.clone());
    graph.add(pillar.clone());

    let mut camera = SceneCamera::new();
    camera.look_at(Vec3::new(0.5, 0.5, 0.0));
    camera.add_effect(Arc::new(HideEntityObstructionsEffect::new(hero.id(), 0.25)));

    let viewport = Rect2I::new(0, 0, 800, 600);
    let buffer = TopologicalSceneBuffer::isometric(&config).expect("buffer");
    let mut frame = camera.capture(&graph, buffer, viewport, 1.0);

    let mut target = RecordingTarget::new();
    frame.render(&mut target, 0, 0, 1.0, viewport);
    assert_eq!(target.sprite_names(), vec!["hero", "wall-2", "wall-2"]);
    assert!(target.is_balanced());

    let centre = frame.world_to_screen(Vec3::zeros(), 1.0);
    let picked = frame
        .pick::<TestEntity>(centre.x, centre.y, 1.0)
        .expect("something under the cursor");
    assert_eq!(picked.id(), pillar.id());

    let only_hero = frame.pick_where(centre.x, centre.y + 40, 1.0, &|e| e.name() == "hero");
    assert_eq!(only_hero.map(|e| e.id()), Some(hero.id()));
}

#[test]
fn test_entities_follow_their_bodies_through_updates() {
    let config = config();
    let mut graph = SceneGraph::new(&config);
    let runner = TestEntity::builder(1).velocity(Vec3::new(3.0, 0.0, 0.0)).build();
    graph.add(runner.clone());

    for _ in 0..4 {
        graph.update(1.0);
    }

    assert_eq!(runner.ticks(), 4);
    assert_eq!(runner.location(), Vec3::new(12.0, 0.0, 0.0));
    let ids: Vec<_> = graph
        .entities_in(Rect2I::new(8, 0, 7, 7))
        .all()
        .iter()
        .map(|e| e.id())
        .collect();
    assert_eq!(ids, vec![runner.id()]);
    assert!(graph.entities_in(Rect2I::new(0, 0, 7, 7)).all().is_empty());
}

#[test]
fn test_composed_filters_select_entities() {
    let config = config();
    let mut graph = SceneGraph::new(&config);
    for (id, x) in [(1, 0.0), (2, 2.0), (3, 4.0), (4, 6.0)] {
        graph.add(TestEntity::builder(id).location(Vec3::new(x, 0.0, 0.0)).build());
    }

    let wide = RadialSearchFilter::new(Vec2::new(0.0, 0.0), 5.0);
    let narrow = RadialSearchFilter::new(Vec2::new(0.0, 0.0), 1.0);
    let ring = BinarySearchFilter::new(wide, NotSearchFilter::new(narrow), BinaryOperation::And);

    let ids: Vec<u64> = graph.entities().search(&ring).iter().map(|e| e.id().raw()).collect();
    assert_eq!(ids, vec![2, 3]);
}
