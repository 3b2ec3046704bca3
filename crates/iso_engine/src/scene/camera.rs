//! Look-at camera that fills a scene buffer from a scene graph

use std::sync::Arc;

use super::{ScaledSceneBuffer, SceneBuffer, SceneBufferEffect};
use crate::foundation::math::{Rect2, Rect2I, Vec2, Vec2i, Vec3};
use crate::world::SceneGraph;

/// Smallest zoom a camera accepts
pub const MIN_ZOOM: f32 = 1.0e-4;

/// Camera centred on a world location
pub struct SceneCamera {
    look_at: Vec3,
    zoom: f32,
    bounds: Option<Rect2>,
    effects: Vec<Arc<dyn SceneBufferEffect>>,
}

impl SceneCamera {
    /// Camera at the origin with unit zoom
    pub fn new() -> Self {
        Self {
            look_at: Vec3::zeros(),
            zoom: 1.0,
            bounds: None,
            effects: Vec::new(),
        }
    }

    /// Keep the look-at point inside `bounds` (x/y only), or lift the limit with `None`
    pub fn set_bounds(&mut self, bounds: Option<Rect2>) {
        self.bounds = bounds;
    }

    /// Centre the view on `location`
    pub fn look_at(&mut self, location: Vec3) {
        self.look_at = location;
    }

    /// Move the look-at point by `delta`
    pub fn move_by(&mut self, delta: Vec3) {
        self.look_at = self.clamp(self.look_at + delta);
    }

    /// Current look-at point, clamped to the bounds
    pub fn location(&self) -> Vec3 {
        self.clamp(self.look_at)
    }

    /// Current zoom
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom, clamped to [`MIN_ZOOM`]
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(MIN_ZOOM);
    }

    /// Add an effect to every captured buffer
    pub fn add_effect(&mut self, effect: Arc<dyn SceneBufferEffect>) {
        self.effects.push(effect);
    }

    /// Stop adding `effect`; returns false if it was not attached
    pub fn remove_effect(&mut self, effect: &Arc<dyn SceneBufferEffect>) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| !Arc::ptr_eq(e, effect));
        self.effects.len() != before
    }

    fn clamp(&self, location: Vec3) -> Vec3 {
        let Some(bounds) = self.bounds else {
            return location;
        };
        let min = bounds.min();
        let max = bounds.max();
        Vec3::new(
            location.x.clamp(min.x, max.x.max(min.x)),
            location.y.clamp(min.y, max.y.max(min.y)),
            location.z,
        )
    }

    /// Reset `buffer`, pan it so the look-at point sits at the centre of a
    /// `viewport`-sized screen and fill it with everything the view can see
    pub fn capture<B: SceneBuffer>(
        &self,
        graph: &SceneGraph,
        buffer: B,
        viewport: Rect2I,
        scale: f32,
    ) -> ScaledSceneBuffer<B> {
        let mut scene = ScaledSceneBuffer::new(scale * self.zoom, buffer);
        scene.reset();
        for effect in &self.effects {
            scene.add_effect(Arc::clone(effect));
        }

        let look_at = self.location();
        let centre = scene.world_to_screen(look_at, 1.0);
        let half = Vec2i::new(viewport.width / 2, viewport.height / 2);
        let view = Rect2I::new(
            centre.x - half.x,
            centre.y - half.y,
            viewport.width,
            viewport.height,
        );
        let region = visible_region(&scene, view, look_at.z);

        scene.translate(half - centre);
        graph.enqueue_render(&mut scene, region);
        log::trace!("Camera at {look_at:?} captured region {region:?}");
        scene
    }
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SceneCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneCamera")
            .field("look_at", &self.look_at)
            .field("zoom", &self.zoom)
            .field("bounds", &self.bounds)
            .field("effects", &self.effects.len())
            .finish()
    }
}

/// World rectangle seen through the screen rectangle `view` at height `depth`
#[allow(clippy::cast_precision_loss)]
fn visible_region(buffer: &dyn SceneBuffer, view: Rect2I, depth: f32) -> Rect2 {
    let depth_shift = buffer.screen_to_world(Vec3::new(0.0, 0.0, depth), 1.0);
    let depth_shift = Vec2::new(depth_shift.x.round(), depth_shift.y.round());
    let left = view.x as f32;
    let top = view.y as f32;
    let right = (view.x + view.width) as f32;
    let bottom = (view.y + view.height) as f32;

    Rect2::enclosing(
        [(left, top), (right, top), (left, bottom), (right, bottom)]
            .into_iter()
            .map(|(x, y)| buffer.screen_to_world(Vec3::new(x, y, depth), 1.0) - depth_shift),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::scene::{
        DrawCommand, HideEntityObstructionsEffect, RecordingTarget, TopologicalSceneBuffer,
    };
    use crate::testing::TestEntity;
    use crate::world::EntityId;

    fn config() -> SceneConfig {
        SceneConfig {
            worker_threads: Some(1),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn test_bounds_clamp_look_at() {
        let mut camera = SceneCamera::new();
        camera.set_bounds(Some(Rect2::new(0.0, 0.0, 10.0, 10.0)));
        camera.move_by(Vec3::new(20.0, -5.0, 1.0));

        assert_eq!(camera.location(), Vec3::new(10.0, 0.0, 1.0));

        camera.set_bounds(None);
        camera.look_at(Vec3::new(-3.0, 4.0, 0.0));
        assert_eq!(camera.location(), Vec3::new(-3.0, 4.0, 0.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = SceneCamera::default();
        camera.set_zoom(0.0);

        assert_eq!(camera.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_effects_can_be_removed() {
        let mut camera = SceneCamera::new();
        let effect: Arc<dyn SceneBufferEffect> =
            Arc::new(HideEntityObstructionsEffect::new(EntityId::new(1), 0.5));
        camera.add_effect(Arc::clone(&effect));

        assert!(camera.remove_effect(&effect));
        assert!(!camera.remove_effect(&effect));
    }

    #[test]
    fn test_capture_centres_look_at_point() {
        let config = config();
        let mut graph = SceneGraph::new(&config);
        graph.add(TestEntity::builder(1).name("near").build());
        graph.add(
            TestEntity::builder(2)
                .name("far")
                .location(Vec3::new(100.0, 100.0, 0.0))
                .build(),
        );

        let mut camera = SceneCamera::new();
        camera.look_at(Vec3::new(0.5, 0.5, 0.0));
        let buffer = TopologicalSceneBuffer::isometric(&config).unwrap();
        let viewport = Rect2I::new(0, 0, 640, 480);
        let mut frame = camera.capture(&graph, buffer, viewport, 1.0);

        let mut target = RecordingTarget::new();
        frame.render(&mut target, 0, 0, 1.0, viewport);

        assert_eq!(target.sprite_names(), vec!["near"]);
        assert!(matches!(
            target.commands()[0],
            DrawCommand::Sprite { x: 320, y: 224, .. }
        ));
        assert_eq!(frame.world_to_screen(Vec3::new(0.5, 0.5, 0.0), 1.0), Vec2i::new(320, 240));
    }

    #[test]
    fn test_capture_reuses_buffer_without_leftovers() {
        let config = config();
        let mut graph = SceneGraph::new(&config);
        graph.add(TestEntity::builder(1).build());

        let camera = SceneCamera::new();
        let viewport = Rect2I::new(0, 0, 320, 240);
        let buffer = TopologicalSceneBuffer::isometric(&config).unwrap();
        let first = camera.capture(&graph, buffer, viewport, 1.0);
        let second = camera.capture(&graph, first.into_inner(), viewport, 1.0);

        assert_eq!(second.inner().len(), 1);
    }
}
