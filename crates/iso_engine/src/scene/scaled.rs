//! Scene buffer decorator applying a fixed zoom

use std::sync::Arc;

use super::{RenderTarget, SceneBuffer, SceneBufferEffect, SceneModel};
use crate::foundation::math::{Rect2I, Vec2, Vec2i, Vec3};
use crate::world::EntityRef;

/// Multiplies every scale argument by a fixed factor before delegating
#[derive(Debug)]
pub struct ScaledSceneBuffer<B> {
    scale: f32,
    buffer: B,
}

impl<B: SceneBuffer> ScaledSceneBuffer<B> {
    /// Wrap `buffer`
    pub fn new(scale: f32, buffer: B) -> Self {
        Self { scale, buffer }
    }

    /// Factor applied on top of every caller-supplied scale
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Wrapped buffer
    pub fn inner(&self) -> &B {
        &self.buffer
    }

    /// Wrapped buffer, mutably
    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    /// Unwrap the buffer
    pub fn into_inner(self) -> B {
        self.buffer
    }
}

impl<B: SceneBuffer> SceneBuffer for ScaledSceneBuffer<B> {
    fn add_model(&mut self, model: &dyn SceneModel, dispatcher: Option<EntityRef>, location: Vec3) {
        self.buffer.add_model(model, dispatcher, location);
    }

    fn add_effect(&mut self, effect: Arc<dyn SceneBufferEffect>) {
        self.buffer.add_effect(effect);
    }

    fn reset(&mut self) {
        self.buffer.reset();
    }

    fn translate(&mut self, offset: Vec2i) {
        self.buffer.translate(offset);
    }

    fn render(
        &mut self,
        target: &mut dyn RenderTarget,
        x: i32,
        y: i32,
        scale: f32,
        bounds: Rect2I,
    ) {
        self.buffer.render(target, x, y, scale * self.scale, bounds);
    }

    fn pick_where(
        &mut self,
        x: i32,
        y: i32,
        scale: f32,
        filter: &dyn Fn(&EntityRef) -> bool,
    ) -> Option<EntityRef> {
        self.buffer.pick_where(x, y, scale * self.scale, filter)
    }

    fn world_to_screen(&self, location: Vec3, scale: f32) -> Vec2i {
        self.buffer.world_to_screen(location, scale * self.scale)
    }

    fn screen_to_world(&self, screen: Vec3, scale: f32) -> Vec2 {
        self.buffer.screen_to_world(screen, scale * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::scene::{DrawCommand, RecordingTarget, TopologicalSceneBuffer};
    use crate::testing::TestEntity;
    use crate::world::Entity;

    #[test]
    fn test_scale_multiplies_caller_scale() {
        let config = SceneConfig {
            worker_threads: Some(1),
            ..SceneConfig::default()
        };
        let inner = TopologicalSceneBuffer::isometric(&config).unwrap();
        let mut scene = ScaledSceneBuffer::new(2.0, inner);
        let entity = TestEntity::builder(1).location(Vec3::new(1.0, 0.0, 0.0)).build();
        scene.add_model(&*entity.model(), Some(entity.clone()), entity.location());

        assert_eq!(scene.world_to_screen(Vec3::new(1.0, 0.0, 0.0), 1.0), Vec2i::new(64, 32));
        assert_eq!(scene.world_to_screen(Vec3::new(1.0, 0.0, 0.0), 0.5), Vec2i::new(32, 16));

        let mut target = RecordingTarget::new();
        scene.render(&mut target, 0, 0, 1.5, Rect2I::new(0, 0, 100, 100));
        assert!(matches!(
            target.commands()[0],
            DrawCommand::Sprite { x: 96, y: 48, scale, .. } if (scale - 3.0).abs() < f32::EPSILON
        ));
        assert!(scene.pick::<TestEntity>(64, 32, 1.0).is_some());
    }
}
