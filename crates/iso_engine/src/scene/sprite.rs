//! Named-sprite models
//!
//! The simplest model there is: every component draws one sprite by name at
//! its anchor and is hit wherever its projected box is.

use std::sync::Arc;

use super::{ModelComponent, Projection, RenderTarget, SceneModel};
use crate::foundation::math::{Rect2, Vec2, Vec3, AABB};

/// Description of one sprite of a [`SpriteModel`]
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSpec {
    /// Sprite name handed to the render target
    pub name: String,
    /// Bounds relative to the entity location
    pub bounds: AABB,
    /// Anchor relative to the entity location
    pub origin: Vec3,
}

impl SpriteSpec {
    /// Sprite anchored at the entity location
    pub fn new(name: impl Into<String>, bounds: AABB) -> Self {
        Self {
            name: name.into(),
            bounds,
            origin: Vec3::zeros(),
        }
    }

    /// Move the anchor
    #[must_use]
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }
}

/// Model made of named sprites
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteModel {
    sprites: Vec<SpriteSpec>,
}

impl SpriteModel {
    /// Model with the given sprites, drawn as separate components
    pub fn new(sprites: Vec<SpriteSpec>) -> Self {
        Self { sprites }
    }

    /// Model with one sprite covering `bounds`
    pub fn single(name: impl Into<String>, bounds: AABB) -> Self {
        Self::new(vec![SpriteSpec::new(name, bounds)])
    }

    /// Sprites of the model
    pub fn sprites(&self) -> &[SpriteSpec] {
        &self.sprites
    }
}

impl SceneModel for SpriteModel {
    fn components(&self, projection: &Projection) -> Vec<Arc<dyn ModelComponent>> {
        self.sprites
            .iter()
            .map(|sprite| {
                let anchor = projection.project(sprite.origin).xy();
                let footprint = projection
                    .project_aabb(&sprite.bounds)
                    .translated(-anchor);
                Arc::new(SpriteComponent {
                    spec: sprite.clone(),
                    footprint,
                }) as Arc<dyn ModelComponent>
            })
            .collect()
    }

    fn aabb(&self) -> AABB {
        let mut sprites = self.sprites.iter();
        let Some(first) = sprites.next() else {
            return AABB::from_size(Vec3::zeros());
        };
        sprites.fold(first.bounds, |acc, sprite| {
            AABB::new(acc.min.inf(&sprite.bounds.min), acc.max.sup(&sprite.bounds.max))
        })
    }
}

/// Component drawing a single sprite
#[derive(Debug, Clone)]
pub struct SpriteComponent {
    spec: SpriteSpec,
    footprint: Rect2,
}

impl SpriteComponent {
    /// Screen box relative to the anchor at unit scale
    pub fn footprint(&self) -> &Rect2 {
        &self.footprint
    }
}

impl ModelComponent for SpriteComponent {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn render(&self, target: &mut dyn RenderTarget, x: i32, y: i32, scale: f32) {
        target.draw_sprite(&self.spec.name, x, y, scale);
    }

    #[allow(clippy::cast_precision_loss)]
    fn test_pick(&self, x: i32, y: i32, scale: f32) -> bool {
        self.footprint
            .scaled(scale)
            .contains(Vec2::new(x as f32, y as f32))
    }

    fn bounds(&self) -> AABB {
        self.spec.bounds
    }

    fn origin(&self) -> Vec3 {
        self.spec.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_is_relative_to_anchor() {
        let projection = Projection::isometric(64.0, 32.0).unwrap();
        let model = SpriteModel::single("crate", AABB::from_size(Vec3::new(1.0, 1.0, 1.0)));

        let components = model.components(&projection);

        assert_eq!(components.len(), 1);
        assert!(components[0].test_pick(0, 0, 1.0));
        assert!(components[0].test_pick(31, 0, 1.0));
        assert!(!components[0].test_pick(40, 0, 1.0));
        assert!(components[0].test_pick(40, 0, 2.0));
    }

    #[test]
    fn test_aabb_encloses_all_sprites() {
        let model = SpriteModel::new(vec![
            SpriteSpec::new("base", AABB::from_size(Vec3::new(1.0, 1.0, 1.0))),
            SpriteSpec::new("roof", AABB::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(2.0, 1.0, 2.0))),
        ]);

        let aabb = model.aabb();
        assert_eq!(aabb.min, Vec3::zeros());
        assert_eq!(aabb.max, Vec3::new(2.0, 1.0, 2.0));
    }
}
