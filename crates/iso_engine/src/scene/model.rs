//! Visual model interfaces

use std::sync::Arc;

use super::{Projection, RenderTarget};
use crate::foundation::math::{Vec3, AABB};

/// Visual representation of an entity
pub trait SceneModel: Send + Sync {
    /// Components to draw this frame under `projection`
    fn components(&self, projection: &Projection) -> Vec<Arc<dyn ModelComponent>>;

    /// Model bounds relative to the entity location
    fn aabb(&self) -> AABB;
}

/// One independently sorted piece of a model
pub trait ModelComponent: Send + Sync {
    /// Name used for diagnostics
    fn name(&self) -> &str;

    /// Draw at screen position `(x, y)`
    fn render(&self, target: &mut dyn RenderTarget, x: i32, y: i32, scale: f32);

    /// Whether the point `(x, y)`, relative to the component's screen anchor, hits it
    fn test_pick(&self, x: i32, y: i32, scale: f32) -> bool;

    /// Bounds relative to the entity location
    fn bounds(&self) -> AABB;

    /// Anchor relative to the entity location
    fn origin(&self) -> Vec3 {
        Vec3::zeros()
    }
}

/// Model without components, for entities that are never drawn
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyModel;

impl SceneModel for EmptyModel {
    fn components(&self, _projection: &Projection) -> Vec<Arc<dyn ModelComponent>> {
        Vec::new()
    }

    fn aabb(&self) -> AABB {
        AABB::from_size(Vec3::zeros())
    }
}
