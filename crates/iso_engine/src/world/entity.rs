//! Entity interface consumed by the scene graph

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::PhysicsBody;
use crate::events::{EntityEvent, Observers};
use crate::foundation::math::{Vec3, AABB};
use crate::scene::SceneModel;

/// Stable identity of an entity
///
/// Ordering is used to keep query results and render candidates deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw identifier
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that occupies space in the world and can be drawn
///
/// Implementations use interior mutability: the scene graph only ever holds
/// shared references. An implementation must not hold its own locks while
/// raising events, since observers call straight back into the entity.
pub trait Entity: Any + Send + Sync {
    /// Identity, unique within a scene graph
    fn id(&self) -> EntityId;

    /// Instance name used by name lookups
    fn name(&self) -> &str;

    /// Static entities never move; they feed the cached static effect map
    fn is_static(&self) -> bool;

    /// Physics body currently backing the entity
    fn body(&self) -> Arc<dyn PhysicsBody>;

    /// Visual model
    fn model(&self) -> Arc<dyn SceneModel>;

    /// Entity level notifications ([`EntityEvent::BodyReplaced`])
    fn observers(&self) -> &Observers<EntityEvent>;

    /// Advance the entity by `delta_time` seconds
    fn update(&self, delta_time: f32);

    /// Downcast support for typed queries
    fn as_any(&self) -> &dyn Any;

    /// Location of the body
    fn location(&self) -> Vec3 {
        self.body().location()
    }

    /// Bounds of the body in world space
    fn aabb(&self) -> AABB {
        self.body().aabb()
    }
}

/// Shared handle to an entity
pub type EntityRef = Arc<dyn Entity>;

impl fmt::Debug for dyn Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("static", &self.is_static())
            .finish()
    }
}
