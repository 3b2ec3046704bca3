//! Physics collaborator interfaces
//!
//! The scene graph never simulates anything itself. It reads positions and
//! bounds from bodies, listens to their notifications and, when a physics
//! world is available, asks it for passive sensors covering each sector.

use std::sync::Arc;

use super::EntityId;
use crate::events::{BodyEvent, Observers};
use crate::foundation::math::{Vec3, AABB};

/// Read-only view of a body owned by the physics layer
pub trait PhysicsBody: Send + Sync {
    /// Entity this body belongs to, if any
    fn owner(&self) -> Option<EntityId>;

    /// Current location in world space
    fn location(&self) -> Vec3;

    /// Current bounds in world space
    fn aabb(&self) -> AABB;

    /// Whether the body takes part in collisions at all
    fn is_collidable(&self) -> bool;

    /// Whether this body blocks `other`
    fn collides_with(&self, other: &dyn PhysicsBody) -> bool;

    /// Location, direction and contact notifications
    fn observers(&self) -> &Observers<BodyEvent>;
}

/// Factory for bodies that live in the physics layer
pub trait PhysicsWorld: Send + Sync {
    /// Create a passive, non-colliding sensor covering `bounds`
    ///
    /// The sensor raises [`BodyEvent::BeginContact`] and
    /// [`BodyEvent::EndContact`] for the bodies crossing its bounds.
    fn create_region_sensor(&self, bounds: AABB) -> Arc<dyn PhysicsBody>;

    /// Release a body created by this world
    fn destroy_body(&self, _body: &Arc<dyn PhysicsBody>) {}
}
