//! World indexing
//!
//! Partitions the world into fixed-size sectors so that tile effect and
//! render queries only touch the entities near the region being asked about.
//!
//! ```text
//! SceneGraph
//!      ↓  (one entry per entity, re-placed on every move)
//! EntitySector  ×  every sector the entity's AABB covers
//!      ↓
//! EffectMap (static, rebuilt when dirty) + EffectMap (dynamic, rebuilt every tick)
//! ```

mod effect_map;
mod entity;
mod physics;
mod scene_graph;
mod sector;

pub use effect_map::{
    EffectMap, EffectMapView, OverlappedEffectMap, ScaledEffectMap, TileEffects,
    TranslatedEffectMap,
};
pub use entity::{Entity, EntityId, EntityRef};
pub use physics::{PhysicsBody, PhysicsWorld};
pub use scene_graph::{EntitySet, SceneGraph};
pub use sector::{EntitySector, SectorCoordinate};
