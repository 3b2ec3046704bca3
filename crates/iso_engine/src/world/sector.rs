//! Fixed-size spatial cells

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{EffectMap, EntityId, EntityRef, PhysicsBody, TileEffects};
use crate::events::SubscriptionId;
use crate::foundation::collections::ProcessList;
use crate::foundation::math::{Rect2, Rect2I, Vec2, Vec2i, Vec3, AABB};

/// Integer coordinate of a sector (in sectors, not tiles)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectorCoordinate {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl SectorCoordinate {
    /// Create a coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Sector holding the tile `tile`
    pub fn containing_tile(tile: Vec2i, dimension: i32) -> Self {
        Self::new(tile.x.div_euclid(dimension), tile.y.div_euclid(dimension))
    }

    /// Sector holding the world location `location`
    ///
    /// Floors onto the tile grid first so that integer and floating inputs
    /// agree on which sector a point belongs to.
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(location: Vec2, dimension: i32) -> Self {
        let tile = Vec2i::new(location.x.floor() as i32, location.y.floor() as i32);
        Self::containing_tile(tile, dimension)
    }

    /// Tiles covered by the sector
    pub fn tile_bounds(self, dimension: i32) -> Rect2I {
        Rect2I::new(self.x * dimension, self.y * dimension, dimension, dimension)
    }

    /// Whether `tile` falls inside this sector
    pub fn contains_tile(self, tile: Vec2i, dimension: i32) -> bool {
        Self::containing_tile(tile, dimension) == self
    }
}

/// One cell of the world partition
///
/// Owns the entities whose footprint overlaps the cell, split by mobility,
/// and the effect maps derived from them. The static map is only rebuilt on
/// [`EntitySector::update`] after static membership changed, the dynamic
/// map on every update.
pub struct EntitySector {
    coordinate: SectorCoordinate,
    dimension: i32,
    static_entities: ProcessList<EntityId, EntityRef>,
    dynamic_entities: ProcessList<EntityId, EntityRef>,
    static_effects: EffectMap,
    dynamic_effects: EffectMap,
    dirty: bool,
    sensor: Option<(Arc<dyn PhysicsBody>, SubscriptionId)>,
}

impl EntitySector {
    /// Create an empty sector
    pub fn new(coordinate: SectorCoordinate, dimension: i32) -> Self {
        Self {
            coordinate,
            dimension,
            static_entities: ProcessList::new(),
            dynamic_entities: ProcessList::new(),
            static_effects: EffectMap::new(),
            dynamic_effects: EffectMap::new(),
            dirty: false,
            sensor: None,
        }
    }

    /// Coordinate of the sector
    pub fn coordinate(&self) -> SectorCoordinate {
        self.coordinate
    }

    /// World-space box covered by the sector, `dimension` tall
    #[allow(clippy::cast_precision_loss)]
    pub fn region(&self) -> AABB {
        let bounds = self.coordinate.tile_bounds(self.dimension).to_rect2();
        AABB::new(
            Vec3::new(bounds.x, bounds.y, 0.0),
            Vec3::new(bounds.x + bounds.width, bounds.y + bounds.height, self.dimension as f32),
        )
    }

    /// Add `entity`; returns false if it was already a member
    pub fn add_entity(&mut self, entity: &EntityRef) -> bool {
        let id = entity.id();
        if self.contains(id) {
            return false;
        }

        if entity.is_static() {
            self.static_entities.insert(id, Arc::clone(entity));
            self.dirty = true;
        } else {
            self.dynamic_entities.insert(id, Arc::clone(entity));
        }
        true
    }

    /// Remove the entity `id`; returns false if it was not a member
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        if self.static_entities.remove(id).is_some() {
            self.dirty = true;
            return true;
        }
        self.dynamic_entities.remove(id).is_some()
    }

    /// Whether `id` is a member
    pub fn contains(&self, id: EntityId) -> bool {
        self.static_entities.contains(id) || self.dynamic_entities.contains(id)
    }

    /// Whether the static effect map is waiting for a rebuild
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the dynamic effect map, and the static one if membership changed
    pub fn update(&mut self, delta_time: f32) {
        self.dynamic_effects.clear();
        for entity in self.dynamic_entities.values() {
            blend_effect_map(&mut self.dynamic_effects, entity);
        }

        if self.dirty {
            self.static_effects.clear();
            for entity in self.static_entities.values() {
                blend_effect_map(&mut self.static_effects, entity);
            }
            self.dirty = false;
            log::trace!(
                "Sector {:?} rebuilt static effects ({} tiles, dt {delta_time:.3})",
                self.coordinate,
                self.static_effects.len()
            );
        }
    }

    /// Static and dynamic effects at `location` overlaid
    pub fn tile_effects(&self, location: Vec2i) -> TileEffects {
        self.static_effects
            .get(location)
            .overlay(&self.dynamic_effects.get(location))
    }

    /// Effect map built from the static members
    pub fn static_effects(&self) -> &EffectMap {
        &self.static_effects
    }

    /// Effect map built from the dynamic members
    pub fn dynamic_effects(&self) -> &EffectMap {
        &self.dynamic_effects
    }

    /// Add every member whose model, placed at its location, intersects `region`
    pub fn enqueue_render_candidates(
        &self,
        candidates: &mut BTreeMap<EntityId, EntityRef>,
        region: &Rect2,
    ) {
        for entity in self.static_entities.values().chain(self.dynamic_entities.values()) {
            let footprint = entity.model().aabb().xy().translated(entity.location().xy());
            if region.intersects(&footprint) {
                candidates
                    .entry(entity.id())
                    .or_insert_with(|| Arc::clone(entity));
            }
        }
    }

    /// Every member, dynamic first
    pub fn entities(&self) -> Vec<EntityRef> {
        let mut all = self.dynamic_entities.snapshot();
        all.extend(self.static_entities.snapshot());
        all
    }

    /// Ids of every member, dynamic first
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.dynamic_entities
            .keys()
            .chain(self.static_entities.keys())
            .collect()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.static_entities.len() + self.dynamic_entities.len()
    }

    /// Whether the sector has no members
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Region sensor attached to the sector, if any
    pub fn sensor(&self) -> Option<&Arc<dyn PhysicsBody>> {
        self.sensor.as_ref().map(|(body, _)| body)
    }

    pub(crate) fn attach_sensor(
        &mut self,
        body: Arc<dyn PhysicsBody>,
        subscription: SubscriptionId,
    ) {
        self.sensor = Some((body, subscription));
    }

    pub(crate) fn take_sensor(&mut self) -> Option<(Arc<dyn PhysicsBody>, SubscriptionId)> {
        self.sensor.take()
    }
}

impl std::fmt::Debug for EntitySector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySector")
            .field("coordinate", &self.coordinate)
            .field("static", &self.static_entities.len())
            .field("dynamic", &self.dynamic_entities.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// Stamp the entity's collidable footprint onto `map`
///
/// Covers `ceil(width)` by `ceil(height)` tiles starting at the floored
/// minimum corner. Bodies without area or collision contribute nothing.
#[allow(clippy::cast_possible_truncation)]
fn blend_effect_map(map: &mut EffectMap, entity: &EntityRef) {
    let body = entity.body();
    let bounds = body.aabb().xy();
    if !body.is_collidable() || !bounds.has_area(0.0) {
        return;
    }

    let x = bounds.x.floor() as i32;
    let y = bounds.y.floor() as i32;
    let right = x + bounds.width.ceil() as i32;
    let bottom = y + bounds.height.ceil() as i32;
    let effects = TileEffects::from_entity(Arc::clone(entity));

    for cx in x..right {
        for cy in y..bottom {
            map.apply_overlay(Vec2i::new(cx, cy), &effects);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEntity;

    fn wall(id: u64, x: f32, y: f32) -> EntityRef {
        TestEntity::builder(id)
            .location(Vec3::new(x, y, 0.0))
            .size(Vec3::new(1.0, 1.0, 1.0))
            .collidable(true)
            .static_entity(true)
            .build()
    }

    #[test]
    fn test_sector_coordinate_floor_division() {
        let tile = |x, y| SectorCoordinate::containing_tile(Vec2i::new(x, y), 60);

        assert_eq!(tile(59, 0), SectorCoordinate::new(0, 0));
        assert_eq!(tile(60, -1), SectorCoordinate::new(1, -1));
        assert_eq!(
            SectorCoordinate::containing(Vec2::new(-0.5, 119.9), 60),
            SectorCoordinate::new(-1, 1)
        );
        assert!(SectorCoordinate::new(1, 1).contains_tile(Vec2i::new(60, 119), 60));
    }

    #[test]
    fn test_add_is_idempotent_and_routes_by_mobility() {
        let mut sector = EntitySector::new(SectorCoordinate::new(0, 0), 60);
        let moving: EntityRef = TestEntity::builder(2).build();

        assert!(sector.add_entity(&wall(1, 0.0, 0.0)));
        assert!(!sector.add_entity(&wall(1, 0.0, 0.0)));
        assert!(sector.is_dirty());
        assert!(sector.add_entity(&moving));
        assert_eq!(sector.len(), 2);
        assert_eq!(sector.entity_ids(), vec![EntityId::new(2), EntityId::new(1)]);
    }

    #[test]
    fn test_remove_dynamic_keeps_clean() {
        let mut sector = EntitySector::new(SectorCoordinate::new(0, 0), 60);
        let moving: EntityRef = TestEntity::builder(2).build();
        sector.add_entity(&moving);
        sector.update(0.016);

        assert!(sector.remove_entity(EntityId::new(2)));
        assert!(!sector.remove_entity(EntityId::new(2)));
        assert!(!sector.is_dirty());
    }

    #[test]
    fn test_dirty_rebuild_matches_fresh_build() {
        let mut sector = EntitySector::new(SectorCoordinate::new(0, 0), 60);
        sector.add_entity(&wall(1, 0.0, 0.0));
        sector.add_entity(&wall(2, 1.0, 0.0));
        sector.update(0.016);
        sector.add_entity(&wall(3, 2.0, 0.0));
        sector.remove_entity(EntityId::new(1));
        assert!(sector.is_dirty());
        sector.update(0.016);
        assert!(!sector.is_dirty());

        let mut fresh = EntitySector::new(SectorCoordinate::new(0, 0), 60);
        fresh.add_entity(&wall(2, 1.0, 0.0));
        fresh.add_entity(&wall(3, 2.0, 0.0));
        fresh.update(0.016);

        assert_eq!(sector.static_effects(), fresh.static_effects());
        assert!(sector.tile_effects(Vec2i::new(0, 0)).is_empty());
        assert!(sector.tile_effects(Vec2i::new(2, 0)).contains(EntityId::new(3)));
    }

    #[test]
    fn test_dynamic_effects_follow_movement() {
        let mut sector = EntitySector::new(SectorCoordinate::new(0, 0), 60);
        let walker = TestEntity::builder(5).collidable(true).build();
        let entity: EntityRef = walker.clone();
        sector.add_entity(&entity);
        sector.update(0.016);
        assert!(sector.tile_effects(Vec2i::new(0, 0)).contains(EntityId::new(5)));

        walker.set_location(Vec3::new(4.0, 4.0, 0.0));
        sector.update(0.016);

        assert!(sector.tile_effects(Vec2i::new(0, 0)).is_empty());
        assert!(sector.tile_effects(Vec2i::new(4, 4)).contains(EntityId::new(5)));
    }

    #[test]
    fn test_non_collidable_bodies_leave_no_effects() {
        let mut sector = EntitySector::new(SectorCoordinate::new(0, 0), 60);
        let ghost: EntityRef = TestEntity::builder(1).static_entity(true).build();
        sector.add_entity(&ghost);
        sector.update(0.016);

        assert!(sector.static_effects().is_empty());
    }

    #[test]
    fn test_render_candidates_use_model_bounds() {
        let mut sector = EntitySector::new(SectorCoordinate::new(0, 0), 60);
        sector.add_entity(&wall(1, 10.0, 10.0));
        sector.add_entity(&wall(2, 40.0, 40.0));

        let mut candidates = BTreeMap::new();
        sector.enqueue_render_candidates(&mut candidates, &Rect2::new(0.0, 0.0, 20.0, 20.0));

        assert_eq!(candidates.keys().copied().collect::<Vec<_>>(), vec![EntityId::new(1)]);
    }
}
