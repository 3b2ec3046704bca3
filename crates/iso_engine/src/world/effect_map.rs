//! Per-tile logical effects
//!
//! A [`TileEffects`] value is the set of entities whose collidable footprint
//! covers a tile. Values combine with [`TileEffects::overlay`] (set union),
//! which is commutative and associative, so maps can be rebuilt in any order
//! and layered freely.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use super::{Entity, EntityId, EntityRef};
use crate::foundation::math::{floor2, Vec2, Vec2i};
use crate::search::{ScaledSearchFilter, SearchFilter, TranslatedSearchFilter};

/// Entities contributing to one tile
#[derive(Clone, Default)]
pub struct TileEffects {
    contributors: BTreeMap<EntityId, EntityRef>,
}

impl TileEffects {
    /// Effects with no contributor
    pub fn new() -> Self {
        Self::default()
    }

    /// Effects contributed by a single entity
    pub fn from_entity(entity: EntityRef) -> Self {
        let mut contributors = BTreeMap::new();
        contributors.insert(entity.id(), entity);
        Self { contributors }
    }

    /// Union of both contributor sets
    #[must_use]
    pub fn overlay(&self, other: &TileEffects) -> TileEffects {
        let mut contributors = self.contributors.clone();
        for (id, entity) in &other.contributors {
            contributors.entry(*id).or_insert_with(|| Arc::clone(entity));
        }
        Self { contributors }
    }

    /// Fold every value with [`TileEffects::overlay`]
    pub fn merge<'a>(effects: impl IntoIterator<Item = &'a TileEffects>) -> TileEffects {
        effects
            .into_iter()
            .fold(TileEffects::new(), |merged, effects| merged.overlay(effects))
    }

    /// Whether `subject` may enter the tile
    ///
    /// The tile is blocked when any contributor other than the subject has a
    /// body that collides with the subject's body.
    pub fn is_traversable(&self, subject: &dyn Entity) -> bool {
        let subject_body = subject.body();
        self.contributors
            .iter()
            .filter(|(id, _)| **id != subject.id())
            .all(|(_, entity)| !entity.body().collides_with(subject_body.as_ref()))
    }

    /// Contributing entities ordered by id
    pub fn contributors(&self) -> impl Iterator<Item = &EntityRef> {
        self.contributors.values()
    }

    /// Whether `id` contributes to the tile
    pub fn contains(&self, id: EntityId) -> bool {
        self.contributors.contains_key(&id)
    }

    /// Number of contributors
    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    /// Whether nothing contributes to the tile
    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }
}

impl PartialEq for TileEffects {
    fn eq(&self, other: &Self) -> bool {
        self.contributors.keys().eq(other.contributors.keys())
    }
}

impl Eq for TileEffects {}

impl fmt::Debug for TileEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.contributors.keys()).finish()
    }
}

/// Read access shared by effect maps and the views layered on top of them
pub trait EffectMapView {
    /// Effects at the tile containing `location`, empty when unset
    fn tile_effects(&self, location: Vec2) -> TileEffects;

    /// Effects of every tile the filter includes, empty tiles included
    #[allow(clippy::cast_precision_loss)]
    fn tile_effects_in(&self, filter: &dyn SearchFilter) -> Vec<TileEffects> {
        filter
            .included_cells()
            .into_iter()
            .map(|cell| self.tile_effects(Vec2::new(cell.x as f32, cell.y as f32)))
            .collect()
    }
}

impl<M: EffectMapView + ?Sized> EffectMapView for &M {
    fn tile_effects(&self, location: Vec2) -> TileEffects {
        (**self).tile_effects(location)
    }

    fn tile_effects_in(&self, filter: &dyn SearchFilter) -> Vec<TileEffects> {
        (**self).tile_effects_in(filter)
    }
}

/// Sparse tile → effects map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectMap {
    tiles: HashMap<Vec2i, TileEffects>,
}

impl EffectMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every tile
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Effects at `location`, empty when unset
    pub fn get(&self, location: Vec2i) -> TileEffects {
        self.tiles.get(&location).cloned().unwrap_or_default()
    }

    /// Overlay `effects` onto whatever is stored at `location`
    pub fn apply_overlay(&mut self, location: Vec2i, effects: &TileEffects) {
        match self.tiles.get_mut(&location) {
            Some(existing) => *existing = existing.overlay(effects),
            None => {
                self.tiles.insert(location, effects.clone());
            }
        }
    }

    /// Overlay `effects` onto every tile the filter includes
    pub fn apply_overlay_in(&mut self, filter: &dyn SearchFilter, effects: &TileEffects) {
        for cell in filter.included_cells() {
            self.apply_overlay(cell, effects);
        }
    }

    /// Overlay every tile of `other`, shifted by `offset`
    pub fn overlay_map(&mut self, other: &EffectMap, offset: Vec2i) {
        for (location, effects) in &other.tiles {
            self.apply_overlay(location + offset, effects);
        }
    }

    /// Tiles holding a value
    pub fn locations(&self) -> impl Iterator<Item = Vec2i> + '_ {
        self.tiles.keys().copied()
    }

    /// Number of tiles holding a value
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tile holds a value
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl EffectMapView for EffectMap {
    fn tile_effects(&self, location: Vec2) -> TileEffects {
        self.get(floor2(location))
    }
}

/// View of a map whose origin is moved to `offset`
///
/// Asking the view about `l` asks the wrapped map about `l - offset`.
#[derive(Debug, Clone)]
pub struct TranslatedEffectMap<M> {
    map: M,
    offset: Vec2,
}

impl<M: EffectMapView> TranslatedEffectMap<M> {
    /// Wrap `map`
    pub fn new(map: M, offset: Vec2) -> Self {
        Self { map, offset }
    }
}

impl<M: EffectMapView> EffectMapView for TranslatedEffectMap<M> {
    fn tile_effects(&self, location: Vec2) -> TileEffects {
        self.map.tile_effects(location - self.offset)
    }

    fn tile_effects_in(&self, filter: &dyn SearchFilter) -> Vec<TileEffects> {
        self.map
            .tile_effects_in(&TranslatedSearchFilter::new(filter, self.offset))
    }
}

/// View of a map with query coordinates multiplied by `scale`
#[derive(Debug, Clone)]
pub struct ScaledEffectMap<M> {
    map: M,
    scale: f32,
}

impl<M: EffectMapView> ScaledEffectMap<M> {
    /// Wrap `map`
    pub fn new(map: M, scale: f32) -> Self {
        Self { map, scale }
    }
}

impl<M: EffectMapView> EffectMapView for ScaledEffectMap<M> {
    fn tile_effects(&self, location: Vec2) -> TileEffects {
        self.map.tile_effects(location * self.scale)
    }

    fn tile_effects_in(&self, filter: &dyn SearchFilter) -> Vec<TileEffects> {
        self.map
            .tile_effects_in(&ScaledSearchFilter::new(filter, self.scale))
    }
}

/// Several views stacked on top of each other
#[derive(Default)]
pub struct OverlappedEffectMap<'a> {
    maps: Vec<Box<dyn EffectMapView + 'a>>,
}

impl<'a> OverlappedEffectMap<'a> {
    /// Create an empty stack
    pub fn new() -> Self {
        Self { maps: Vec::new() }
    }

    /// Push another layer
    pub fn add(&mut self, map: impl EffectMapView + 'a) {
        self.maps.push(Box::new(map));
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Whether there are no layers
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl EffectMapView for OverlappedEffectMap<'_> {
    fn tile_effects(&self, location: Vec2) -> TileEffects {
        self.maps
            .iter()
            .fold(TileEffects::new(), |merged, map| merged.overlay(&map.tile_effects(location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Rect2;
    use crate::search::RectangleSearchFilter;
    use crate::testing::TestEntity;

    fn entity(id: u64) -> EntityRef {
        TestEntity::builder(id).build()
    }

    #[test]
    fn test_overlay_is_commutative_and_associative() {
        let a = TileEffects::from_entity(entity(1));
        let b = TileEffects::from_entity(entity(2)).overlay(&TileEffects::from_entity(entity(3)));
        let c = TileEffects::from_entity(entity(3)).overlay(&TileEffects::from_entity(entity(4)));

        assert_eq!(a.overlay(&b), b.overlay(&a));
        assert_eq!(a.overlay(&b).overlay(&c), a.overlay(&b.overlay(&c)));
        assert_eq!(a.overlay(&b).overlay(&c).len(), 4);
    }

    #[test]
    fn test_overlay_with_empty_is_identity() {
        let a = TileEffects::from_entity(entity(7));

        assert_eq!(a.overlay(&TileEffects::new()), a);
        assert_eq!(TileEffects::merge([&a, &TileEffects::new(), &a]), a);
    }

    #[test]
    fn test_traversable_ignores_subject() {
        let wall = TestEntity::builder(1).collidable(true).build();
        let walker = TestEntity::builder(2).collidable(true).build();
        let ghost = TestEntity::builder(3).collidable(false).build();

        let tile = TileEffects::from_entity(Arc::clone(&walker) as EntityRef);
        assert!(tile.is_traversable(&*walker));

        let tile = tile.overlay(&TileEffects::from_entity(Arc::clone(&wall) as EntityRef));
        assert!(!tile.is_traversable(&*walker));
        assert!(tile.is_traversable(&*ghost));
    }

    #[test]
    fn test_missing_tile_is_empty() {
        let map = EffectMap::new();

        assert!(map.get(Vec2i::new(-40, 12)).is_empty());
        assert!(map.tile_effects(Vec2::new(0.5, 0.5)).is_empty());
    }

    #[test]
    fn test_apply_overlay_merges() {
        let mut map = EffectMap::new();
        let location = Vec2i::new(3, 4);
        map.apply_overlay(location, &TileEffects::from_entity(entity(1)));
        map.apply_overlay(location, &TileEffects::from_entity(entity(2)));

        let effects = map.get(location);
        assert!(effects.contains(EntityId::new(1)));
        assert!(effects.contains(EntityId::new(2)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_apply_overlay_in_filter() {
        let mut map = EffectMap::new();
        let filter = RectangleSearchFilter::new(Rect2::new(0.0, 0.0, 1.0, 1.0));
        map.apply_overlay_in(&filter, &TileEffects::from_entity(entity(1)));

        assert_eq!(map.len(), 4);
        assert_eq!(map.tile_effects_in(&filter).len(), 4);
        assert!(map.tile_effects_in(&filter).iter().all(|e| e.len() == 1));
    }

    #[test]
    fn test_overlay_map_with_offset() {
        let mut base = EffectMap::new();
        let mut other = EffectMap::new();
        other.apply_overlay(Vec2i::new(0, 0), &TileEffects::from_entity(entity(9)));

        base.overlay_map(&other, Vec2i::new(5, -1));

        assert!(base.get(Vec2i::new(5, -1)).contains(EntityId::new(9)));
        assert!(base.get(Vec2i::new(0, 0)).is_empty());
    }

    #[test]
    fn test_translated_and_scaled_views() {
        let mut map = EffectMap::new();
        map.apply_overlay(Vec2i::new(2, 2), &TileEffects::from_entity(entity(1)));

        let translated = TranslatedEffectMap::new(&map, Vec2::new(10.0, 10.0));
        assert!(translated.tile_effects(Vec2::new(12.0, 12.0)).contains(EntityId::new(1)));
        let filter = RectangleSearchFilter::new(Rect2::new(12.0, 12.0, 0.0, 0.0));
        assert_eq!(translated.tile_effects_in(&filter), vec![map.get(Vec2i::new(2, 2))]);

        let scaled = ScaledEffectMap::new(&map, 2.0);
        assert!(scaled.tile_effects(Vec2::new(1.0, 1.0)).contains(EntityId::new(1)));
    }

    #[test]
    fn test_overlapped_view_unions_layers() {
        let mut lower = EffectMap::new();
        let mut upper = EffectMap::new();
        lower.apply_overlay(Vec2i::new(0, 0), &TileEffects::from_entity(entity(1)));
        upper.apply_overlay(Vec2i::new(0, 0), &TileEffects::from_entity(entity(2)));

        let mut stack = OverlappedEffectMap::new();
        stack.add(&lower);
        stack.add(&upper);

        let effects = stack.tile_effects(Vec2::zeros());
        assert_eq!(effects.len(), 2);
        assert_eq!(stack.len(), 2);
    }
}
