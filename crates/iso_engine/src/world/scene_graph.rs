//! Authoritative entity → sector index

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::{
    EffectMapView, EntityId, EntityRef, EntitySector, PhysicsBody, PhysicsWorld,
    SectorCoordinate, TileEffects,
};
use crate::config::SceneConfig;
use crate::events::{BodyEvent, EntityEvent, Observers, SceneGraphEvent, SubscriptionId};
use crate::foundation::collections::{new_key_type, ProcessList, SlotMap};
use crate::foundation::math::{ceil2, floor2, Rect2, Rect2I, Vec2, Vec2i};
use crate::scene::SceneBuffer;
use crate::search::SearchFilter;

new_key_type! {
    /// Handle of an entity registration; stale after the entity is removed
    struct EntryKey;
}

/// Registration of one entity
struct EntityEntry {
    entity: EntityRef,
    body: Arc<dyn PhysicsBody>,
    body_subscription: SubscriptionId,
    entity_subscription: SubscriptionId,
    sectors: Vec<SectorCoordinate>,
}

/// State shared between the graph and the observers it installs
struct SceneIndex {
    dimension: i32,
    sectors: HashMap<SectorCoordinate, EntitySector>,
    entries: SlotMap<EntryKey, EntityEntry>,
    by_id: BTreeMap<EntityId, EntryKey>,
    dynamic: ProcessList<EntityId, EntityRef>,
    physics: Option<Arc<dyn PhysicsWorld>>,
    this: Weak<Mutex<SceneIndex>>,
}

fn lock_index(index: &Mutex<SceneIndex>) -> MutexGuard<'_, SceneIndex> {
    index.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SceneIndex {
    /// Sectors covering every tile from `floor(min)` to `ceil(max)` inclusive
    fn covered_sectors(&self, entity: &EntityRef) -> Vec<SectorCoordinate> {
        let aabb = entity.aabb();
        let min = floor2(aabb.min.xy());
        let max = ceil2(aabb.max.xy());
        let first = SectorCoordinate::containing_tile(min, self.dimension);
        let last = SectorCoordinate::containing_tile(max, self.dimension);

        let mut covered = BTreeSet::new();
        for x in first.x..=last.x {
            for y in first.y..=last.y {
                covered.insert(SectorCoordinate::new(x, y));
            }
        }
        covered.into_iter().collect()
    }

    fn sector_mut(&mut self, coordinate: SectorCoordinate) -> &mut EntitySector {
        let dimension = self.dimension;
        let physics = self.physics.clone();
        let this = self.this.clone();

        self.sectors.entry(coordinate).or_insert_with(|| {
            log::debug!("Creating sector {coordinate:?}");
            let mut sector = EntitySector::new(coordinate, dimension);
            if let Some(physics) = physics {
                let sensor = physics.create_region_sensor(sector.region());
                let subscription = watch_sensor(this, &sensor);
                sector.attach_sensor(sensor, subscription);
            }
            sector
        })
    }

    fn place(&mut self, key: EntryKey) {
        let Some(entry) = self.entries.get(key) else {
            return;
        };
        let entity = Arc::clone(&entry.entity);
        let coordinates = self.covered_sectors(&entity);

        for &coordinate in &coordinates {
            self.sector_mut(coordinate).add_entity(&entity);
        }
        if let Some(entry) = self.entries.get_mut(key) {
            entry.sectors = coordinates;
        }
    }

    fn unplace(&mut self, key: EntryKey) {
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        let id = entry.entity.id();
        for coordinate in std::mem::take(&mut entry.sectors) {
            if let Some(sector) = self.sectors.get_mut(&coordinate) {
                sector.remove_entity(id);
            }
        }
    }

    fn refresh(&mut self, key: EntryKey) {
        self.unplace(key);
        self.place(key);
        if let Some(entry) = self.entries.get(key) {
            log::trace!("Re-placed {} into {} sector(s)", entry.entity.id(), entry.sectors.len());
        }
    }

    fn refresh_id(&mut self, id: EntityId) {
        if let Some(&key) = self.by_id.get(&id) {
            self.refresh(key);
        }
    }

    fn replace_body(&mut self, key: EntryKey, new: &Arc<dyn PhysicsBody>) {
        let this = self.this.clone();
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        entry.body.observers().unsubscribe(entry.body_subscription);
        entry.body_subscription = watch_body(this, key, new);
        entry.body = Arc::clone(new);
        self.refresh(key);
    }

    /// Entities of every existing sector overlapping `region`, deduplicated
    fn contained(&self, region: Rect2I) -> BTreeMap<EntityId, EntityRef> {
        let first =
            SectorCoordinate::containing_tile(Vec2i::new(region.x, region.y), self.dimension);
        let last = SectorCoordinate::containing_tile(
            Vec2i::new(region.x + region.width, region.y + region.height),
            self.dimension,
        );

        let mut found = BTreeMap::new();
        for x in first.x..=last.x {
            for y in first.y..=last.y {
                let Some(sector) = self.sectors.get(&SectorCoordinate::new(x, y)) else {
                    continue;
                };
                for entity in sector.entities() {
                    found.entry(entity.id()).or_insert(entity);
                }
            }
        }
        found
    }
}

/// Re-place the entry whenever its body moves
fn watch_body(
    index: Weak<Mutex<SceneIndex>>,
    key: EntryKey,
    body: &Arc<dyn PhysicsBody>,
) -> SubscriptionId {
    body.observers().subscribe(move |event| {
        if *event != BodyEvent::LocationSet {
            return;
        }
        if let Some(index) = index.upgrade() {
            lock_index(&index).refresh(key);
        }
    })
}

/// Follow body swaps of the entity
fn watch_entity(
    index: Weak<Mutex<SceneIndex>>,
    key: EntryKey,
    entity: &EntityRef,
) -> SubscriptionId {
    entity.observers().subscribe(move |event| match event {
        EntityEvent::BodyReplaced { new, .. } => {
            if let Some(index) = index.upgrade() {
                lock_index(&index).replace_body(key, new);
            }
        }
    })
}

/// Refresh entities reported by a sector's region sensor
fn watch_sensor(index: Weak<Mutex<SceneIndex>>, sensor: &Arc<dyn PhysicsBody>) -> SubscriptionId {
    sensor.observers().subscribe(move |event| {
        let (BodyEvent::BeginContact(id) | BodyEvent::EndContact(id)) = *event else {
            return;
        };
        if let Some(index) = index.upgrade() {
            lock_index(&index).refresh_id(id);
        }
    })
}

/// Sector-partitioned index of every entity in a world
///
/// Entities are placed in every sector their AABB covers and re-placed as
/// soon as their body reports a new location or is swapped for another body.
/// Queries never create sectors; a missing sector behaves like an empty one.
///
/// Entity implementations must not hold their own locks while raising body or
/// entity events, and a [`PhysicsWorld`] must not raise sensor events from
/// inside [`PhysicsWorld::create_region_sensor`].
pub struct SceneGraph {
    index: Arc<Mutex<SceneIndex>>,
    observers: Observers<SceneGraphEvent>,
}

impl SceneGraph {
    /// Create a graph without region sensors
    pub fn new(config: &SceneConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a graph whose sectors listen to region sensors from `physics`
    pub fn with_physics(config: &SceneConfig, physics: Arc<dyn PhysicsWorld>) -> Self {
        Self::build(config, Some(physics))
    }

    fn build(config: &SceneConfig, physics: Option<Arc<dyn PhysicsWorld>>) -> Self {
        let dimension = config.sector_dimension.max(1);
        let index = Arc::new_cyclic(|this| {
            Mutex::new(SceneIndex {
                dimension,
                sectors: HashMap::new(),
                entries: SlotMap::with_key(),
                by_id: BTreeMap::new(),
                dynamic: ProcessList::new(),
                physics,
                this: this.clone(),
            })
        });

        Self {
            index,
            observers: Observers::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SceneIndex> {
        lock_index(&self.index)
    }

    /// Edge length of a sector, in tiles
    pub fn sector_dimension(&self) -> i32 {
        self.lock().dimension
    }

    /// Added/removed notifications
    pub fn observers(&self) -> &Observers<SceneGraphEvent> {
        &self.observers
    }

    /// Register `entity`. Adding an entity twice is a no-op.
    pub fn add(&mut self, entity: EntityRef) {
        let id = entity.id();
        {
            let mut index = self.lock();
            if index.by_id.contains_key(&id) {
                log::trace!("{id} is already registered");
                return;
            }

            let this = index.this.clone();
            let body = entity.body();
            let key = index.entries.insert_with_key(|key| EntityEntry {
                body_subscription: watch_body(this.clone(), key, &body),
                entity_subscription: watch_entity(this, key, &entity),
                body,
                entity: Arc::clone(&entity),
                sectors: Vec::new(),
            });
            index.by_id.insert(id, key);
            if !entity.is_static() {
                index.dynamic.insert(id, Arc::clone(&entity));
            }
            index.place(key);
            log::trace!("Added {id} ({})", entity.name());
        }

        self.observers.raise(&SceneGraphEvent::Added(id));
    }

    /// Unregister the entity `id`. Unknown ids are ignored.
    pub fn remove(&mut self, id: EntityId) -> bool {
        {
            let mut index = self.lock();
            let Some(key) = index.by_id.remove(&id) else {
                return false;
            };
            index.unplace(key);
            index.dynamic.remove(id);
            if let Some(entry) = index.entries.remove(key) {
                entry.body.observers().unsubscribe(entry.body_subscription);
                entry.entity.observers().unsubscribe(entry.entity_subscription);
            }
            log::trace!("Removed {id}");
        }

        self.observers.raise(&SceneGraphEvent::Removed(id));
        true
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: EntityId) -> bool {
        self.lock().by_id.contains_key(&id)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    /// Whether no entity is registered
    pub fn is_empty(&self) -> bool {
        self.lock().by_id.is_empty()
    }

    /// Rebuild sector effect maps, then tick every dynamic entity
    ///
    /// Entities are ticked outside the index lock so that the location
    /// notifications they raise can re-place them immediately.
    pub fn update(&mut self, delta_time: f32) {
        let dynamic = {
            let mut index = self.lock();
            for sector in index.sectors.values_mut() {
                sector.update(delta_time);
            }
            index.dynamic.snapshot()
        };

        for entity in dynamic {
            entity.update(delta_time);
        }
    }

    /// Effects at the tile `location`; empty when no sector exists there
    pub fn tile_effects(&self, location: Vec2i) -> TileEffects {
        let index = self.lock();
        let coordinate = SectorCoordinate::containing_tile(location, index.dimension);
        index
            .sectors
            .get(&coordinate)
            .map(|sector| sector.tile_effects(location))
            .unwrap_or_default()
    }

    /// Push the model of every entity visible in `region` into `buffer`
    ///
    /// Sectors one step beyond the region are consulted as well so that
    /// models hanging over a sector edge are not clipped.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn enqueue_render(&self, buffer: &mut dyn SceneBuffer, region: Rect2) {
        let candidates = {
            let index = self.lock();
            let dimension = index.dimension as f32;
            let first_x = (region.x / dimension).floor() as i32 - 1;
            let first_y = (region.y / dimension).floor() as i32 - 1;
            let last_x = first_x + (region.width / dimension).ceil() as i32 + 2;
            let last_y = first_y + (region.height / dimension).ceil() as i32 + 2;

            let mut candidates = BTreeMap::new();
            for y in first_y..=last_y {
                for x in first_x..=last_x {
                    if let Some(sector) = index.sectors.get(&SectorCoordinate::new(x, y)) {
                        sector.enqueue_render_candidates(&mut candidates, &region);
                    }
                }
            }
            candidates
        };

        for entity in candidates.into_values() {
            let model = entity.model();
            let location = entity.location();
            buffer.add_model(model.as_ref(), Some(entity), location);
        }
    }

    /// Query every entity
    pub fn entities(&self) -> EntitySet<'_> {
        EntitySet { graph: self, region: None }
    }

    /// Query entities whose footprint touches a sector overlapping `region`
    pub fn entities_in(&self, region: Rect2I) -> EntitySet<'_> {
        EntitySet { graph: self, region: Some(region) }
    }

    /// Sectors the entity `id` is currently placed in, in coordinate order
    pub fn sectors_of(&self, id: EntityId) -> Vec<SectorCoordinate> {
        let index = self.lock();
        index
            .by_id
            .get(&id)
            .and_then(|key| index.entries.get(*key))
            .map(|entry| entry.sectors.clone())
            .unwrap_or_default()
    }

    /// Members of the sector at `coordinate`, empty when it does not exist
    pub fn sector_members(&self, coordinate: SectorCoordinate) -> Vec<EntityId> {
        self.lock()
            .sectors
            .get(&coordinate)
            .map(EntitySector::entity_ids)
            .unwrap_or_default()
    }

    /// Number of sectors created so far
    pub fn sector_count(&self) -> usize {
        self.lock().sectors.len()
    }
}

impl EffectMapView for SceneGraph {
    fn tile_effects(&self, location: Vec2) -> TileEffects {
        SceneGraph::tile_effects(self, floor2(location))
    }
}

impl Drop for SceneGraph {
    fn drop(&mut self) {
        let mut index = self.lock();
        for (_, entry) in index.entries.drain() {
            entry.body.observers().unsubscribe(entry.body_subscription);
            entry.entity.observers().unsubscribe(entry.entity_subscription);
        }
        let physics = index.physics.clone();
        for sector in index.sectors.values_mut() {
            if let Some((sensor, subscription)) = sector.take_sensor() {
                sensor.observers().unsubscribe(subscription);
                if let Some(physics) = &physics {
                    physics.destroy_body(&sensor);
                }
            }
        }
    }
}

impl std::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let index = self.lock();
        f.debug_struct("SceneGraph")
            .field("entities", &index.by_id.len())
            .field("sectors", &index.sectors.len())
            .field("dimension", &index.dimension)
            .finish()
    }
}

/// Entity queries against a [`SceneGraph`], optionally limited to a region
///
/// Results are deduplicated across sectors and ordered by entity id.
#[derive(Debug, Clone, Copy)]
pub struct EntitySet<'a> {
    graph: &'a SceneGraph,
    region: Option<Rect2I>,
}

impl EntitySet<'_> {
    /// Every entity in the set
    pub fn all(&self) -> Vec<EntityRef> {
        let index = self.graph.lock();
        match self.region {
            Some(region) => index.contained(region).into_values().collect(),
            None => index
                .by_id
                .values()
                .filter_map(|key| index.entries.get(*key))
                .map(|entry| Arc::clone(&entry.entity))
                .collect(),
        }
    }

    /// First entity named `name`
    pub fn by_name(&self, name: &str) -> Option<EntityRef> {
        self.all().into_iter().find(|entity| entity.name() == name)
    }

    /// Every entity whose concrete type is `T`
    pub fn of_type<T: 'static>(&self) -> Vec<EntityRef> {
        self.all()
            .into_iter()
            .filter(|entity| entity.as_any().is::<T>())
            .collect()
    }

    /// Entities located inside `filter`
    pub fn search(&self, filter: &dyn SearchFilter) -> Vec<EntityRef> {
        self.search_where(filter, |_| true)
    }

    /// Entities located inside `filter` that also satisfy `predicate`
    ///
    /// Only sectors within the filter's search bounds (clipped to the set's
    /// region) are visited.
    pub fn search_where<P>(&self, filter: &dyn SearchFilter, predicate: P) -> Vec<EntityRef>
    where
        P: Fn(&EntityRef) -> bool,
    {
        let bounds = match self.region {
            Some(region) if !region.intersects(&filter.search_bounds()) => return Vec::new(),
            Some(region) => region.overlapping(&filter.search_bounds()),
            None => filter.search_bounds(),
        };
        let candidates = self.graph.lock().contained(bounds);

        candidates
            .into_values()
            .filter(|entity| filter.should_include(entity.location().xy()) && predicate(entity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::TopologicalSceneBuffer;
    use crate::search::RadialSearchFilter;
    use crate::testing::{TestBody, TestEntity, TestPhysicsWorld};
    use crate::world::Entity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> SceneConfig {
        SceneConfig {
            sector_dimension: 4,
            worker_threads: Some(1),
            ..SceneConfig::default()
        }
    }

    fn sector(x: i32, y: i32) -> SectorCoordinate {
        SectorCoordinate::new(x, y)
    }

    #[test]
    fn test_add_places_entity_in_every_covered_sector() {
        let mut graph = SceneGraph::new(&config());
        let entity = TestEntity::builder(1).location(Vec3::new(3.5, 3.5, 0.0)).build();
        graph.add(entity);

        let id = EntityId::new(1);
        assert_eq!(
            graph.sectors_of(id),
            vec![sector(0, 0), sector(0, 1), sector(1, 0), sector(1, 1)]
        );
        for coordinate in graph.sectors_of(id) {
            assert_eq!(graph.sector_members(coordinate), vec![id]);
        }
        assert_eq!(graph.sector_count(), 4);
    }

    #[test]
    fn test_moving_body_replaces_entity() {
        let mut graph = SceneGraph::new(&config());
        let walker = TestEntity::builder(1).build();
        graph.add(walker.clone());
        let id = walker.id();
        assert_eq!(graph.sectors_of(id), vec![sector(0, 0)]);

        walker.set_location(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(graph.sectors_of(id), vec![sector(1, 0)]);
        assert!(graph.sector_members(sector(0, 0)).is_empty());

        walker.set_location(Vec3::new(-10.0, -10.0, 0.0));
        assert_eq!(graph.sectors_of(id), vec![sector(-3, -3)]);
        assert!(graph.sector_members(sector(1, 0)).is_empty());
    }

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let mut graph = SceneGraph::new(&config());
        let added = Arc::new(AtomicUsize::new(0));
        let removed = Arc::new(AtomicUsize::new(0));
        {
            let (added, removed) = (Arc::clone(&added), Arc::clone(&removed));
            graph.observers().subscribe(move |event| {
                let counter = match event {
                    SceneGraphEvent::Added(_) => &added,
                    SceneGraphEvent::Removed(_) => &removed,
                };
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        let entity = TestEntity::builder(7).build();
        graph.add(entity.clone());
        graph.add(entity.clone());
        assert_eq!(graph.len(), 1);
        assert_eq!(added.load(Ordering::SeqCst), 1);

        assert!(graph.remove(entity.id()));
        assert!(!graph.remove(entity.id()));
        assert_eq!(removed.load(Ordering::SeqCst), 1);
        assert!(graph.is_empty());
        assert!(graph.sector_members(sector(0, 0)).is_empty());

        entity.set_location(Vec3::new(9.0, 9.0, 0.0));
        assert!(graph.sectors_of(entity.id()).is_empty());
        assert!(entity.test_body().observers().is_empty());
        assert!(entity.observers().is_empty());
    }

    #[test]
    fn test_replaced_body_is_tracked_instead_of_old_one() {
        let mut graph = SceneGraph::new(&config());
        let entity = TestEntity::builder(1).build();
        graph.add(entity.clone());
        let old = entity.test_body();

        let new = Arc::new(TestBody::new(
            Some(entity.id()),
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            false,
        ));
        entity.replace_body(Arc::clone(&new));
        assert_eq!(graph.sectors_of(entity.id()), vec![sector(5, 0)]);
        assert!(old.observers().is_empty());

        old.set_location(Vec3::zeros());
        assert_eq!(graph.sectors_of(entity.id()), vec![sector(5, 0)]);

        new.set_location(Vec3::new(0.0, 9.0, 0.0));
        assert_eq!(graph.sectors_of(entity.id()), vec![sector(0, 2)]);
    }

    #[test]
    fn test_sensor_contact_refreshes_entity() {
        let physics = Arc::new(TestPhysicsWorld::new());
        let world = Arc::clone(&physics) as Arc<dyn PhysicsWorld>;
        let mut graph = SceneGraph::with_physics(&config(), world);
        let entity = TestEntity::builder(3).build();
        graph.add(entity.clone());
        assert_eq!(physics.sensors().len(), 1);

        entity.test_body().set_location_quietly(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(graph.sectors_of(entity.id()), vec![sector(0, 0)]);

        let sensor = physics.sensor_at(Vec3::new(0.5, 0.5, 0.5)).unwrap();
        sensor.end_contact(entity.id());
        assert_eq!(graph.sectors_of(entity.id()), vec![sector(1, 0)]);
        assert_eq!(physics.sensors().len(), 2);

        drop(graph);
        assert_eq!(physics.destroyed(), 2);
        assert!(sensor.observers().is_empty());
    }

    #[test]
    fn test_missing_sector_has_no_effects() {
        let graph = SceneGraph::new(&config());

        assert!(graph.tile_effects(Vec2i::new(1000, -1000)).is_empty());
        assert!(EffectMapView::tile_effects(&graph, Vec2::new(0.5, 0.5)).is_empty());
        assert_eq!(graph.sector_count(), 0);
    }

    #[test]
    fn test_update_blends_effects_and_ticks_dynamic_entities() {
        let mut graph = SceneGraph::new(&config());
        let wall = TestEntity::builder(1)
            .location(Vec3::new(2.0, 2.0, 0.0))
            .collidable(true)
            .static_entity(true)
            .build();
        let mover = TestEntity::builder(2)
            .velocity(Vec3::new(4.0, 0.0, 0.0))
            .build();
        graph.add(wall.clone());
        graph.add(mover.clone());

        graph.update(1.0);

        assert_eq!(wall.ticks(), 0);
        assert_eq!(mover.ticks(), 1);
        assert!(graph.tile_effects(Vec2i::new(2, 2)).contains(wall.id()));
        assert!(graph.tile_effects(Vec2i::new(3, 3)).is_empty());
        assert_eq!(graph.sectors_of(mover.id()), vec![sector(1, 0)]);
    }

    #[test]
    fn test_entity_set_queries() {
        let mut graph = SceneGraph::new(&config());
        graph.add(TestEntity::builder(3).name("barrel").location(Vec3::new(1.0, 1.0, 0.0)).build());
        graph.add(TestEntity::builder(1).name("crate").location(Vec3::new(2.0, 1.0, 0.0)).build());
        graph.add(TestEntity::builder(2).name("tree").location(Vec3::new(30.0, 30.0, 0.0)).build());

        let ids = |entities: Vec<EntityRef>| {
            entities.iter().map(|e| e.id().raw()).collect::<Vec<_>>()
        };

        assert_eq!(ids(graph.entities().all()), vec![1, 2, 3]);
        assert_eq!(graph.entities().by_name("tree").map(|e| e.id().raw()), Some(2));
        assert!(graph.entities().by_name("rock").is_none());
        assert_eq!(graph.entities().of_type::<TestEntity>().len(), 3);
        assert!(graph.entities().of_type::<String>().is_empty());

        assert_eq!(ids(graph.entities_in(Rect2I::new(0, 0, 3, 3)).all()), vec![1, 3]);

        let near = RadialSearchFilter::new(Vec2::new(1.0, 1.0), 1.5);
        assert_eq!(ids(graph.entities().search(&near)), vec![1, 3]);
        assert_eq!(
            ids(graph.entities().search_where(&near, |e| e.name() == "crate")),
            vec![1]
        );
        assert!(graph.entities_in(Rect2I::new(20, 20, 4, 4)).search(&near).is_empty());
    }

    #[test]
    fn test_enqueue_render_only_pushes_visible_models() {
        let mut graph = SceneGraph::new(&config());
        graph.add(TestEntity::builder(1).location(Vec3::new(1.0, 1.0, 0.0)).build());
        graph.add(TestEntity::builder(2).location(Vec3::new(2.0, 1.0, 0.0)).build());
        graph.add(TestEntity::builder(3).location(Vec3::new(500.0, 500.0, 0.0)).build());

        let mut buffer = TopologicalSceneBuffer::isometric(&config()).unwrap();
        graph.enqueue_render(&mut buffer, Rect2::new(0.0, 0.0, 10.0, 10.0));

        assert_eq!(buffer.len(), 2);
        let picked: Vec<u64> = buffer
            .sorted_entries()
            .iter()
            .filter_map(|entry| entry.dispatcher().map(|e| e.id().raw()))
            .collect();
        assert_eq!(picked.len(), 2);
        assert!(picked.contains(&1) && picked.contains(&2));
        assert!(buffer.pick_where(0, 0, 1.0, &|_| false).is_none());
    }
}
