//! In-memory entities, bodies and physics for headless runs and tests
//!
//! These implement the collaborator traits with plain state behind mutexes.
//! Locks are always released before events are raised.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{BodyEvent, EntityEvent, Observers};
use crate::foundation::math::{Vec3, AABB};
use crate::scene::{SceneModel, SpriteModel};
use crate::world::{Entity, EntityId, PhysicsBody, PhysicsWorld};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Box-shaped body whose location is set directly
#[derive(Debug)]
pub struct TestBody {
    owner: Option<EntityId>,
    location: Mutex<Vec3>,
    size: Vec3,
    collidable: bool,
    observers: Observers<BodyEvent>,
}

impl TestBody {
    /// Body of `size` with its minimum corner at `location`
    pub fn new(owner: Option<EntityId>, location: Vec3, size: Vec3, collidable: bool) -> Self {
        Self {
            owner,
            location: Mutex::new(location),
            size,
            collidable,
            observers: Observers::new(),
        }
    }

    /// Move the body and notify observers
    pub fn set_location(&self, location: Vec3) {
        self.set_location_quietly(location);
        self.observers.raise(&BodyEvent::LocationSet);
    }

    /// Move the body without notifying anyone
    pub fn set_location_quietly(&self, location: Vec3) {
        *lock(&self.location) = location;
    }

    /// Report that a body owned by `other` started touching this one
    pub fn begin_contact(&self, other: EntityId) {
        self.observers.raise(&BodyEvent::BeginContact(other));
    }

    /// Report that a body owned by `other` stopped touching this one
    pub fn end_contact(&self, other: EntityId) {
        self.observers.raise(&BodyEvent::EndContact(other));
    }
}

impl PhysicsBody for TestBody {
    fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    fn location(&self) -> Vec3 {
        *lock(&self.location)
    }

    fn aabb(&self) -> AABB {
        let location = self.location();
        AABB::new(location, location + self.size)
    }

    fn is_collidable(&self) -> bool {
        self.collidable
    }

    fn collides_with(&self, other: &dyn PhysicsBody) -> bool {
        self.collidable && other.is_collidable()
    }

    fn observers(&self) -> &Observers<BodyEvent> {
        &self.observers
    }
}

/// Entity backed by a [`TestBody`], optionally drifting with a fixed velocity
pub struct TestEntity {
    id: EntityId,
    name: String,
    is_static: bool,
    body: Mutex<Arc<TestBody>>,
    model: Arc<dyn SceneModel>,
    velocity: Mutex<Vec3>,
    ticks: AtomicUsize,
    observers: Observers<EntityEvent>,
}

impl TestEntity {
    /// Start building an entity with id `id`
    pub fn builder(id: u64) -> TestEntityBuilder {
        TestEntityBuilder::new(id)
    }

    /// Current body
    pub fn test_body(&self) -> Arc<TestBody> {
        Arc::clone(&lock(&self.body))
    }

    /// Move the entity and notify observers
    pub fn set_location(&self, location: Vec3) {
        self.test_body().set_location(location);
    }

    /// Per-second drift applied by [`Entity::update`]
    pub fn set_velocity(&self, velocity: Vec3) {
        *lock(&self.velocity) = velocity;
    }

    /// Swap the body and raise [`EntityEvent::BodyReplaced`]
    pub fn replace_body(&self, body: Arc<TestBody>) {
        let old = std::mem::replace(&mut *lock(&self.body), Arc::clone(&body));
        self.observers.raise(&EntityEvent::BodyReplaced { old, new: body });
    }

    /// Number of times [`Entity::update`] ran
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl Entity for TestEntity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn body(&self) -> Arc<dyn PhysicsBody> {
        self.test_body()
    }

    fn model(&self) -> Arc<dyn SceneModel> {
        Arc::clone(&self.model)
    }

    fn observers(&self) -> &Observers<EntityEvent> {
        &self.observers
    }

    fn update(&self, delta_time: f32) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        let velocity = *lock(&self.velocity);
        if velocity != Vec3::zeros() {
            let body = self.test_body();
            body.set_location(body.location() + velocity * delta_time);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builder for [`TestEntity`]
#[derive(Clone)]
pub struct TestEntityBuilder {
    id: u64,
    name: Option<String>,
    location: Vec3,
    size: Vec3,
    collidable: bool,
    is_static: bool,
    velocity: Vec3,
    model: Option<Arc<dyn SceneModel>>,
}

impl TestEntityBuilder {
    fn new(id: u64) -> Self {
        Self {
            id,
            name: None,
            location: Vec3::zeros(),
            size: Vec3::new(1.0, 1.0, 1.0),
            collidable: false,
            is_static: false,
            velocity: Vec3::zeros(),
            model: None,
        }
    }

    /// Instance name, `entity-<id>` by default
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Minimum corner of the body
    #[must_use]
    pub fn location(mut self, location: Vec3) -> Self {
        self.location = location;
        self
    }

    /// Body size, one tile cube by default
    #[must_use]
    pub fn size(mut self, size: Vec3) -> Self {
        self.size = size;
        self
    }

    /// Whether the body blocks other collidable bodies
    #[must_use]
    pub fn collidable(mut self, collidable: bool) -> Self {
        self.collidable = collidable;
        self
    }

    /// Whether the entity is static
    #[must_use]
    pub fn static_entity(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Per-second drift applied on every update
    #[must_use]
    pub fn velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Visual model; a single sprite named after the entity covering the body by default
    #[must_use]
    pub fn model(mut self, model: Arc<dyn SceneModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the entity
    pub fn build(self) -> Arc<TestEntity> {
        let id = EntityId::new(self.id);
        let name = self.name.unwrap_or_else(|| format!("entity-{}", self.id));
        let model = self.model.unwrap_or_else(|| {
            Arc::new(SpriteModel::single(name.clone(), AABB::from_size(self.size)))
        });

        Arc::new(TestEntity {
            id,
            name,
            is_static: self.is_static,
            body: Mutex::new(Arc::new(TestBody::new(
                Some(id),
                self.location,
                self.size,
                self.collidable,
            ))),
            model,
            velocity: Mutex::new(self.velocity),
            ticks: AtomicUsize::new(0),
            observers: Observers::new(),
        })
    }
}

/// Physics world that hands out [`TestBody`] sensors and remembers them
#[derive(Debug, Default)]
pub struct TestPhysicsWorld {
    sensors: Mutex<Vec<Arc<TestBody>>>,
    destroyed: AtomicUsize,
}

impl TestPhysicsWorld {
    /// Create a world without bodies
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sensor created so far
    pub fn sensors(&self) -> Vec<Arc<TestBody>> {
        lock(&self.sensors).clone()
    }

    /// Sensor whose box contains the point, if any
    pub fn sensor_at(&self, point: Vec3) -> Option<Arc<TestBody>> {
        lock(&self.sensors)
            .iter()
            .find(|sensor| sensor.aabb().contains_point(point))
            .cloned()
    }

    /// Number of bodies released through [`PhysicsWorld::destroy_body`]
    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl PhysicsWorld for TestPhysicsWorld {
    fn create_region_sensor(&self, bounds: AABB) -> Arc<dyn PhysicsBody> {
        let sensor = Arc::new(TestBody::new(None, bounds.min, bounds.size(), false));
        lock(&self.sensors).push(Arc::clone(&sensor));
        sensor
    }

    fn destroy_body(&self, _body: &Arc<dyn PhysicsBody>) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}
