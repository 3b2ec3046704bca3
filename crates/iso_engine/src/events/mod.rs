//! Observer registry and the notifications exchanged between the scene
//! graph and the entities it indexes.
//!
//! Handlers are plain callbacks keyed by a [`SubscriptionId`]:
//! - Registration system (only subscribed handlers are notified)
//! - Immediate delivery on the raising thread
//! - Re-entrant: a handler may subscribe or unsubscribe while being invoked

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::foundation::collections::ProcessList;
use crate::world::{EntityId, PhysicsBody};

/// Handle returned by [`Observers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Thread-safe list of callbacks interested in events of type `E`
pub struct Observers<E> {
    handlers: Mutex<ProcessList<SubscriptionId, Handler<E>>>,
    next_id: AtomicU64,
}

impl<E> Observers<E> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(ProcessList::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn handlers(&self) -> MutexGuard<'_, ProcessList<SubscriptionId, Handler<E>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers().insert(id, Arc::new(handler));
        id
    }

    /// Remove a handler. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.handlers().remove(id).is_some()
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers().len()
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.handlers().is_empty()
    }

    /// Deliver `event` to every handler registered at the time of the call
    pub fn raise(&self, event: &E) {
        // The lock is released before any handler runs.
        let handlers = self.handlers().snapshot();
        for handler in handlers {
            handler(event);
        }
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("handlers", &self.len()).finish()
    }
}

/// Notifications raised by a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEvent {
    /// The body was moved
    LocationSet,
    /// The body was turned
    DirectionSet,
    /// A body owned by the given entity started touching this one
    BeginContact(EntityId),
    /// A body owned by the given entity stopped touching this one
    EndContact(EntityId),
}

/// Notifications raised by an entity
#[derive(Clone)]
pub enum EntityEvent {
    /// The entity swapped its physics body
    BodyReplaced {
        /// Body that was in use until now
        old: Arc<dyn PhysicsBody>,
        /// Body in use from now on
        new: Arc<dyn PhysicsBody>,
    },
}

impl std::fmt::Debug for EntityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BodyReplaced { .. } => f.write_str("BodyReplaced"),
        }
    }
}

/// Notifications raised by the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneGraphEvent {
    /// An entity was registered
    Added(EntityId),
    /// An entity was unregistered
    Removed(EntityId),
}
