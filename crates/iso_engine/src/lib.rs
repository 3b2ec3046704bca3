//! # Iso Engine
//!
//! Spatial indexing and draw ordering for isometric tile worlds.
//!
//! ## Features
//!
//! - **Scene Graph**: Entities partitioned into fixed-size sectors with
//!   per-tile effect maps kept in sync through body notifications
//! - **Search Filters**: Composable tile-region predicates
//! - **Scene Buffer**: Topologically sorted draw list with picking and
//!   multi-pass per-component effects
//! - **Camera**: Viewport capture over a scene graph
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iso_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let config = SceneConfig::default();
//!     let mut graph = SceneGraph::new(&config);
//!     graph.add(TestEntity::builder(1).build());
//!
//!     let mut camera = SceneCamera::new();
//!     camera.look_at(Vec3::new(0.5, 0.5, 0.0));
//!
//!     let buffer = TopologicalSceneBuffer::isometric(&config)?;
//!     let mut frame = camera.capture(&graph, buffer, Rect2I::new(0, 0, 640, 480), 1.0);
//!
//!     let mut target = RecordingTarget::new();
//!     frame.render(&mut target, 0, 0, 1.0, Rect2I::new(0, 0, 640, 480));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod events;
pub mod search;
pub mod world;
pub mod scene;
pub mod testing;

mod error;

pub use error::SceneError;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        SceneError,
        config::{Config, ConfigError, SceneConfig},
        events::{BodyEvent, EntityEvent, Observers, SceneGraphEvent, SubscriptionId},
        foundation::math::{Rect2, Rect2I, Vec2, Vec2i, Vec3, AABB},
        search::{RadialSearchFilter, RectangleSearchFilter, SearchFilter},
        world::{
            EffectMap, EffectMapView, Entity, EntityId, EntityRef, PhysicsBody, PhysicsWorld,
            SceneGraph, TileEffects,
        },
        scene::{
            HideEntityObstructionsEffect, Projection, RecordingTarget, RenderTarget, SceneBuffer,
            SceneCamera, SceneModel, SpriteModel, TopologicalSceneBuffer,
        },
        testing::{TestEntity, TestPhysicsWorld},
    };
}
