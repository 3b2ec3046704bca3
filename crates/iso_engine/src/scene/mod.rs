//! Frame assembly and depth-correct drawing
//!
//! ```text
//! SceneCamera ──► SceneGraph::enqueue_render ──► SceneBuffer (add_model per entity)
//!                                                    │
//!                                                    ▼
//!                             TopologicalSceneBuffer: sort ──► render / pick
//! ```
//!
//! The buffer is frame-scoped: reset it, fill it, then draw and pick from it
//! as many times as needed before the next reset.

mod buffer;
mod camera;
mod effect;
mod model;
mod projection;
mod scaled;
mod sprite;
mod target;
mod topological;

pub use buffer::{SceneBuffer, SceneBufferEntry};
pub use camera::{SceneCamera, MIN_ZOOM};
pub use effect::{
    ComponentContext, ComponentEffect, HideEntityObstructionsEffect, SceneBufferEffect,
};
pub use model::{EmptyModel, ModelComponent, SceneModel};
pub use projection::{Projection, MIN_SCALE};
pub use scaled::ScaledSceneBuffer;
pub use sprite::{SpriteComponent, SpriteModel, SpriteSpec};
pub use target::{Clip, Color, DrawCommand, RecordingTarget, RenderTarget};
pub use topological::{CancellationToken, TopologicalSceneBuffer};
