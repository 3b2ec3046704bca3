//! Scene buffer effects
//!
//! An effect may paint before and after the whole scene and may wrap the draw
//! of each component. Each wrapping is a list of [`ComponentEffect`] passes:
//! the component is drawn once per pass, with the passes of all effects
//! applied side by side.

use super::{Clip, Projection, RenderTarget, SceneBufferEntry};
use crate::foundation::math::{Rect2I, Vec2, Vec2i};
use crate::world::EntityId;

/// What an effect gets to see about the component being drawn
#[derive(Debug, Clone, Copy)]
pub struct ComponentContext<'a> {
    /// Entry about to be drawn
    pub subject: &'a SceneBufferEntry,
    /// Entries this one was sorted after because they are behind it
    pub beneath: &'a [&'a SceneBufferEntry],
    /// Render offset passed to the buffer
    pub offset: Vec2i,
    /// Scale passed to the buffer
    pub scale: f32,
    /// Screen anchor of the subject, before the render offset
    pub render_location: Vec2i,
    /// Projection used by the buffer, at unit scale
    pub projection: &'a Projection,
    /// Pan accumulated by the buffer
    pub translation: Vec2i,
}

impl ComponentContext<'_> {
    /// Screen rectangle covered by `entry` as it is drawn this frame
    #[allow(clippy::cast_precision_loss)]
    pub fn screen_bounds(&self, entry: &SceneBufferEntry) -> Rect2I {
        let shift = self.translation + self.offset;
        self.projection
            .scale(self.scale)
            .project_aabb(entry.bounds())
            .translated(Vec2::new(shift.x as f32, shift.y as f32))
            .round()
    }
}

/// Per-frame decoration of a scene buffer
pub trait SceneBufferEffect: Send + Sync {
    /// Paint before any component
    fn render_underlay(
        &self,
        _target: &mut dyn RenderTarget,
        _x: i32,
        _y: i32,
        _scale: f32,
        _bounds: Rect2I,
        _projection: &Projection,
    ) {
    }

    /// Paint after every component
    fn render_overlay(
        &self,
        _target: &mut dyn RenderTarget,
        _x: i32,
        _y: i32,
        _scale: f32,
        _bounds: Rect2I,
        _projection: &Projection,
    ) {
    }

    /// Passes to draw the component with; empty leaves the draw untouched
    fn component_effects(&self, context: &ComponentContext<'_>) -> Vec<Box<dyn ComponentEffect>>;
}

/// Hooks around one draw of one component
pub trait ComponentEffect {
    /// Called right before the draw
    fn prerender(&mut self, target: &mut dyn RenderTarget);

    /// Called right after the draw
    fn postrender(&mut self, target: &mut dyn RenderTarget);
}

/// Fades whatever is drawn over the tracked entity
///
/// A component that has a component of the tracked entity beneath it is drawn
/// twice: once clipped to everything outside a reveal region around the
/// tracked component, and once inside that region at reduced opacity.
#[derive(Debug, Clone, Copy)]
pub struct HideEntityObstructionsEffect {
    entity: EntityId,
    alpha: f32,
}

impl HideEntityObstructionsEffect {
    /// Track `entity`, fading obstructions to `alpha`
    pub fn new(entity: EntityId, alpha: f32) -> Self {
        Self {
            entity,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    fn is_tracked(&self, entry: &SceneBufferEntry) -> bool {
        entry.dispatcher().is_some_and(|e| e.id() == self.entity)
    }

    /// Screen region around the tracked component that obstructions are faded in
    fn reveal_region(bounds: Rect2I) -> Rect2I {
        let padding_x = bounds.width;
        let padding_y = bounds.height / 4;
        Rect2I::new(
            bounds.x - padding_x,
            bounds.y - padding_y,
            bounds.width + 2 * padding_x,
            bounds.height + 2 * padding_y,
        )
    }
}

impl SceneBufferEffect for HideEntityObstructionsEffect {
    fn component_effects(&self, context: &ComponentContext<'_>) -> Vec<Box<dyn ComponentEffect>> {
        if self.is_tracked(context.subject) {
            return Vec::new();
        }
        let Some(tracked) = context.beneath.iter().find(|e| self.is_tracked(e)) else {
            return Vec::new();
        };

        let region = Self::reveal_region(context.screen_bounds(tracked));
        vec![
            Box::new(RevealPass { region, alpha: None }),
            Box::new(RevealPass { region, alpha: Some(self.alpha) }),
        ]
    }
}

/// Clip to outside the region, or inside it at reduced opacity when `alpha` is set
struct RevealPass {
    region: Rect2I,
    alpha: Option<f32>,
}

impl ComponentEffect for RevealPass {
    fn prerender(&mut self, target: &mut dyn RenderTarget) {
        match self.alpha {
            Some(alpha) => {
                target.push_clip(Clip::Inside(self.region));
                target.push_alpha(alpha);
            }
            None => target.push_clip(Clip::Outside(self.region)),
        }
    }

    fn postrender(&mut self, target: &mut dyn RenderTarget) {
        if self.alpha.is_some() {
            target.pop_alpha();
        }
        target.pop_clip();
    }
}
