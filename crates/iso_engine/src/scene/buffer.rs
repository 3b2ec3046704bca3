//! Scene buffer interface and its entries

use std::sync::Arc;

use super::{ModelComponent, Projection, RenderTarget, SceneBufferEffect, SceneModel};
use crate::foundation::math::{Rect2, Rect2I, Vec2, Vec2i, Vec3, AABB};
use crate::world::EntityRef;

/// One component queued for the current frame
#[derive(Clone)]
pub struct SceneBufferEntry {
    component: Arc<dyn ModelComponent>,
    dispatcher: Option<EntityRef>,
    bounds: AABB,
    projected: Rect2,
    location: Vec3,
}

impl SceneBufferEntry {
    /// Place `component` of an entity located at `location`
    ///
    /// World bounds are the component bounds moved to `location`; the screen
    /// anchor additionally includes the component origin. The projected box
    /// is shifted by the buffer's current pan `translation`.
    pub fn new(
        component: Arc<dyn ModelComponent>,
        dispatcher: Option<EntityRef>,
        location: Vec3,
        projection: &Projection,
        translation: Vec2i,
    ) -> Self {
        let bounds = component.bounds().translated(location);
        let projected = projection
            .project_aabb(&bounds)
            .translated(translation.cast::<f32>());
        let location = location + component.origin();

        Self {
            component,
            dispatcher,
            bounds,
            projected,
            location,
        }
    }

    /// Component to draw
    pub fn component(&self) -> &Arc<dyn ModelComponent> {
        &self.component
    }

    /// Entity the component belongs to, used for picking
    pub fn dispatcher(&self) -> Option<&EntityRef> {
        self.dispatcher.as_ref()
    }

    /// World-space bounds
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Screen-space footprint at unit scale
    pub fn projected(&self) -> &Rect2 {
        &self.projected
    }

    /// World-space anchor
    pub fn location(&self) -> Vec3 {
        self.location
    }
}

impl std::fmt::Debug for SceneBufferEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneBufferEntry")
            .field("component", &self.component.name())
            .field("dispatcher", &self.dispatcher.as_ref().map(|e| e.id()))
            .field("bounds", &self.bounds)
            .field("projected", &self.projected)
            .finish()
    }
}

/// Frame-scoped collection of components that can be drawn and picked
///
/// Lifecycle per frame: [`SceneBuffer::reset`], any number of
/// [`SceneBuffer::add_model`] calls, then [`SceneBuffer::render`] and
/// [`SceneBuffer::pick_where`] as often as needed.
pub trait SceneBuffer {
    /// Queue every component of `model` at `location`
    fn add_model(&mut self, model: &dyn SceneModel, dispatcher: Option<EntityRef>, location: Vec3);

    /// Wrap component draws with `effect` until the next reset
    fn add_effect(&mut self, effect: Arc<dyn SceneBufferEffect>);

    /// Drop every queued component, effect and the pan
    fn reset(&mut self);

    /// Accumulate a screen-space pan
    fn translate(&mut self, offset: Vec2i);

    /// Draw every queued component, back to front, offset by `(x, y)`
    fn render(
        &mut self,
        target: &mut dyn RenderTarget,
        x: i32,
        y: i32,
        scale: f32,
        bounds: Rect2I,
    );

    /// Topmost dispatcher whose component accepts the point and that passes `filter`
    fn pick_where(
        &mut self,
        x: i32,
        y: i32,
        scale: f32,
        filter: &dyn Fn(&EntityRef) -> bool,
    ) -> Option<EntityRef>;

    /// Screen position of the world point `location`
    fn world_to_screen(&self, location: Vec3, scale: f32) -> Vec2i;

    /// World x/y under the screen point; `screen.z` carries the depth to unproject at
    fn screen_to_world(&self, screen: Vec3, scale: f32) -> Vec2;

    /// Topmost dispatcher of concrete type `T` at the point
    fn pick<T: 'static>(&mut self, x: i32, y: i32, scale: f32) -> Option<EntityRef>
    where
        Self: Sized,
    {
        self.pick_where(x, y, scale, &|entity| entity.as_any().is::<T>())
    }
}
