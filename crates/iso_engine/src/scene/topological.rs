//! Depth-sorted scene buffer
//!
//! Components are ordered for a painter's algorithm by a topological sort of
//! the "is behind" relation between their world boxes. Edges are only built
//! between components whose projected screen boxes overlap, since components
//! that cannot cover each other need no relative order.
//!
//! ```text
//! add_model ──► vertices ──► edges (parallel) ──► DFS order ──► render / pick
//!                              │ cancelled
//!                              └──────────► empty frame
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;

use super::{
    ComponentContext, ComponentEffect, Projection, RenderTarget, SceneBuffer, SceneBufferEffect,
    SceneBufferEntry, SceneModel,
};
use crate::config::SceneConfig;
use crate::foundation::math::{round2, Rect2, Rect2I, Vec2, Vec2i, Vec3, AABB};
use crate::world::EntityRef;
use crate::SceneError;

/// Shared flag used to abandon an in-flight sort
///
/// Cancelling drops the frame being sorted; the buffer stays dirty, so the
/// next render or pick after [`CancellationToken::reset`] sorts again.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear a previous cancellation
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// `a` lies entirely on the near side of `b.max` on every axis
fn is_behind(a: &AABB, b: &AABB, epsilon: f32) -> bool {
    let gap = a.min - b.max;
    gap.x < -epsilon && gap.y < -epsilon && gap.z < -epsilon
}

/// Whether two projected footprints can cover each other
///
/// A footprint without area only meets a footprint covering the same rectangle.
fn projected_overlap(a: &Rect2, b: &Rect2, epsilon: f32) -> bool {
    if !a.has_area(epsilon) || !b.has_area(epsilon) {
        return a.approx_eq(b, epsilon);
    }
    a.x + a.width - b.x > epsilon
        && b.x + b.width - a.x > epsilon
        && a.y + a.height - b.y > epsilon
        && b.y + b.height - a.y > epsilon
}

/// Entries `subject` must be drawn after, in insertion order
fn dependencies_of(entries: &[SceneBufferEntry], subject: usize, epsilon: f32) -> Vec<usize> {
    let target = &entries[subject];
    entries
        .iter()
        .enumerate()
        .filter(|(other, entry)| {
            *other != subject
                && projected_overlap(target.projected(), entry.projected(), epsilon)
                && is_behind(entry.bounds(), target.bounds(), epsilon)
        })
        .map(|(other, _)| other)
        .collect()
}

/// Depth-first topological order: every vertex follows all of its dependencies
///
/// Roots are taken in insertion order and dependencies are visited in
/// insertion order, which breaks ties and cycles deterministically.
fn topological_order(beneath: &[Vec<usize>]) -> Vec<usize> {
    let mut visited = vec![false; beneath.len()];
    let mut order = Vec::with_capacity(beneath.len());
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..beneath.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let (vertex, cursor) = *top;
            if let Some(&dependency) = beneath[vertex].get(cursor) {
                top.1 += 1;
                if !visited[dependency] {
                    visited[dependency] = true;
                    stack.push((dependency, 0));
                }
            } else {
                stack.pop();
                order.push(vertex);
            }
        }
    }
    order
}

/// Scene buffer that draws components in a depth-correct order
pub struct TopologicalSceneBuffer {
    projection: Projection,
    epsilon: f32,
    translation: Vec2i,
    entries: Vec<SceneBufferEntry>,
    beneath: Vec<Vec<usize>>,
    sorted: Vec<usize>,
    dirty: bool,
    effects: Vec<Arc<dyn SceneBufferEffect>>,
    pool: ThreadPool,
    cancellation: CancellationToken,
}

impl TopologicalSceneBuffer {
    /// Create a buffer for `projection`, with tolerances and worker count from `config`
    pub fn new(projection: Projection, config: &SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let workers = config.resolved_worker_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("scene-sort-{index}"))
            .build()
            .map_err(|e| SceneError::ThreadPool(e.to_string()))?;
        log::info!("Scene buffer sorting with {workers} worker(s)");

        Ok(Self {
            projection,
            epsilon: config.depth_epsilon,
            translation: Vec2i::zeros(),
            entries: Vec::new(),
            beneath: Vec::new(),
            sorted: Vec::new(),
            dirty: false,
            effects: Vec::new(),
            pool,
            cancellation: CancellationToken::new(),
        })
    }

    /// Create a buffer with the isometric projection described by `config`
    pub fn isometric(config: &SceneConfig) -> Result<Self, SceneError> {
        let projection = Projection::isometric(config.tile_width, config.tile_height)?;
        Self::new(projection, config)
    }

    /// Projection at unit scale
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Token that abandons the dependency construction when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Number of queued components
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued entries in draw order, sorting first if needed
    pub fn sorted_entries(&mut self) -> Vec<&SceneBufferEntry> {
        self.sort();
        self.sorted.iter().map(|&index| &self.entries[index]).collect()
    }

    /// Entries `index` is drawn over, valid after a sort
    pub fn beneath(&self, index: usize) -> Vec<&SceneBufferEntry> {
        self.beneath
            .get(index)
            .map(|ins| ins.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    fn build_dependencies(&self) -> Option<Vec<Vec<usize>>> {
        let entries = &self.entries;
        let epsilon = self.epsilon;
        let cancellation = &self.cancellation;

        self.pool.install(|| {
            (0..entries.len())
                .into_par_iter()
                .map(|subject| {
                    if cancellation.is_cancelled() {
                        return None;
                    }
                    Some(dependencies_of(entries, subject, epsilon))
                })
                .collect()
        })
    }

    fn sort(&mut self) {
        if !self.dirty {
            return;
        }
        self.sorted.clear();
        self.beneath.clear();

        let Some(beneath) = self.build_dependencies() else {
            log::warn!("Scene sort cancelled, dropping {} component(s)", self.entries.len());
            return;
        };

        let edges: usize = beneath.iter().map(Vec::len).sum();
        log::debug!("Sorted {} component(s) with {edges} edge(s)", self.entries.len());

        self.sorted = topological_order(&beneath);
        self.beneath = beneath;
        self.dirty = false;
    }

    #[allow(clippy::cast_precision_loss)]
    fn render_entry(
        &self,
        target: &mut dyn RenderTarget,
        index: usize,
        x: i32,
        y: i32,
        scale: f32,
    ) {
        let entry = &self.entries[index];
        let render_location = self.world_to_screen(entry.location(), scale);
        let beneath: Vec<&SceneBufferEntry> =
            self.beneath[index].iter().map(|&i| &self.entries[i]).collect();
        let context = ComponentContext {
            subject: entry,
            beneath: &beneath,
            offset: Vec2i::new(x, y),
            scale,
            render_location,
            projection: &self.projection,
            translation: self.translation,
        };

        let mut queues: Vec<VecDeque<Box<dyn ComponentEffect>>> = self
            .effects
            .iter()
            .map(|effect| VecDeque::from(effect.component_effects(&context)))
            .filter(|queue| !queue.is_empty())
            .collect();

        loop {
            let mut pass: Vec<Box<dyn ComponentEffect>> =
                queues.iter_mut().filter_map(VecDeque::pop_front).collect();
            queues.retain(|queue| !queue.is_empty());

            for effect in &mut pass {
                effect.prerender(target);
            }
            entry
                .component()
                .render(target, render_location.x + x, render_location.y + y, scale);
            for effect in pass.iter_mut().rev() {
                effect.postrender(target);
            }

            if queues.is_empty() {
                break;
            }
        }
    }
}

impl SceneBuffer for TopologicalSceneBuffer {
    fn add_model(&mut self, model: &dyn SceneModel, dispatcher: Option<EntityRef>, location: Vec3) {
        self.dirty = true;
        for component in model.components(&self.projection) {
            self.entries.push(SceneBufferEntry::new(
                component,
                dispatcher.clone(),
                location,
                &self.projection,
                self.translation,
            ));
        }
    }

    fn add_effect(&mut self, effect: Arc<dyn SceneBufferEffect>) {
        self.effects.push(effect);
    }

    fn reset(&mut self) {
        self.dirty = false;
        self.entries.clear();
        self.beneath.clear();
        self.sorted.clear();
        self.effects.clear();
        self.translation = Vec2i::zeros();
    }

    fn translate(&mut self, offset: Vec2i) {
        self.translation += offset;
    }

    fn render(
        &mut self,
        target: &mut dyn RenderTarget,
        x: i32,
        y: i32,
        scale: f32,
        bounds: Rect2I,
    ) {
        for effect in &self.effects {
            effect.render_underlay(target, x, y, scale, bounds, &self.projection);
        }

        self.sort();
        for &index in &self.sorted {
            self.render_entry(target, index, x, y, scale);
        }

        for effect in &self.effects {
            effect.render_overlay(target, x, y, scale, bounds, &self.projection);
        }
    }

    fn pick_where(
        &mut self,
        x: i32,
        y: i32,
        scale: f32,
        filter: &dyn Fn(&EntityRef) -> bool,
    ) -> Option<EntityRef> {
        self.sort();
        self.sorted.iter().rev().find_map(|&index| {
            let entry = &self.entries[index];
            let dispatcher = entry.dispatcher()?;
            let anchor = self.world_to_screen(entry.location(), scale);
            let hit = filter(dispatcher)
                && entry.component().test_pick(x - anchor.x, y - anchor.y, scale);
            hit.then(|| Arc::clone(dispatcher))
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn world_to_screen(&self, location: Vec3, scale: f32) -> Vec2i {
        let projected = self.projection.scale(scale).project(location).xy();
        let translation = Vec2::new(self.translation.x as f32, self.translation.y as f32);
        round2(projected + translation)
    }

    #[allow(clippy::cast_precision_loss)]
    fn screen_to_world(&self, screen: Vec3, scale: f32) -> Vec2 {
        let unpanned = Vec3::new(
            screen.x - self.translation.x as f32,
            screen.y - self.translation.y as f32,
            screen.z,
        );
        self.projection.scale(scale).inverse().project(unpanned).xy()
    }
}

impl std::fmt::Debug for TopologicalSceneBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologicalSceneBuffer")
            .field("entries", &self.entries.len())
            .field("sorted", &self.sorted.len())
            .field("dirty", &self.dirty)
            .field("translation", &self.translation)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}
