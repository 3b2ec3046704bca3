//! Region predicates used to restrict spatial queries
//!
//! A [`SearchFilter`] answers two questions: which grid cells are worth
//! visiting at all ([`SearchFilter::search_bounds`]) and whether a given
//! location inside those bounds belongs to the region
//! ([`SearchFilter::should_include`]). Callers walk the bounds inclusively,
//! so a filter whose bounds are `(x, y, w, h)` is asked about every cell in
//! `x..=x + w` by `y..=y + h`.

mod filters;

pub use filters::{
    BinaryOperation, BinarySearchFilter, NotSearchFilter, RadialSearchFilter,
    RectangleSearchFilter, ScaledSearchFilter, TranslatedSearchFilter, TriangleSearchFilter,
};

use crate::foundation::math::{Rect2I, Vec2, Vec2i};

/// Predicate over a 2D region of the world
pub trait SearchFilter: Send + Sync {
    /// Grid rectangle enclosing every location this filter may include
    fn search_bounds(&self) -> Rect2I;

    /// Whether `location` lies inside the region
    fn should_include(&self, location: Vec2) -> bool;

    /// Every grid cell inside the search bounds that the filter includes, row by row
    #[allow(clippy::cast_precision_loss)]
    fn included_cells(&self) -> Vec<Vec2i> {
        let bounds = self.search_bounds();
        let mut cells = Vec::new();
        for y in bounds.y..=bounds.y + bounds.height {
            for x in bounds.x..=bounds.x + bounds.width {
                if self.should_include(Vec2::new(x as f32, y as f32)) {
                    cells.push(Vec2i::new(x, y));
                }
            }
        }
        cells
    }
}

impl<F: SearchFilter + ?Sized> SearchFilter for &F {
    fn search_bounds(&self) -> Rect2I {
        (**self).search_bounds()
    }

    fn should_include(&self, location: Vec2) -> bool {
        (**self).should_include(location)
    }
}

impl<F: SearchFilter + ?Sized> SearchFilter for Box<F> {
    fn search_bounds(&self) -> Rect2I {
        (**self).search_bounds()
    }

    fn should_include(&self, location: Vec2) -> bool {
        (**self).should_include(location)
    }
}
