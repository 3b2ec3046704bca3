//! Concrete search filters

use nalgebra::Matrix2;

use super::SearchFilter;
use crate::foundation::math::{Rect2, Rect2I, Vec2, TOLERANCE};

/// Disc of `radius` around `center`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialSearchFilter {
    center: Vec2,
    radius: f32,
}

impl RadialSearchFilter {
    /// Create a disc filter. A negative radius is treated as zero.
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius: radius.max(0.0) }
    }
}

impl SearchFilter for RadialSearchFilter {
    #[allow(clippy::cast_possible_truncation)]
    fn search_bounds(&self) -> Rect2I {
        let diameter = (self.radius * 2.0).ceil() as i32;
        Rect2I::new(
            (self.center.x - self.radius).floor() as i32,
            (self.center.y - self.radius).floor() as i32,
            diameter,
            diameter,
        )
    }

    fn should_include(&self, location: Vec2) -> bool {
        (location - self.center).norm() <= self.radius
    }
}

/// Axis-aligned rectangle, edges included
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleSearchFilter {
    rect: Rect2,
}

impl RectangleSearchFilter {
    /// Create a rectangle filter
    pub fn new(rect: Rect2) -> Self {
        Self { rect }
    }
}

impl SearchFilter for RectangleSearchFilter {
    fn search_bounds(&self) -> Rect2I {
        self.rect.round()
    }

    fn should_include(&self, location: Vec2) -> bool {
        self.rect.contains(location)
    }
}

/// Views `inner` from a frame whose origin sits at `offset` in the inner frame
///
/// A location `l` in the new frame is the location `l + offset` for `inner`.
#[derive(Debug, Clone)]
pub struct TranslatedSearchFilter<F> {
    inner: F,
    offset: Vec2,
}

impl<F: SearchFilter> TranslatedSearchFilter<F> {
    /// Wrap `inner`
    pub fn new(inner: F, offset: Vec2) -> Self {
        Self { inner, offset }
    }
}

impl<F: SearchFilter> SearchFilter for TranslatedSearchFilter<F> {
    fn search_bounds(&self) -> Rect2I {
        self.inner
            .search_bounds()
            .to_rect2()
            .translated(-self.offset)
            .covering_grid()
    }

    fn should_include(&self, location: Vec2) -> bool {
        self.inner.should_include(location + self.offset)
    }
}

/// Views `inner` from a frame stretched by `scale`
///
/// A location `l` in the new frame is the location `l / scale` for `inner`.
#[derive(Debug, Clone)]
pub struct ScaledSearchFilter<F> {
    inner: F,
    scale: f32,
}

impl<F: SearchFilter> ScaledSearchFilter<F> {
    /// Wrap `inner`
    pub fn new(inner: F, scale: f32) -> Self {
        Self { inner, scale }
    }
}

impl<F: SearchFilter> SearchFilter for ScaledSearchFilter<F> {
    fn search_bounds(&self) -> Rect2I {
        self.inner
            .search_bounds()
            .to_rect2()
            .scaled(self.scale)
            .covering_grid()
    }

    fn should_include(&self, location: Vec2) -> bool {
        if self.scale.abs() <= TOLERANCE {
            return false;
        }
        self.inner.should_include(location / self.scale)
    }
}

/// Complement of `inner` within its own search bounds
#[derive(Debug, Clone)]
pub struct NotSearchFilter<F> {
    inner: F,
}

impl<F: SearchFilter> NotSearchFilter<F> {
    /// Wrap `inner`
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F: SearchFilter> SearchFilter for NotSearchFilter<F> {
    fn search_bounds(&self) -> Rect2I {
        self.inner.search_bounds()
    }

    fn should_include(&self, location: Vec2) -> bool {
        !self.inner.should_include(location)
    }
}

/// Boolean combinator for [`BinarySearchFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperation {
    /// Both filters include the location
    And,
    /// Either filter includes the location
    Or,
    /// Not both
    Nand,
    /// Neither
    Nor,
    /// Exactly one
    Xor,
}

impl BinaryOperation {
    fn apply(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
            Self::Nand => !(a && b),
            Self::Nor => !(a || b),
            Self::Xor => a ^ b,
        }
    }
}

/// Combines two filters; the search bounds are the union of both
#[derive(Debug, Clone)]
pub struct BinarySearchFilter<A, B> {
    a: A,
    b: B,
    operation: BinaryOperation,
}

impl<A: SearchFilter, B: SearchFilter> BinarySearchFilter<A, B> {
    /// Combine `a` and `b` with `operation`
    pub fn new(a: A, b: B, operation: BinaryOperation) -> Self {
        Self { a, b, operation }
    }
}

impl<A: SearchFilter, B: SearchFilter> SearchFilter for BinarySearchFilter<A, B> {
    fn search_bounds(&self) -> Rect2I {
        self.a.search_bounds().union(&self.b.search_bounds())
    }

    fn should_include(&self, location: Vec2) -> bool {
        self.operation
            .apply(self.a.should_include(location), self.b.should_include(location))
    }
}

/// Filled triangle, tested in barycentric coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleSearchFilter {
    vertices: [Vec2; 3],
    to_barycentric: Option<Matrix2<f32>>,
}

impl TriangleSearchFilter {
    /// Triangle through `a`, `b` and `c`. A degenerate triangle includes nothing.
    pub fn new(a: Vec2, b: Vec2, c: Vec2) -> Self {
        let edges = Matrix2::new(c.x - a.x, b.x - a.x, c.y - a.y, b.y - a.y);
        Self {
            vertices: [a, b, c],
            to_barycentric: edges.try_inverse(),
        }
    }
}

impl SearchFilter for TriangleSearchFilter {
    fn search_bounds(&self) -> Rect2I {
        Rect2::enclosing(self.vertices).covering_grid()
    }

    fn should_include(&self, location: Vec2) -> bool {
        let Some(to_barycentric) = self.to_barycentric else {
            return false;
        };
        let v = to_barycentric * (location - self.vertices[0]);
        v.x >= 0.0 && v.y >= 0.0 && v.x + v.y <= 1.0
    }
}
