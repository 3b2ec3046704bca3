//! Math utilities and types
//!
//! Provides the vector/matrix aliases and the bounding volumes shared by the
//! scene graph and the scene buffer.

pub use nalgebra::{Matrix3, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 2D integer vector type (tile and sector coordinates, screen pixels)
pub type Vec2i = Vector2<i32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// Tolerance used when comparing rectangle extents
pub const TOLERANCE: f32 = 1.0e-6;

/// Axis-Aligned Bounding Box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    ///
    /// Corners are reordered per axis, so a malformed box is clamped
    /// into a valid one instead of being rejected.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.inf(&max),
            max: min.sup(&max),
        }
    }

    /// Create an AABB anchored at the origin with the given size
    pub fn from_size(size: Vec3) -> Self {
        Self::new(Vec3::zeros(), size)
    }

    /// Get the size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Return this box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Every corner of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Footprint of the box on the XY plane
    pub fn xy(&self) -> Rect2 {
        Rect2::from_min_max(self.min.xy(), self.max.xy())
    }
}

/// Floating point rectangle (origin + extent)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect2 {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl Rect2 {
    /// Create a rectangle from its origin and extent
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create the rectangle spanning two corners
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        let lo = min.inf(&max);
        let hi = min.sup(&max);
        Self::new(lo.x, lo.y, hi.x - lo.x, hi.y - lo.y)
    }

    /// Smallest rectangle containing every point
    ///
    /// Returns an empty rectangle at the origin when no points are given.
    pub fn enclosing(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::default();
        };
        let (lo, hi) = points.fold((first, first), |(lo, hi), p| (lo.inf(&p), hi.sup(&p)));
        Self::from_min_max(lo, hi)
    }

    /// Top-left corner
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bottom-right corner
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Whether both extents are larger than `epsilon`
    pub fn has_area(&self, epsilon: f32) -> bool {
        self.width > epsilon && self.height > epsilon
    }

    /// Strict overlap test: rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect2) -> bool {
        self.x + self.width > other.x &&
        self.y + self.height > other.y &&
        self.x < other.x + other.width &&
        self.y < other.y + other.height
    }

    /// Inclusive containment test (points on the edge are contained)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x - self.x <= self.width &&
        point.y >= self.y && point.y - self.y <= self.height
    }

    /// Component-wise comparison within `epsilon`
    pub fn approx_eq(&self, other: &Rect2, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon &&
        (self.y - other.y).abs() <= epsilon &&
        (self.width - other.width).abs() <= epsilon &&
        (self.height - other.height).abs() <= epsilon
    }

    /// Return this rectangle moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Return this rectangle with both corners multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self::from_min_max(self.min() * factor, self.max() * factor)
    }

    /// Smallest grid rectangle covering this one (floored origin, ceiled far corner)
    pub fn covering_grid(&self) -> Rect2I {
        let lo = floor2(self.min());
        let hi = ceil2(self.max());
        Rect2I::new(lo.x, lo.y, hi.x - lo.x, hi.y - lo.y)
    }

    /// Round origin and extent to the nearest integers
    #[allow(clippy::cast_possible_truncation)]
    pub fn round(&self) -> Rect2I {
        Rect2I::new(
            self.x.round() as i32,
            self.y.round() as i32,
            self.width.round() as i32,
            self.height.round() as i32,
        )
    }
}

/// Integer rectangle (origin + extent), used for tile regions and screen bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect2I {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Horizontal extent
    pub width: i32,
    /// Vertical extent
    pub height: i32,
}

impl Rect2I {
    /// Create a rectangle from its origin and extent
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Vec2i) -> bool {
        point.x >= self.x && point.x - self.x <= self.width &&
        point.y >= self.y && point.y - self.y <= self.height
    }

    /// Whether the rectangles share at least an edge
    pub fn intersects(&self, other: &Rect2I) -> bool {
        self.x <= other.x + other.width &&
        other.x <= self.x + self.width &&
        self.y <= other.y + other.height &&
        other.y <= self.y + self.height
    }

    /// Region shared by both rectangles, or an empty rectangle when disjoint
    pub fn overlapping(&self, other: &Rect2I) -> Rect2I {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let width = (self.x + self.width).min(other.x + other.width) - x;
        let height = (self.y + self.height).min(other.y + other.height) - y;

        if width < 0 || height < 0 {
            return Rect2I::default();
        }

        Rect2I::new(x, y, width, height)
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect2I) -> Rect2I {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect2I::new(x, y, right - x, bottom - y)
    }

    /// Convert to a floating rectangle
    #[allow(clippy::cast_precision_loss)]
    pub fn to_rect2(&self) -> Rect2 {
        Rect2::new(self.x as f32, self.y as f32, self.width as f32, self.height as f32)
    }
}

/// Floor a 2D point onto the integer grid
#[allow(clippy::cast_possible_truncation)]
pub fn floor2(v: Vec2) -> Vec2i {
    Vec2i::new(v.x.floor() as i32, v.y.floor() as i32)
}

/// Ceil a 2D point onto the integer grid
#[allow(clippy::cast_possible_truncation)]
pub fn ceil2(v: Vec2) -> Vec2i {
    Vec2i::new(v.x.ceil() as i32, v.y.ceil() as i32)
}

/// Round a 2D point onto the integer grid
#[allow(clippy::cast_possible_truncation)]
pub fn round2(v: Vec2) -> Vec2i {
    Vec2i::new(v.x.round() as i32, v.y.round() as i32)
}
