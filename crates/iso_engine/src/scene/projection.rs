//! World → screen projection

use crate::foundation::math::{Mat3, Rect2, Vec3, AABB};
use crate::SceneError;

/// Smallest scale factor a projection accepts
pub const MIN_SCALE: f32 = 1.0e-4;

/// Fixed linear transform from world space to screen space
///
/// Screen x/y are the first two rows of `matrix * world`; the third row
/// carries depth and is ignored when drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    matrix: Mat3,
    inverse: Mat3,
}

impl Projection {
    /// Wrap `matrix`, rejecting matrices that cannot be inverted
    pub fn new(matrix: Mat3) -> Result<Self, SceneError> {
        let inverse = matrix.try_inverse().ok_or(SceneError::SingularProjection)?;
        Ok(Self { matrix, inverse })
    }

    /// Classic 2:1 style isometric projection for tiles of the given pixel size
    ///
    /// Moving one tile along +x goes right and down, one tile along +y goes
    /// left and down, and one unit of height goes up by a full tile height.
    pub fn isometric(tile_width: f32, tile_height: f32) -> Result<Self, SceneError> {
        let half_width = tile_width / 2.0;
        let half_height = tile_height / 2.0;
        Self::new(Mat3::new(
            half_width, -half_width, 0.0,
            half_height, half_height, -tile_height,
            0.0, 0.0, 1.0,
        ))
    }

    /// Forward matrix
    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    /// Projection with every element multiplied by `factor`
    ///
    /// Factors closer to zero than [`MIN_SCALE`] are clamped so the result
    /// stays invertible.
    #[must_use]
    pub fn scale(&self, factor: f32) -> Self {
        let factor = if factor.abs() < MIN_SCALE {
            MIN_SCALE.copysign(factor)
        } else {
            factor
        };
        Self {
            matrix: self.matrix * factor,
            inverse: self.inverse / factor,
        }
    }

    /// Screen → world projection
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            matrix: self.inverse,
            inverse: self.matrix,
        }
    }

    /// Apply the projection to `point`
    pub fn project(&self, point: Vec3) -> Vec3 {
        self.matrix * point
    }

    /// Screen-space rectangle enclosing every projected corner of `aabb`
    pub fn project_aabb(&self, aabb: &AABB) -> Rect2 {
        Rect2::enclosing(aabb.corners().into_iter().map(|corner| self.project(corner).xy()))
    }
}
