//! Cell quadrilaterals and their pixel bounds.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Inclusive-exclusive pixel range covered by a cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl PixelBounds {
    /// Integer pixel columns covered, clamped to `0..width`.
    #[inline]
    pub fn x_range(&self, width: usize) -> std::ops::Range<usize> {
        let lo = (self.min_x.max(0.0) as usize).min(width);
        let hi = (self.max_x.max(0.0) as usize).min(width);
        lo..hi
    }

    /// Integer pixel rows covered, clamped to `0..height`.
    #[inline]
    pub fn y_range(&self, height: usize) -> std::ops::Range<usize> {
        let lo = (self.min_y.max(0.0) as usize).min(height);
        let hi = (self.max_y.max(0.0) as usize).min(height);
        lo..hi
    }
}

/// One grid cell as a 4-point polygon in pixel space.
///
/// Corners are stored in lattice winding order: top-left, bottom-left,
/// bottom-right, top-right. The grid construction only ever produces
/// axis-aligned quads, so `bounds()` is exact, not an approximation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellQuad {
    pub corners: [Point2<f32>; 4],
}

impl CellQuad {
    pub fn new(corners: [Point2<f32>; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned rectangle from two opposite corners.
    pub fn axis_aligned(min: Point2<f32>, max: Point2<f32>) -> Self {
        Self {
            corners: [
                Point2::new(min.x, min.y),
                Point2::new(min.x, max.y),
                Point2::new(max.x, max.y),
                Point2::new(max.x, min.y),
            ],
        }
    }

    pub fn bounds(&self) -> PixelBounds {
        let mut b = PixelBounds {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        };
        for c in &self.corners {
            b.min_x = b.min_x.min(c.x);
            b.min_y = b.min_y.min(c.y);
            b.max_x = b.max_x.max(c.x);
            b.max_y = b.max_y.max(c.y);
        }
        b
    }

    /// Cell center, used for overlays and adjacency checks.
    pub fn center(&self) -> Point2<f32> {
        let b = self.bounds();
        Point2::new((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_axis_aligned_quad() {
        let q = CellQuad::axis_aligned(Point2::new(10.0, 20.0), Point2::new(30.0, 50.0));
        let b = q.bounds();
        assert_eq!(b.min_x, 10.0);
        assert_eq!(b.max_y, 50.0);
        assert_eq!(q.center(), Point2::new(20.0, 35.0));
    }

    #[test]
    fn ranges_clamp_to_frame() {
        let q = CellQuad::axis_aligned(Point2::new(-5.0, 90.0), Point2::new(12.0, 140.0));
        let b = q.bounds();
        assert_eq!(b.x_range(100), 0..12);
        assert_eq!(b.y_range(100), 90..100);
    }
}
