//! Frame normalization: fixed rotation about the frame center plus a pixel
//! translation.
//!
//! The camera is mounted at an angle relative to the board, so every captured
//! frame is normalized by the same affine correction before any detection or
//! comparison runs. This is not a perspective correction; the downstream grid
//! deliberately works on the axis-aligned approximation.

use crate::frame::{sample_bilinear_u8, GrayFrame};
use nalgebra::{Point2, Rotation2, Vector2};

/// Rotation (degrees, counterclockwise, about the frame center) and pixel
/// translation applied to every captured frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameTransform {
    rotation: Rotation2<f32>,
    inverse: Rotation2<f32>,
    translation: Vector2<f32>,
}

impl FrameTransform {
    pub fn new(rotation_deg: f32, translation: (f32, f32)) -> Self {
        // Screen y points down, so a mathematically negative angle reads as
        // counterclockwise on screen (matching the usual CV convention).
        let rotation = Rotation2::new(-rotation_deg.to_radians());
        Self {
            rotation,
            inverse: rotation.inverse(),
            translation: Vector2::new(translation.0, translation.1),
        }
    }

    /// Identity transform (tests, pre-normalized replay footage).
    pub fn identity() -> Self {
        Self::new(0.0, (0.0, 0.0))
    }

    /// Where the forward correction sends a source-frame point.
    #[inline]
    pub fn map_point(&self, p: Point2<f32>, center: Point2<f32>) -> Point2<f32> {
        center + self.rotation * (p - center) + self.translation
    }

    /// Warp a frame by inverse mapping with bilinear sampling. Output has the
    /// same dimensions; pixels pulled from outside the source read 0.
    pub fn apply(&self, src: &GrayFrame) -> GrayFrame {
        let center = Point2::new(src.width as f32 / 2.0, src.height as f32 / 2.0);
        let view = src.view();
        let mut out = GrayFrame::new(src.width, src.height);
        for y in 0..src.height {
            for x in 0..src.width {
                let dst = Point2::new(x as f32, y as f32);
                let s = center + self.inverse * (dst - self.translation - center);
                out.set(x, y, sample_bilinear_u8(&view, s.x, s.y));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_is_a_noop() {
        let src = GrayFrame::from_fn(8, 6, |x, y| (x * 7 + y * 13) as u8);
        let out = FrameTransform::identity().apply(&src);
        assert_eq!(out, src);
    }

    #[test]
    fn quarter_turn_moves_a_bright_pixel() {
        // A single bright pixel right of center lands above center after a
        // 90 degree counterclockwise turn (y axis points down). 20x20 keeps
        // the rotation center on an integer pixel.
        let mut src = GrayFrame::new(20, 20);
        src.set(15, 10, 255);
        let t = FrameTransform::new(90.0, (0.0, 0.0));
        let out = t.apply(&src);
        assert!(out.get(10, 5) > 200, "got {}", out.get(10, 5));
        assert_eq!(out.get(15, 10), 0);
    }

    #[test]
    fn translation_shifts_content() {
        let mut src = GrayFrame::new(10, 10);
        src.set(2, 3, 200);
        let t = FrameTransform::new(0.0, (4.0, 1.0));
        let out = t.apply(&src);
        assert_eq!(out.get(6, 4), 200);
    }

    #[test]
    fn map_point_matches_inverse_warp() {
        let t = FrameTransform::new(110.0, (-250.0, -50.0));
        let center = Point2::new(320.0, 240.0);
        let p = Point2::new(100.0, 80.0);
        let fwd = t.map_point(p, center);
        // map_point then the inverse used by apply() must return to p.
        let back = center + t.inverse * (fwd - t.translation - center);
        assert_relative_eq!(back.x, p.x, epsilon = 1e-3);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-3);
    }
}
