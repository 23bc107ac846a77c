//! Fiducial tag observations and the detector seam.
//!
//! Detection itself is pluggable: the locator consumes whatever implements
//! [`TagDetector`]. The `apriltag` feature binds the AprilTag library; tests
//! script detections directly.

use board_vision_core::GrayFrameView;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "apriltag")]
mod apriltag_detector;

#[cfg(feature = "apriltag")]
pub use apriltag_detector::{AprilTagDetector, TagBackendError};

/// One detected fiducial marker: its dictionary id and 4 corner points in
/// pixel coordinates, in the detector's consistent winding order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagDetection {
    pub id: u32,
    pub corners: [Point2<f32>; 4],
}

impl TagDetection {
    /// Corner point by index; `None` past the 4 tag corners.
    #[inline]
    pub fn corner(&self, index: usize) -> Option<Point2<f32>> {
        self.corners.get(index).copied()
    }
}

/// Detect fiducial markers in a normalized grayscale frame.
///
/// Detections are re-computed per localization call; implementations keep no
/// cross-frame state of their own.
pub trait TagDetector {
    fn detect(&mut self, frame: &GrayFrameView<'_>) -> Vec<TagDetection>;
}

impl<F> TagDetector for F
where
    F: FnMut(&GrayFrameView<'_>) -> Vec<TagDetection>,
{
    fn detect(&mut self, frame: &GrayFrameView<'_>) -> Vec<TagDetection> {
        self(frame)
    }
}
