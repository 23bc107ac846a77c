//! AprilTag detection backend.

use super::{TagDetection, TagDetector};
use board_vision_core::GrayFrameView;
use nalgebra::Point2;

#[derive(thiserror::Error, Debug)]
pub enum TagBackendError {
    #[error("apriltag detector init failed: {0}")]
    Init(String),
}

/// AprilTag detector over the tag36h11 family used on the board.
pub struct AprilTagDetector {
    detector: apriltag::Detector,
}

impl AprilTagDetector {
    pub fn new() -> Result<Self, TagBackendError> {
        let detector = apriltag::DetectorBuilder::new()
            .add_family_bits(apriltag::Family::tag_36h11(), 1)
            .build()
            .map_err(|e| TagBackendError::Init(e.to_string()))?;
        Ok(Self { detector })
    }
}

impl TagDetector for AprilTagDetector {
    fn detect(&mut self, frame: &GrayFrameView<'_>) -> Vec<TagDetection> {
        let mut image =
            match apriltag::Image::zeros_with_stride(frame.width, frame.height, frame.width) {
                Ok(image) => image,
                Err(e) => {
                    log::warn!("apriltag image alloc failed: {e}");
                    return Vec::new();
                }
            };
        for y in 0..frame.height {
            for x in 0..frame.width {
                image[(x, y)] = frame.data[y * frame.width + x];
            }
        }

        self.detector
            .detect(&image)
            .iter()
            .map(|det| {
                let c = det.corners();
                TagDetection {
                    id: det.id() as u32,
                    corners: [
                        Point2::new(c[0][0] as f32, c[0][1] as f32),
                        Point2::new(c[1][0] as f32, c[1][1] as f32),
                        Point2::new(c[2][0] as f32, c[2][1] as f32),
                        Point2::new(c[3][0] as f32, c[3][1] as f32),
                    ],
                }
            })
            .collect()
    }
}
