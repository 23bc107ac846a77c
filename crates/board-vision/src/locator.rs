//! Board localization: from fiducial tags to named corner points.

use crate::config::{BoardViewConfig, CornerName};
use crate::source::{CaptureError, FrameSource};
use crate::tags::TagDetector;
use board_vision_core::FrameTransform;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A physical board corner resolved from its fiducial tag.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardCorner {
    pub name: CornerName,
    pub position: Point2<f32>,
}

/// Localization errors. Recoverable at the turn level: re-prompt, adjust the
/// scene, and call again.
#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    #[error("saw {seen} of {required} required corner tags after {attempts} attempts")]
    TagsMissing {
        seen: usize,
        required: usize,
        attempts: usize,
    },
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Finds the configured corner tags in freshly captured frames.
///
/// A localization attempt captures one frame, normalizes it, runs tag
/// detection, and keys detections by their configured corner name. The
/// attempt succeeds only when exactly the required number of configured
/// corners resolve; otherwise the locator re-captures, up to the configured
/// attempt budget.
pub struct TagLocator<D> {
    config: BoardViewConfig,
    transform: FrameTransform,
    detector: D,
}

impl<D: TagDetector> TagLocator<D> {
    pub fn new(config: BoardViewConfig, detector: D) -> Self {
        let transform = FrameTransform::new(config.rotation_deg, config.translation);
        Self {
            config,
            transform,
            detector,
        }
    }

    #[inline]
    pub fn transform(&self) -> &FrameTransform {
        &self.transform
    }

    /// One localization pass with bounded retries.
    pub fn locate(&mut self, source: &mut impl FrameSource) -> Result<Vec<BoardCorner>, LocateError> {
        let required = self.config.required_tags;
        let mut last_seen = 0;

        for attempt in 1..=self.config.max_locate_attempts {
            let frame = self.transform.apply(&source.capture()?);
            let detections = self.detector.detect(&frame.view());

            let mut by_name: HashMap<CornerName, Point2<f32>> = HashMap::new();
            for tag in &detections {
                let Some(spec) = self.config.corner_for_tag(tag.id) else {
                    log::debug!("ignoring unconfigured tag id {}", tag.id);
                    continue;
                };
                let Some(point) = tag.corner(spec.corner_index) else {
                    continue;
                };
                by_name.insert(spec.name, point);
            }

            last_seen = by_name.len();
            if last_seen == required {
                let corners: Vec<BoardCorner> = self
                    .config
                    .corners
                    .iter()
                    .filter_map(|spec| {
                        by_name.get(&spec.name).map(|&position| BoardCorner {
                            name: spec.name,
                            position,
                        })
                    })
                    .collect();
                log::info!("board located on attempt {attempt}: {required} corners");
                return Ok(corners);
            }

            log::warn!(
                "localization attempt {attempt}/{}: saw {last_seen} of {required} corner tags",
                self.config.max_locate_attempts
            );
        }

        Err(LocateError::TagsMissing {
            seen: last_seen,
            required,
            attempts: self.config.max_locate_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ReplaySource;
    use crate::tags::TagDetection;
    use board_vision_core::{GrayFrame, GrayFrameView};

    fn tag(id: u32, x: f32, y: f32) -> TagDetection {
        // 10px square tag; the configured corner index picks one vertex.
        TagDetection {
            id,
            corners: [
                Point2::new(x, y),
                Point2::new(x + 10.0, y),
                Point2::new(x + 10.0, y + 10.0),
                Point2::new(x, y + 10.0),
            ],
        }
    }

    fn plain_config() -> BoardViewConfig {
        BoardViewConfig {
            rotation_deg: 0.0,
            translation: (0.0, 0.0),
            ..BoardViewConfig::default()
        }
    }

    fn frames(n: usize) -> ReplaySource {
        ReplaySource::new((0..n).map(|_| GrayFrame::new(64, 64)))
    }

    #[test]
    fn resolves_three_corners_in_configured_order() {
        let mut locator = TagLocator::new(plain_config(), |_: &GrayFrameView<'_>| {
            vec![
                tag(97, 50.0, 5.0),
                tag(99, 5.0, 50.0),
                tag(98, 50.0, 50.0),
                tag(42, 30.0, 30.0), // foreign marker in the scene
            ]
        });
        let corners = locator.locate(&mut frames(1)).expect("locate");
        let names: Vec<CornerName> = corners.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![CornerName::PlayerL, CornerName::PlayerR, CornerName::RobotR]
        );
        // player_l uses tag corner index 1 (top-right of the 10px tag).
        assert_eq!(corners[0].position, Point2::new(15.0, 50.0));
    }

    #[test]
    fn retries_until_enough_tags_then_succeeds() {
        let mut calls = 0;
        let mut locator = TagLocator::new(plain_config(), move |_: &GrayFrameView<'_>| {
            calls += 1;
            if calls < 3 {
                vec![tag(99, 5.0, 50.0)]
            } else {
                vec![tag(99, 5.0, 50.0), tag(98, 50.0, 50.0), tag(97, 50.0, 5.0)]
            }
        });
        let corners = locator.locate(&mut frames(10)).expect("locate");
        assert_eq!(corners.len(), 3);
    }

    #[test]
    fn gives_up_after_the_attempt_budget() {
        let mut config = plain_config();
        config.max_locate_attempts = 4;
        let mut source = frames(20);
        let mut locator = TagLocator::new(config, |_: &GrayFrameView<'_>| {
            vec![tag(99, 5.0, 50.0), tag(98, 50.0, 50.0)]
        });
        match locator.locate(&mut source) {
            Err(LocateError::TagsMissing {
                seen,
                required,
                attempts,
            }) => {
                assert_eq!(seen, 2);
                assert_eq!(required, 3);
                assert_eq!(attempts, 4);
            }
            other => panic!("expected TagsMissing, got {other:?}"),
        }
        // One capture per attempt, no more.
        assert_eq!(source.remaining(), 16);
    }

    #[test]
    fn too_many_resolved_corners_also_fails_the_attempt() {
        let mut config = plain_config();
        config.corners.push(crate::config::CornerSpec {
            name: CornerName::RobotL,
            tag_id: 96,
            corner_index: 0,
        });
        config.max_locate_attempts = 2;
        let mut locator = TagLocator::new(config, |_: &GrayFrameView<'_>| {
            vec![
                tag(96, 5.0, 5.0),
                tag(97, 50.0, 5.0),
                tag(98, 50.0, 50.0),
                tag(99, 5.0, 50.0),
            ]
        });
        assert!(matches!(
            locator.locate(&mut frames(4)),
            Err(LocateError::TagsMissing { seen: 4, .. })
        ));
    }

    #[test]
    fn capture_failure_propagates() {
        let mut locator = TagLocator::new(plain_config(), |_: &GrayFrameView<'_>| Vec::new());
        assert!(matches!(
            locator.locate(&mut frames(0)),
            Err(LocateError::Capture(CaptureError::Exhausted))
        ));
    }
}
