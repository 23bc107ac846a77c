//! Frame differencing: which cells changed since the reference snapshot.

use crate::grid::{BoardGrid, Square};
use crate::source::{CaptureError, FrameSource};
use crate::ssim::similarity_map;
use board_vision_core::{FrameTransform, GrayFrame};
use serde::{Deserialize, Serialize};

/// Differencing errors.
#[derive(thiserror::Error, Debug)]
pub enum DiffError {
    #[error("no reference snapshot recorded yet")]
    NoSnapshot,
    #[error("ssim window must be odd and >= 3, got {0}")]
    BadWindow(usize),
    #[error("frame size {frame:?} does not match snapshot {snapshot:?}")]
    FrameSizeMismatch {
        snapshot: (usize, usize),
        frame: (usize, usize),
    },
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Aggregate similarity of one cell. Lower score = more changed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CellScore {
    pub square: Square,
    pub score: f64,
}

/// Compares the stored reference snapshot against fresh captures.
///
/// The snapshot is the "board before this turn's move" ground truth. It is
/// recorded at game start and overwritten once per completed turn, after the
/// caller has confirmed the observed move.
pub struct ChangeDetector {
    flush_frames: usize,
    ssim_window: usize,
    snapshot: Option<GrayFrame>,
}

impl ChangeDetector {
    pub fn new(flush_frames: usize, ssim_window: usize) -> Self {
        Self {
            flush_frames,
            ssim_window,
            snapshot: None,
        }
    }

    #[inline]
    pub fn snapshot(&self) -> Option<&GrayFrame> {
        self.snapshot.as_ref()
    }

    fn sample(
        &self,
        source: &mut impl FrameSource,
        transform: &FrameTransform,
    ) -> Result<GrayFrame, CaptureError> {
        source.flush(self.flush_frames)?;
        Ok(transform.apply(&source.capture()?))
    }

    /// Record a fresh normalized frame as the reference snapshot.
    pub fn update_snapshot(
        &mut self,
        source: &mut impl FrameSource,
        transform: &FrameTransform,
    ) -> Result<(), DiffError> {
        let frame = self.sample(source, transform)?;
        log::debug!("snapshot updated ({}x{})", frame.width, frame.height);
        self.snapshot = Some(frame);
        Ok(())
    }

    /// Capture a fresh frame and rank all 64 cells by dissimilarity against
    /// the snapshot, most-changed first.
    ///
    /// Per-cell scores sum the similarity map over the cell's bounding-box
    /// pixel range. The grid is axis-aligned, so the box is the cell; cells
    /// sharing an edge double-count that one pixel row/column, which is
    /// irrelevant to the ranking. Ties break lexically on the label.
    pub fn rank_changed_cells(
        &self,
        source: &mut impl FrameSource,
        transform: &FrameTransform,
        grid: &BoardGrid,
    ) -> Result<Vec<CellScore>, DiffError> {
        let snapshot = self.snapshot.as_ref().ok_or(DiffError::NoSnapshot)?;
        let frame = self.sample(source, transform)?;
        let map = similarity_map(&snapshot.view(), &frame.view(), self.ssim_window)?;

        let (w, h) = (frame.width, frame.height);
        let mut scores: Vec<CellScore> = grid
            .iter()
            .map(|(square, quad)| {
                let bounds = quad.bounds();
                let mut score = 0.0f64;
                for y in bounds.y_range(h) {
                    for x in bounds.x_range(w) {
                        score += map[y * w + x] as f64;
                    }
                }
                CellScore {
                    square: *square,
                    score,
                }
            })
            .collect();

        scores.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.square.cmp(&b.square))
        });

        if let [first, second, ..] = scores.as_slice() {
            log::info!(
                "most changed cells: {} ({:.1}) and {} ({:.1})",
                first.square,
                first.score,
                second.square,
                second.score
            );
        }
        Ok(scores)
    }
}

/// The two most-changed squares of a ranking: the vacated and the occupied
/// cell, in no particular order.
pub fn top_pair(ranking: &[CellScore]) -> Option<[Square; 2]> {
    match ranking {
        [first, second, ..] => Some([first.square, second.square]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CornerName;
    use crate::locator::BoardCorner;
    use crate::source::ReplaySource;
    use nalgebra::Point2;

    fn grid_64() -> BoardGrid {
        BoardGrid::build(&[
            BoardCorner {
                name: CornerName::PlayerL,
                position: Point2::new(0.0, 64.0),
            },
            BoardCorner {
                name: CornerName::PlayerR,
                position: Point2::new(64.0, 64.0),
            },
            BoardCorner {
                name: CornerName::RobotR,
                position: Point2::new(64.0, 0.0),
            },
        ])
        .expect("grid")
    }

    fn textured() -> GrayFrame {
        GrayFrame::from_fn(64, 64, |x, y| ((x * 31 + y * 17) % 251) as u8)
    }

    /// Invert the interior of a cell, leaving a margin so window bleed into
    /// neighbouring cells stays negligible.
    fn disturb(frame: &mut GrayFrame, grid: &BoardGrid, square: Square) {
        let b = grid.quad(square).bounds();
        for y in (b.min_y as usize + 2)..(b.max_y as usize - 2) {
            for x in (b.min_x as usize + 2)..(b.max_x as usize - 2) {
                frame.set(x, y, 255 - frame.get(x, y));
            }
        }
    }

    #[test]
    fn rank_before_snapshot_is_an_error() {
        let mut detector = ChangeDetector::new(0, 7);
        let mut source = ReplaySource::new([textured()]);
        assert!(matches!(
            detector.rank_changed_cells(&mut source, &FrameTransform::identity(), &grid_64()),
            Err(DiffError::NoSnapshot)
        ));
    }

    #[test]
    fn identical_frames_rank_equal_and_lexical() {
        let grid = grid_64();
        let mut detector = ChangeDetector::new(0, 7);
        let mut source = ReplaySource::new([textured(), textured()]);
        let transform = FrameTransform::identity();
        detector.update_snapshot(&mut source, &transform).expect("snapshot");
        let ranking = detector
            .rank_changed_cells(&mut source, &transform, &grid)
            .expect("rank");

        assert_eq!(ranking.len(), 64);
        let spread = ranking[63].score - ranking[0].score;
        assert!(spread.abs() < 1e-2, "spread {spread}");
        let labels: Vec<String> = ranking.iter().map(|c| c.square.to_string()).collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted, "ties must break lexically");
    }

    #[test]
    fn two_disturbed_cells_rank_first() {
        let grid = grid_64();
        let before = textured();
        let mut after = before.clone();
        let e2: Square = "e2".parse().expect("square");
        let e4: Square = "e4".parse().expect("square");
        disturb(&mut after, &grid, e2);
        disturb(&mut after, &grid, e4);

        let mut detector = ChangeDetector::new(0, 7);
        let mut source = ReplaySource::new([before, after]);
        let transform = FrameTransform::identity();
        detector.update_snapshot(&mut source, &transform).expect("snapshot");
        let ranking = detector
            .rank_changed_cells(&mut source, &transform, &grid)
            .expect("rank");

        let top = top_pair(&ranking).expect("pair");
        let mut top: Vec<String> = top.iter().map(|s| s.to_string()).collect();
        top.sort();
        assert_eq!(top, vec!["e2".to_string(), "e4".to_string()]);
    }

    #[test]
    fn flush_count_is_honoured_before_each_sample() {
        struct Counting {
            frames: ReplaySource,
            flushed: usize,
        }
        impl FrameSource for Counting {
            fn capture(&mut self) -> Result<GrayFrame, CaptureError> {
                self.frames.capture()
            }
            fn flush(&mut self, n: usize) -> Result<(), CaptureError> {
                self.flushed += n;
                Ok(())
            }
        }

        let mut source = Counting {
            frames: ReplaySource::new([textured(), textured()]),
            flushed: 0,
        };
        let transform = FrameTransform::identity();
        let mut detector = ChangeDetector::new(4, 7);
        detector.update_snapshot(&mut source, &transform).expect("snapshot");
        assert_eq!(source.flushed, 4);
        detector
            .rank_changed_cells(&mut source, &transform, &grid_64())
            .expect("rank");
        assert_eq!(source.flushed, 8);
    }

    #[test]
    fn capture_failure_propagates_from_rank() {
        let grid = grid_64();
        let transform = FrameTransform::identity();
        let mut detector = ChangeDetector::new(0, 7);
        let mut source = ReplaySource::new([textured()]);
        detector.update_snapshot(&mut source, &transform).expect("snapshot");
        assert!(matches!(
            detector.rank_changed_cells(&mut source, &transform, &grid),
            Err(DiffError::Capture(CaptureError::Exhausted))
        ));
    }
}
