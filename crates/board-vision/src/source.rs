//! Frame sources: the camera seam of the pipeline.
//!
//! A [`FrameSource`] is a synchronous single-frame capture device. The
//! session acquires one source at construction and holds it exclusively for
//! the life of the game; dropping the source releases the device on every
//! exit path.

use board_vision_core::GrayFrame;
use std::collections::VecDeque;

#[cfg(feature = "v4l")]
mod v4l_source;

#[cfg(feature = "v4l")]
pub use v4l_source::V4lSource;

/// Capture failures. Propagated to the caller; the only silent retries are
/// the documented buffer-flush reads.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("camera device unavailable: {0}")]
    Device(String),
    #[error("camera returned an empty frame")]
    EmptyFrame,
    #[error("frame data too short: expected {expected} bytes, got {got}")]
    ShortFrame { expected: usize, got: usize },
    #[error("replay footage exhausted")]
    Exhausted,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Blocking single-frame capture.
pub trait FrameSource {
    /// Capture one grayscale frame. Blocks until a frame is available.
    fn capture(&mut self) -> Result<GrayFrame, CaptureError>;

    /// Discard `n` buffered frames. Cameras that buffer internally hand out
    /// stale frames first; sampling code flushes before every real capture.
    fn flush(&mut self, n: usize) -> Result<(), CaptureError> {
        for _ in 0..n {
            self.capture()?;
        }
        Ok(())
    }
}

/// In-memory frame sequence: tests, demos, and offline analysis.
#[derive(Debug, Default)]
pub struct ReplaySource {
    frames: VecDeque<GrayFrame>,
}

impl ReplaySource {
    pub fn new(frames: impl IntoIterator<Item = GrayFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Append a frame to the tail of the sequence.
    pub fn push(&mut self, frame: GrayFrame) {
        self.frames.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplaySource {
    fn capture(&mut self) -> Result<GrayFrame, CaptureError> {
        self.frames.pop_front().ok_or(CaptureError::Exhausted)
    }

    /// Replay footage has no stale device buffer; flushing is a no-op.
    fn flush(&mut self, _n: usize) -> Result<(), CaptureError> {
        Ok(())
    }
}
