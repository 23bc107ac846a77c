//! Core image and geometry types for chessboard vision.
//!
//! This crate is intentionally small and purely pixel/geometric. It does
//! *not* know about fiducial tags, chess squares, or camera devices; those
//! live in `board-vision`.

mod frame;
mod logger;
mod quad;
mod transform;

pub use frame::{sample_bilinear, sample_bilinear_u8, GrayFrame, GrayFrameView};
pub use logger::init_with_level;
pub use quad::{CellQuad, PixelBounds};
pub use transform::FrameTransform;

#[cfg(feature = "image")]
pub use frame::{frame_from_luma8, frame_to_luma8};
