//! Chessboard localization and move perception for a chess-playing robot arm.
//!
//! The camera looks down at a physical board with fiducial tags glued next to
//! its corners. Per game this crate:
//! - resolves the tags to named board corners ([`TagLocator`]),
//! - builds the 8×8 cell grid in pixel space ([`BoardGrid`]),
//! - compares a stored reference frame against a fresh capture and ranks
//!   cells by dissimilarity ([`ChangeDetector`]),
//! - combines the two most-changed cells with the engine's occupancy query to
//!   recover the opponent's move ([`resolve_move`]).
//!
//! [`BoardSession`] owns the camera for the life of a game and wires the
//! pieces together into the turn protocol. Everything is synchronous and
//! single-threaded; the pipeline samples one frame per turn.
//!
//! ## Quickstart
//!
//! ```no_run
//! use board_vision::{BoardSession, BoardViewConfig, ReplaySource, TagDetection};
//! use board_vision_core::GrayFrameView;
//!
//! struct NoTags;
//! impl board_vision::TagDetector for NoTags {
//!     fn detect(&mut self, _frame: &GrayFrameView<'_>) -> Vec<TagDetection> {
//!         Vec::new()
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BoardViewConfig::default();
//! let source = ReplaySource::new(Vec::new());
//! let mut session = BoardSession::new(config, source, NoTags)?;
//! let grid = session.locate_board()?;
//! println!("cells: {}", grid.len());
//! # Ok(())
//! # }
//! ```

mod change;
mod config;
mod grid;
mod locator;
mod poses;
mod render;
mod resolve;
mod session;
mod source;
mod ssim;
mod tags;

pub use change::{top_pair, CellScore, ChangeDetector, DiffError};
pub use config::{BoardViewConfig, ConfigError, ConfigIoError, CornerName, CornerSpec};
pub use grid::{BoardGrid, GridError, Square};
pub use locator::{BoardCorner, LocateError, TagLocator};
pub use poses::{ArmTarget, SquarePoses};
pub use render::overlay_ranking;
pub use resolve::{resolve_move, BoardState, PieceColor, PieceKind, ResolveError, ResolvedMove};
pub use session::{BoardSession, TurnError};
pub use source::{CaptureError, FrameSource, ReplaySource};
pub use ssim::similarity_map;
pub use tags::{TagDetection, TagDetector};

#[cfg(feature = "apriltag")]
pub use tags::{AprilTagDetector, TagBackendError};

#[cfg(feature = "v4l")]
pub use source::V4lSource;
