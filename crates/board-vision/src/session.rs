//! The per-game session: owns the camera, wires the pipeline together.

use crate::change::{CellScore, ChangeDetector, DiffError};
use crate::config::{BoardViewConfig, ConfigError};
use crate::grid::{BoardGrid, GridError};
use crate::locator::{LocateError, TagLocator};
use crate::render::overlay_ranking;
use crate::resolve::{resolve_move, BoardState, PieceColor, ResolveError, ResolvedMove};
use crate::source::FrameSource;
use crate::tags::TagDetector;
use board_vision_core::{FrameTransform, GrayFrame};

/// Turn-level errors. Localization, capture, and resolution failures are
/// recoverable (retry the turn, re-prompt the player); only configuration
/// errors are fatal, and those surface from [`BoardSession::new`].
#[derive(thiserror::Error, Debug)]
pub enum TurnError {
    #[error("board has not been located yet")]
    NotLocated,
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Diff(#[from] DiffError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// One game's vision state: the exclusively-held frame source, the located
/// grid, and the reference snapshot.
///
/// The intended turn protocol:
/// 1. [`locate_board`](Self::locate_board) once at game start (or on
///    re-calibration),
/// 2. [`update_snapshot`](Self::update_snapshot) to record the board before
///    the opponent moves,
/// 3. [`observe_move`](Self::observe_move) after they move,
/// 4. confirm the move with the engine, let the arm respond, then
///    [`update_snapshot`](Self::update_snapshot) again for the next turn.
///
/// Dropping the session (or [`into_source`](Self::into_source)) releases the
/// camera on every exit path.
pub struct BoardSession<S, D> {
    transform: FrameTransform,
    source: S,
    locator: TagLocator<D>,
    change: ChangeDetector,
    grid: Option<BoardGrid>,
    last_ranking: Vec<CellScore>,
}

impl<S: FrameSource, D: TagDetector> BoardSession<S, D> {
    /// Validate the configuration and take ownership of the frame source.
    pub fn new(config: BoardViewConfig, source: S, detector: D) -> Result<Self, ConfigError> {
        config.validate()?;
        let transform = FrameTransform::new(config.rotation_deg, config.translation);
        let change = ChangeDetector::new(config.flush_frames, config.ssim_window);
        Ok(Self {
            transform,
            source,
            locator: TagLocator::new(config, detector),
            change,
            grid: None,
            last_ranking: Vec::new(),
        })
    }

    /// Locate the board and (re)build the cell grid.
    pub fn locate_board(&mut self) -> Result<&BoardGrid, TurnError> {
        let corners = self.locator.locate(&mut self.source)?;
        let grid = BoardGrid::build(&corners)?;
        Ok(self.grid.insert(grid))
    }

    #[inline]
    pub fn grid(&self) -> Option<&BoardGrid> {
        self.grid.as_ref()
    }

    /// Record the current board as the reference for the next comparison.
    pub fn update_snapshot(&mut self) -> Result<(), TurnError> {
        self.change
            .update_snapshot(&mut self.source, &self.transform)?;
        Ok(())
    }

    /// Rank all cells against the snapshot without resolving occupancy.
    /// Used by debug tooling and for re-prompting after an ambiguous turn.
    pub fn rank_cells(&mut self) -> Result<&[CellScore], TurnError> {
        let grid = self.grid.as_ref().ok_or(TurnError::NotLocated)?;
        let ranking = self
            .change
            .rank_changed_cells(&mut self.source, &self.transform, grid)?;
        self.last_ranking = ranking;
        Ok(&self.last_ranking)
    }

    /// Perceive the opponent's move: rank cells against the snapshot and
    /// resolve the top two with the engine's occupancy query.
    ///
    /// The snapshot is left untouched; call
    /// [`update_snapshot`](Self::update_snapshot) once the turn is confirmed.
    pub fn observe_move(
        &mut self,
        state: &impl BoardState,
        mover: PieceColor,
    ) -> Result<ResolvedMove, TurnError> {
        let ranking = self.rank_cells()?;
        let candidates = [ranking[0].square, ranking[1].square];
        Ok(resolve_move(candidates, state, mover)?)
    }

    /// Cell ranking from the last [`observe_move`](Self::observe_move) call.
    pub fn last_ranking(&self) -> &[CellScore] {
        &self.last_ranking
    }

    /// Reference snapshot with the grid and the last top-2 cells drawn in,
    /// for human inspection. `None` before the first observation.
    pub fn debug_overlay(&self) -> Option<GrayFrame> {
        let grid = self.grid.as_ref()?;
        let snapshot = self.change.snapshot()?;
        let highlight: Vec<_> = self
            .last_ranking
            .iter()
            .take(2)
            .map(|c| c.square)
            .collect();
        Some(overlay_ranking(snapshot, grid, &highlight))
    }

    /// Tear the session down, handing the frame source back to the caller.
    pub fn into_source(self) -> S {
        self.source
    }
}
