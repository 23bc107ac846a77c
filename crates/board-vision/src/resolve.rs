//! Move resolution: candidate cells plus occupancy become a chess move.
//!
//! Occupancy comes from the external chess-state component through the
//! [`BoardState`] trait; this module never tracks pieces itself.

use crate::grid::Square;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceColor {
    White,
    Black,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Height above the board surface at which the gripper closes, metres.
    pub fn grip_height(&self) -> f32 {
        match self {
            PieceKind::Pawn => 0.011,
            PieceKind::Knight => 0.014,
            PieceKind::Bishop => 0.016,
            PieceKind::Rook => 0.013,
            PieceKind::Queen => 0.019,
            PieceKind::King => 0.022,
        }
    }
}

/// Occupancy query answered by the external chess-state component.
pub trait BoardState {
    fn piece_at(&self, square: Square) -> Option<(PieceColor, PieceKind)>;
}

/// A recovered move: the mover's piece left `from` and landed on `to`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMove {
    pub from: Square,
    pub to: Square,
    pub piece: (PieceColor, PieceKind),
}

/// Resolution failures. Both are recoverable: prompt for a re-scan.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ResolveError {
    #[error("both candidate cells {0} and {1} hold {2:?} pieces")]
    BothMoverColor(Square, Square, PieceColor),
    #[error("neither candidate cell {0} nor {1} holds a {2:?} piece")]
    NeitherMoverColor(Square, Square, PieceColor),
}

/// Decide which candidate is the source and which the destination.
///
/// The candidate occupied by a piece of `mover` color (in the pre-move board
/// state) is the square the piece came from; the other candidate is where it
/// went. A move that touched more than two squares (castling, en passant)
/// still resolves only the two most-changed cells; the caller owns any
/// special-casing.
pub fn resolve_move(
    candidates: [Square; 2],
    state: &impl BoardState,
    mover: PieceColor,
) -> Result<ResolvedMove, ResolveError> {
    let [a, b] = candidates;
    let mover_piece = |sq: Square| state.piece_at(sq).filter(|(color, _)| *color == mover);

    match (mover_piece(a), mover_piece(b)) {
        (Some(piece), None) => Ok(ResolvedMove {
            from: a,
            to: b,
            piece,
        }),
        (None, Some(piece)) => Ok(ResolvedMove {
            from: b,
            to: a,
            piece,
        }),
        (Some(_), Some(_)) => Err(ResolveError::BothMoverColor(a, b, mover)),
        (None, None) => Err(ResolveError::NeitherMoverColor(a, b, mover)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapState(HashMap<Square, (PieceColor, PieceKind)>);

    impl MapState {
        fn new(pieces: &[(&str, PieceColor, PieceKind)]) -> Self {
            Self(
                pieces
                    .iter()
                    .map(|(label, color, kind)| (label.parse().expect("label"), (*color, *kind)))
                    .collect(),
            )
        }
    }

    impl BoardState for MapState {
        fn piece_at(&self, square: Square) -> Option<(PieceColor, PieceKind)> {
            self.0.get(&square).copied()
        }
    }

    fn sq(label: &str) -> Square {
        label.parse().expect("label")
    }

    #[test]
    fn mover_piece_marks_the_source_square() {
        let state = MapState::new(&[("e2", PieceColor::White, PieceKind::Pawn)]);
        let resolved =
            resolve_move([sq("e2"), sq("e4")], &state, PieceColor::White).expect("resolve");
        assert_eq!(resolved.from, sq("e2"));
        assert_eq!(resolved.to, sq("e4"));
        assert_eq!(resolved.piece, (PieceColor::White, PieceKind::Pawn));
    }

    #[test]
    fn candidate_order_does_not_matter() {
        let state = MapState::new(&[("g8", PieceColor::Black, PieceKind::Knight)]);
        let resolved =
            resolve_move([sq("f6"), sq("g8")], &state, PieceColor::Black).expect("resolve");
        assert_eq!(resolved.from, sq("g8"));
        assert_eq!(resolved.to, sq("f6"));
    }

    #[test]
    fn capture_squares_resolve_to_the_mover() {
        // Destination holds an opponent piece: a capture, not ambiguity.
        let state = MapState::new(&[
            ("d5", PieceColor::Black, PieceKind::Pawn),
            ("e4", PieceColor::White, PieceKind::Pawn),
        ]);
        let resolved =
            resolve_move([sq("d5"), sq("e4")], &state, PieceColor::Black).expect("resolve");
        assert_eq!(resolved.from, sq("d5"));
        assert_eq!(resolved.to, sq("e4"));
    }

    #[test]
    fn both_mover_color_is_ambiguous() {
        let state = MapState::new(&[
            ("a1", PieceColor::White, PieceKind::Rook),
            ("a2", PieceColor::White, PieceKind::Pawn),
        ]);
        assert_eq!(
            resolve_move([sq("a1"), sq("a2")], &state, PieceColor::White),
            Err(ResolveError::BothMoverColor(
                sq("a1"),
                sq("a2"),
                PieceColor::White
            ))
        );
    }

    #[test]
    fn neither_mover_color_is_ambiguous() {
        let state = MapState::new(&[("h7", PieceColor::Black, PieceKind::Pawn)]);
        assert_eq!(
            resolve_move([sq("h4"), sq("h7")], &state, PieceColor::White),
            Err(ResolveError::NeitherMoverColor(
                sq("h4"),
                sq("h7"),
                PieceColor::White
            ))
        );
    }
}
