//! The logical 8×8 cell grid over the located board.
//!
//! The resolved corner points define a bounding quadrilateral; the grid is
//! built over its axis-aligned bounding box with linear interpolation per
//! axis. This is a deliberate simplification (no homography): the frame
//! rotation correction already squares the board up well enough for cell
//! attribution, and the cells stay axis-aligned rectangles.

use crate::locator::BoardCorner;
use board_vision_core::CellQuad;
use nalgebra::Point2;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Files in cell construction order. The physical mounting of the corner
/// tags decides which lattice column is which file; this reversed sequence
/// is the one consistent with the corner configuration defaults.
const FILE_ORDER: [char; 8] = ['h', 'g', 'f', 'e', 'd', 'c', 'b', 'a'];

/// One of the 64 squares, as algebraic notation ("a1".."h8").
///
/// Ordering is lexical on the label, which makes sorted output and score
/// tie-breaks deterministic.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Square {
    file: u8, // 0 = 'a'
    rank: u8, // 0 = rank 1
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    #[inline]
    pub fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    #[inline]
    pub fn rank_number(&self) -> u8 {
        self.rank + 1
    }

    /// Zero-based file index, 0 = file a.
    #[inline]
    pub fn file_index(&self) -> usize {
        self.file as usize
    }

    /// Zero-based rank index, 0 = rank 1.
    #[inline]
    pub fn rank_index(&self) -> usize {
        self.rank as usize
    }

    /// All 64 squares in lexical label order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|file| (0..8).map(move |rank| Square { file, rank }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_number())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("not a chess square label: {0:?}")]
pub struct ParseSquareError(String);

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseSquareError(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(file, rank).ok_or_else(|| ParseSquareError(s.to_string()))
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Grid construction errors.
#[derive(thiserror::Error, Debug)]
pub enum GridError {
    #[error("need 3 or 4 board corners, got {0}")]
    BadCornerCount(usize),
    #[error("board corners span a degenerate bounding box")]
    DegenerateBounds,
}

/// The 64-cell grid: square label to cell polygon, in construction order.
///
/// Built once per localization and read-only until the next one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardGrid {
    cells: Vec<(Square, CellQuad)>,
}

impl BoardGrid {
    /// Build the grid from 3 or 4 resolved board corners.
    ///
    /// Cells are produced column by column over the lattice (outer x, inner
    /// y) and labelled file by file in `hgfedcba` order, ranks 1..=8 within
    /// each file. The nesting must stay in lockstep: the label stream and
    /// the cell stream are zipped positionally.
    pub fn build(corners: &[BoardCorner]) -> Result<Self, GridError> {
        if !(3..=4).contains(&corners.len()) {
            return Err(GridError::BadCornerCount(corners.len()));
        }

        let mut min = Point2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for corner in corners {
            min.x = min.x.min(corner.position.x);
            min.y = min.y.min(corner.position.y);
            max.x = max.x.max(corner.position.x);
            max.y = max.y.max(corner.position.y);
        }
        if !(max.x > min.x && max.y > min.y) {
            return Err(GridError::DegenerateBounds);
        }

        // 9 lattice points per axis => 8 intervals => 64 cells.
        let xs: Vec<f32> = (0..9)
            .map(|i| min.x + (max.x - min.x) * i as f32 / 8.0)
            .collect();
        let ys: Vec<f32> = (0..9)
            .map(|i| min.y + (max.y - min.y) * i as f32 / 8.0)
            .collect();

        let mut cells = Vec::with_capacity(64);
        for (ix, file_char) in FILE_ORDER.iter().enumerate() {
            let file = *file_char as u8 - b'a';
            for iy in 0..8usize {
                let square = Square { file, rank: iy as u8 };
                let quad = CellQuad::new([
                    Point2::new(xs[ix], ys[iy]),
                    Point2::new(xs[ix], ys[iy + 1]),
                    Point2::new(xs[ix + 1], ys[iy + 1]),
                    Point2::new(xs[ix + 1], ys[iy]),
                ]);
                cells.push((square, quad));
            }
        }

        log::debug!(
            "board grid built over x {:.1}..{:.1}, y {:.1}..{:.1}",
            min.x,
            max.x,
            min.y,
            max.y
        );
        Ok(Self { cells })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in construction order.
    pub fn iter(&self) -> impl Iterator<Item = &(Square, CellQuad)> {
        self.cells.iter()
    }

    /// Cell polygon for a square.
    #[inline]
    pub fn quad(&self, square: Square) -> &CellQuad {
        // Construction order is deterministic, so the index is closed-form.
        let index = (7 - square.file_index()) * 8 + square.rank_index();
        &self.cells[index].1
    }
}
