//! Arm-frame square positions.
//!
//! The arm client consumes Cartesian targets, not square labels. Squares map
//! to arm-frame (x, y) through a linear table anchored at a1 and stepped per
//! file and rank; the physical steps were measured on the rig, so files and
//! ranks use slightly different pitches.

use crate::grid::Square;
use crate::resolve::ResolvedMove;
use serde::{Deserialize, Serialize};

/// Linear square-to-position table, metres in the arm base frame.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SquarePoses {
    /// Arm-frame position of the a1 square center.
    pub a1_xy: (f32, f32),
    /// Pitch between adjacent files; positive steps away from a1.
    pub file_step: f32,
    /// Pitch between adjacent ranks.
    pub rank_step: f32,
    /// Height the piece is lifted to while travelling, metres.
    pub clearance: f32,
}

impl Default for SquarePoses {
    fn default() -> Self {
        Self {
            a1_xy: (0.45, 0.15),
            file_step: 0.0434,
            rank_step: 0.0425,
            clearance: 0.07,
        }
    }
}

/// One pick-and-place order for the external arm client.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArmTarget {
    pub from_xy: (f32, f32),
    pub to_xy: (f32, f32),
    /// Gripper closing height for the moved piece, metres.
    pub grip_height: f32,
    pub clearance: f32,
}

impl SquarePoses {
    /// Arm-frame center of a square. Files and ranks step away from a1
    /// toward the robot stand.
    pub fn xy(&self, square: Square) -> (f32, f32) {
        (
            self.a1_xy.0 - square.file_index() as f32 * self.file_step,
            self.a1_xy.1 - square.rank_index() as f32 * self.rank_step,
        )
    }

    /// Pick-and-place order for a resolved move.
    pub fn arm_target(&self, mv: &ResolvedMove) -> ArmTarget {
        ArmTarget {
            from_xy: self.xy(mv.from),
            to_xy: self.xy(mv.to),
            grip_height: mv.piece.1.grip_height(),
            clearance: self.clearance,
        }
    }
}
