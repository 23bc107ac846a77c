//! Headless debug overlay.
//!
//! Draws the grid onto a copy of a frame so a human can check cell
//! attribution from a saved image. Not required for correctness; nothing in
//! the pipeline reads these pixels back.

use crate::grid::{BoardGrid, Square};
use board_vision_core::{GrayFrame, PixelBounds};

const GRID_VALUE: u8 = 200;
const HIGHLIGHT_VALUE: u8 = 255;

fn draw_box(frame: &mut GrayFrame, bounds: &PixelBounds, thickness: usize, value: u8) {
    let xs = bounds.x_range(frame.width);
    let ys = bounds.y_range(frame.height);
    if xs.is_empty() || ys.is_empty() {
        return;
    }
    for t in 0..thickness {
        for x in xs.clone() {
            if ys.start + t < frame.height {
                frame.set(x, ys.start + t, value);
            }
            if ys.end > t + 1 {
                frame.set(x, ys.end - 1 - t, value);
            }
        }
        for y in ys.clone() {
            if xs.start + t < frame.width {
                frame.set(xs.start + t, y, value);
            }
            if xs.end > t + 1 {
                frame.set(xs.end - 1 - t, y, value);
            }
        }
    }
}

/// Copy of `frame` with every cell outlined and the given squares (normally
/// the two top-ranked ones) emphasized.
pub fn overlay_ranking(frame: &GrayFrame, grid: &BoardGrid, highlight: &[Square]) -> GrayFrame {
    let mut out = frame.clone();
    for (_, quad) in grid.iter() {
        draw_box(&mut out, &quad.bounds(), 1, GRID_VALUE);
    }
    for square in highlight {
        draw_box(&mut out, &grid.quad(*square).bounds(), 3, HIGHLIGHT_VALUE);
    }
    out
}
