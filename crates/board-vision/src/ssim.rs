//! Per-pixel structural similarity between two frames.
//!
//! Classic windowed SSIM on the 255 dynamic range with the standard C1/C2
//! stabilizers. The map holds one value per pixel in `[-1, 1]`; 1.0 means
//! the neighbourhoods are identical, lower means more different. Windows are
//! clipped at the frame border. All window statistics come from summed-area
//! tables, so the cost is independent of the window side.

use crate::change::DiffError;
use board_vision_core::GrayFrameView;

const C1: f64 = 6.5025; // (0.01 * 255)^2
const C2: f64 = 58.5225; // (0.03 * 255)^2

struct SummedArea {
    width: usize,
    table: Vec<f64>,
}

impl SummedArea {
    fn build(width: usize, height: usize, mut value: impl FnMut(usize, usize) -> f64) -> Self {
        let w1 = width + 1;
        let mut table = vec![0.0; w1 * (height + 1)];
        for y in 0..height {
            let mut row = 0.0;
            for x in 0..width {
                row += value(x, y);
                table[(y + 1) * w1 + (x + 1)] = table[y * w1 + (x + 1)] + row;
            }
        }
        Self { width: w1, table }
    }

    /// Sum over `[x0, x1) x [y0, y1)`.
    #[inline]
    fn rect(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> f64 {
        let w = self.width;
        self.table[y1 * w + x1] + self.table[y0 * w + x0]
            - self.table[y0 * w + x1]
            - self.table[y1 * w + x0]
    }
}

/// Structural similarity map between two same-sized frames.
pub fn similarity_map(
    a: &GrayFrameView<'_>,
    b: &GrayFrameView<'_>,
    window: usize,
) -> Result<Vec<f32>, DiffError> {
    if window < 3 || window % 2 == 0 {
        return Err(DiffError::BadWindow(window));
    }
    if a.width != b.width || a.height != b.height {
        return Err(DiffError::FrameSizeMismatch {
            snapshot: (a.width, a.height),
            frame: (b.width, b.height),
        });
    }

    let (w, h) = (a.width, a.height);
    let px_a = |x: usize, y: usize| a.data[y * w + x] as f64;
    let px_b = |x: usize, y: usize| b.data[y * w + x] as f64;

    let sa = SummedArea::build(w, h, px_a);
    let sb = SummedArea::build(w, h, px_b);
    let saa = SummedArea::build(w, h, |x, y| px_a(x, y) * px_a(x, y));
    let sbb = SummedArea::build(w, h, |x, y| px_b(x, y) * px_b(x, y));
    let sab = SummedArea::build(w, h, |x, y| px_a(x, y) * px_b(x, y));

    let r = window / 2;
    let mut map = Vec::with_capacity(w * h);
    for y in 0..h {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r + 1).min(h);
        for x in 0..w {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r + 1).min(w);
            let n = ((x1 - x0) * (y1 - y0)) as f64;

            let mean_a = sa.rect(x0, y0, x1, y1) / n;
            let mean_b = sb.rect(x0, y0, x1, y1) / n;
            let var_a = saa.rect(x0, y0, x1, y1) / n - mean_a * mean_a;
            let var_b = sbb.rect(x0, y0, x1, y1) / n - mean_b * mean_b;
            let cov = sab.rect(x0, y0, x1, y1) / n - mean_a * mean_b;

            let num = (2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2);
            let den = (mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2);
            map.push((num / den) as f32);
        }
    }
    Ok(map)
}
