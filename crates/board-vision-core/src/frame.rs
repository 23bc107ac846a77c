//! Grayscale frame storage and sampling.

/// Borrowed view over a row-major grayscale frame.
#[derive(Clone, Copy, Debug)]
pub struct GrayFrameView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayFrameView<'a> {
    /// Pixel value at `(x, y)`, or 0 outside the frame.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }
}

/// Owned row-major grayscale frame.
///
/// Frames captured within one session share a fixed width and height; the
/// session layer enforces that, not this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayFrame {
    /// All-black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Frame filled by a per-pixel function of `(x, y)`.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn view(&self) -> GrayFrameView<'_> {
        GrayFrameView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.width + x] = v;
    }
}

/// Bilinear sample at fractional pixel coordinates; out-of-frame taps read 0.
#[inline]
pub fn sample_bilinear(src: &GrayFrameView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src.get(x0, y0) as f32;
    let p10 = src.get(x0 + 1, y0) as f32;
    let p01 = src.get(x0, y0 + 1) as f32;
    let p11 = src.get(x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayFrameView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).clamp(0.0, 255.0) as u8
}

/// Convert an `image::GrayImage` into a [`GrayFrame`].
#[cfg(feature = "image")]
pub fn frame_from_luma8(img: &image::GrayImage) -> GrayFrame {
    GrayFrame {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Convert a [`GrayFrame`] into an `image::GrayImage`.
#[cfg(feature = "image")]
pub fn frame_to_luma8(frame: &GrayFrame) -> image::GrayImage {
    image::GrayImage::from_raw(frame.width as u32, frame.height as u32, frame.data.clone())
        .expect("frame dimensions match buffer length")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn view_reads_zero_outside_frame() {
        let frame = GrayFrame::from_fn(4, 3, |x, y| (x + y) as u8);
        let view = frame.view();
        assert_eq!(view.get(-1, 0), 0);
        assert_eq!(view.get(0, 3), 0);
        assert_eq!(view.get(3, 2), 5);
    }

    #[test]
    fn bilinear_interpolates_between_pixels() {
        let frame = GrayFrame::from_fn(2, 1, |x, _| if x == 0 { 0 } else { 100 });
        let view = frame.view();
        assert_relative_eq!(sample_bilinear(&view, 0.5, 0.0), 50.0, epsilon = 1e-4);
        assert_eq!(sample_bilinear_u8(&view, 0.0, 0.0), 0);
        assert_eq!(sample_bilinear_u8(&view, 1.0, 0.0), 100);
    }

    #[test]
    fn from_fn_is_row_major() {
        let frame = GrayFrame::from_fn(3, 2, |x, y| (y * 3 + x) as u8);
        assert_eq!(frame.data, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(frame.get(2, 1), 5);
    }
}
