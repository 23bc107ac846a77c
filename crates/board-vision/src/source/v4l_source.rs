//! Video4Linux capture backend.

use super::{CaptureError, FrameSource};
use board_vision_core::GrayFrame;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

/// V4L2 camera. Negotiates YUYV and extracts the luma plane.
///
/// A mapped stream is created per capture and torn down afterwards. The
/// pipeline samples one frame per turn, so stream setup cost is irrelevant
/// and the device handle stays the only long-lived resource.
pub struct V4lSource {
    device: Device,
    width: usize,
    height: usize,
}

impl V4lSource {
    /// Open `/dev/video{index}` and negotiate a YUYV format.
    pub fn open(index: usize) -> Result<Self, CaptureError> {
        let device = Device::new(index)?;
        let mut fmt = device.format()?;
        fmt.fourcc = FourCC::new(b"YUYV");
        let fmt = device.set_format(&fmt)?;
        if &fmt.fourcc.repr != b"YUYV" {
            return Err(CaptureError::Device(format!(
                "/dev/video{index} does not support YUYV (offered {})",
                fmt.fourcc
            )));
        }
        log::info!(
            "opened /dev/video{index}: {}x{} YUYV",
            fmt.width,
            fmt.height
        );
        Ok(Self {
            device,
            width: fmt.width as usize,
            height: fmt.height as usize,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl FrameSource for V4lSource {
    fn capture(&mut self) -> Result<GrayFrame, CaptureError> {
        let mut stream = Stream::with_buffers(&self.device, Type::VideoCapture, 2)?;
        let (buf, _meta) = stream.next()?;
        if buf.is_empty() {
            return Err(CaptureError::EmptyFrame);
        }
        let expected = self.width * self.height * 2;
        if buf.len() < expected {
            return Err(CaptureError::ShortFrame {
                expected,
                got: buf.len(),
            });
        }
        // YUYV packs two pixels in four bytes; luma sits at even offsets.
        let data: Vec<u8> = buf[..expected].iter().step_by(2).copied().collect();
        Ok(GrayFrame {
            width: self.width,
            height: self.height,
            data,
        })
    }
}
