//! Pixel formats, frame buffers, and the host video-frame type.

use crate::hw::HwFramesRef;
use crate::rational::Rational;
use bitflags::bitflags;
use std::fmt;

/// Pixel format of a video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp.
    Yuv420p,
    /// Planar YUV 4:2:2, 16bpp.
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp.
    Yuv444p,
    /// Y plane plus interleaved UV plane.
    Nv12,
    /// Packed RGB, 24bpp.
    Rgb24,
    /// Packed RGBA, 32bpp.
    Rgba,
    /// Grayscale, 8bpp.
    Gray8,
}

impl PixelFormat {
    /// Number of planes for this format.
    pub fn num_planes(&self) -> usize {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p => 3,
            Self::Nv12 => 2,
            Self::Rgb24 | Self::Rgba | Self::Gray8 => 1,
        }
    }

    /// Chroma subsampling factors (horizontal, vertical).
    pub fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420p | Self::Nv12 => (2, 2),
            Self::Yuv422p => (2, 1),
            _ => (1, 1),
        }
    }

    /// Bytes per sample in the given plane before stride alignment.
    pub fn bytes_per_sample(&self, plane: usize) -> usize {
        match self {
            Self::Rgb24 => 3,
            Self::Rgba => 4,
            Self::Nv12 if plane == 1 => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Yuv420p => "yuv420p",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Nv12 => "nv12",
            Self::Rgb24 => "rgb24",
            Self::Rgba => "rgba",
            Self::Gray8 => "gray8",
        };
        write!(f, "{}", name)
    }
}

bitflags! {
    /// Frame property flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrameFlags: u32 {
        /// Keyframe (I-frame).
        const KEYFRAME = 0x0001;
        /// Interlaced content.
        const INTERLACED = 0x0002;
    }
}

/// Owned pixel storage for one frame.
///
/// Moving a `FrameBuffer` is the zero-copy ownership handoff across the
/// bridge boundary: the planes travel with the value, nothing is cloned.
#[derive(Clone)]
pub struct FrameBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
    planes: Vec<Plane>,
}

#[derive(Clone)]
struct Plane {
    data: Vec<u8>,
    stride: usize,
}

impl FrameBuffer {
    /// Allocate a zeroed buffer for the given geometry.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let (hsub, vsub) = format.chroma_subsampling();
        let mut planes = Vec::with_capacity(format.num_planes());

        for plane in 0..format.num_planes() {
            let (pw, ph) = if plane == 0 {
                (width as usize, height as usize)
            } else {
                (
                    (width as usize).div_ceil(hsub as usize),
                    (height as usize).div_ceil(vsub as usize),
                )
            };
            // Stride aligned to 32 bytes for SIMD-friendly access
            let stride = (pw * format.bytes_per_sample(plane) + 31) & !31;
            planes.push(Plane {
                data: vec![0u8; stride * ph],
                stride,
            });
        }

        Self {
            width,
            height,
            format,
            planes,
        }
    }

    /// Number of planes.
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// A plane's data.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(|p| p.data.as_slice())
    }

    /// A plane's data, mutable.
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.planes.get_mut(index).map(|p| p.data.as_mut_slice())
    }

    /// Stride (bytes per row) of a plane.
    pub fn stride(&self, plane: usize) -> usize {
        self.planes.get(plane).map(|p| p.stride).unwrap_or(0)
    }

    /// Total byte size of all planes.
    pub fn total_size(&self) -> usize {
        self.planes.iter().map(|p| p.data.len()).sum()
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("planes", &self.planes.len())
            .finish()
    }
}

/// A host-side video frame.
///
/// Presentation time is in seconds, the host pipeline's time domain;
/// `None` means undefined.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Pixel data.
    pub buffer: FrameBuffer,
    /// Presentation time in seconds, if known.
    pub pts: Option<f64>,
    /// Pixel aspect ratio.
    pub par: Rational,
    /// Property flags.
    pub flags: FrameFlags,
    /// Device frame-pool reference for hardware frames.
    pub hw_frames: Option<HwFramesRef>,
}

impl VideoFrame {
    /// Create a software frame with an allocated buffer.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            buffer: FrameBuffer::new(width, height, format),
            pts: None,
            par: Rational::ONE,
            flags: FrameFlags::empty(),
            hw_frames: None,
        }
    }

    /// Frame width.
    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    /// Frame height.
    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    /// Pixel format.
    pub fn format(&self) -> PixelFormat {
        self.buffer.format
    }

    /// The geometry/format record for this frame.
    pub fn params(&self) -> VideoParams {
        VideoParams {
            width: self.width(),
            height: self.height(),
            format: self.format(),
            par: self.par,
            hw_subfmt: self.hw_frames.as_ref().map(|ctx| ctx.sw_format),
        }
    }
}

/// Host-side geometry and format of a video stream segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoParams {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
    /// Pixel aspect ratio.
    pub par: Rational,
    /// Storage format of the hardware frame pool, for hardware frames.
    pub hw_subfmt: Option<PixelFormat>,
}

impl VideoParams {
    /// Create parameters for a square-pixel software stream.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            par: Rational::ONE,
            hw_subfmt: None,
        }
    }
}

impl fmt::Display for VideoParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} {} par={}",
            self.width, self.height, self.format, self.par
        )
    }
}
