//! Link parameters and the graph-native frame type.

use framelink_core::frame::{FrameBuffer, FrameFlags, PixelFormat};
use framelink_core::hw::HwFramesRef;
use framelink_core::rational::Rational;
use framelink_core::tags::Tags;
use framelink_core::timestamp::{TimeBase, Timestamp};

/// Negotiated parameters of one link between graph nodes.
///
/// The bridge reads these off the two endpoint links after configuration
/// to learn the time bases, geometry, and hardware context the graph
/// settled on.
#[derive(Debug, Clone)]
pub struct LinkParams {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format carried on this link.
    pub format: PixelFormat,
    /// Tick time base of frames on this link.
    pub time_base: TimeBase,
    /// Sample aspect ratio.
    pub sample_aspect_ratio: Rational,
    /// Hardware frame pool, when the link carries device frames.
    pub hw_frames: Option<HwFramesRef>,
}

/// A frame in the graph's native representation.
///
/// Presentation time is integer ticks against the owning link's time
/// base. The buffer moves in and out of the graph by value; frame data
/// is never copied at the boundary.
#[derive(Debug, Clone)]
pub struct GraphFrame {
    /// Pixel data.
    pub buffer: FrameBuffer,
    /// Presentation timestamp in link ticks.
    pub pts: Timestamp,
    /// Sample aspect ratio.
    pub sample_aspect_ratio: Rational,
    /// Property flags.
    pub flags: FrameFlags,
    /// Per-frame metadata dictionary attached by filters, if any.
    pub metadata: Option<Tags>,
    /// Hardware frame pool this frame was allocated from.
    pub hw_frames: Option<HwFramesRef>,
}

impl GraphFrame {
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
}
