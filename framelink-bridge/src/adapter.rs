//! Frame conversion between the host and graph representations.
//!
//! Conversions are infallible ownership moves: the pixel buffer is
//! transferred by value in both directions, never copied. Only the
//! timestamp changes representation, between the host's optional
//! floating-point seconds and the graph's integer link ticks. An
//! undefined host timestamp maps to the undefined tick sentinel and
//! back without inventing a value.

use framelink_core::frame::VideoFrame;
use framelink_core::rational::Rational;
use framelink_core::timestamp::{TimeBase, Timestamp};
use framelink_graph::GraphFrame;

/// Timing context captured from an active graph's two endpoint links.
#[derive(Debug, Clone, Copy)]
pub struct LinkTiming {
    /// Time base of the link feeding the graph.
    pub to_graph: TimeBase,
    /// Time base of the link draining the graph.
    pub from_graph: TimeBase,
    /// Sample aspect ratio negotiated on the input link.
    pub par_in: Rational,
}

/// Convert a host frame into the graph's representation.
///
/// The frame takes the input link's negotiated sample aspect ratio, not
/// its own: the graph was built for the captured geometry, and a frame
/// whose aspect actually differs triggers a rebuild before it gets
/// here.
pub fn to_graph_frame(frame: VideoFrame, timing: &LinkTiming) -> GraphFrame {
    GraphFrame {
        pts: Timestamp::from_seconds(frame.pts, timing.to_graph),
        sample_aspect_ratio: timing.par_in,
        flags: frame.flags,
        metadata: None,
        hw_frames: frame.hw_frames,
        buffer: frame.buffer,
    }
}

/// Convert a filtered graph frame back into the host's representation.
pub fn from_graph_frame(frame: GraphFrame, timing: &LinkTiming) -> VideoFrame {
    VideoFrame {
        pts: frame.pts.rescale(timing.from_graph).to_seconds(),
        par: frame.sample_aspect_ratio,
        flags: frame.flags,
        hw_frames: frame.hw_frames,
        buffer: frame.buffer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelink_core::frame::PixelFormat;

    fn timing() -> LinkTiming {
        LinkTiming {
            to_graph: TimeBase::MICROSECONDS,
            from_graph: TimeBase::MICROSECONDS,
            par_in: Rational::ONE,
        }
    }

    #[test]
    fn test_pts_roundtrip() {
        let mut frame = VideoFrame::new(16, 16, PixelFormat::Yuv420p);
        frame.pts = Some(1.25);
        let gf = to_graph_frame(frame, &timing());
        assert_eq!(gf.pts.value, 1_250_000);
        let back = from_graph_frame(gf, &timing());
        assert!((back.pts.unwrap() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_undefined_pts_stays_undefined() {
        let frame = VideoFrame::new(16, 16, PixelFormat::Yuv420p);
        assert_eq!(frame.pts, None);
        let gf = to_graph_frame(frame, &timing());
        assert!(!gf.pts.is_valid());
        let back = from_graph_frame(gf, &timing());
        assert_eq!(back.pts, None);
    }

    #[test]
    fn test_input_sar_comes_from_captured_link() {
        let mut frame = VideoFrame::new(16, 16, PixelFormat::Yuv420p);
        frame.par = Rational::new(16, 11);
        let timing = LinkTiming {
            to_graph: TimeBase::MICROSECONDS,
            from_graph: TimeBase::MICROSECONDS,
            par_in: Rational::new(4, 3),
        };
        let gf = to_graph_frame(frame, &timing);
        assert_eq!(gf.sample_aspect_ratio, Rational::new(4, 3));
    }

    #[test]
    fn test_buffer_moves_without_copy() {
        let frame = VideoFrame::new(64, 64, PixelFormat::Yuv420p);
        let data_ptr = frame.buffer.plane(0).unwrap().as_ptr();
        let gf = to_graph_frame(frame, &timing());
        assert_eq!(gf.buffer.plane(0).unwrap().as_ptr(), data_ptr);
        let back = from_graph_frame(gf, &timing());
        assert_eq!(back.buffer.plane(0).unwrap().as_ptr(), data_ptr);
    }
}
