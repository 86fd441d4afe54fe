//! Frame-metadata capture.
//!
//! Analysis filters inside the graph publish their results as per-frame
//! tag dictionaries. The bridge keeps a snapshot of the most recent
//! dictionary so the host can query it between frames. No snapshot
//! exists until some frame has carried a dictionary; that absence is
//! distinguishable from an empty dictionary.

use framelink_core::tags::Tags;
use framelink_graph::GraphFrame;

/// Update the snapshot from an outgoing frame.
///
/// A frame carrying a dictionary replaces the snapshot wholesale; a
/// frame without one leaves the previous snapshot in place.
pub fn capture(snapshot: &mut Option<Tags>, frame: &GraphFrame) {
    if let Some(tags) = &frame.metadata {
        snapshot.get_or_insert_with(Tags::new).replace_with(tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelink_core::frame::{FrameBuffer, PixelFormat};
    use framelink_core::rational::Rational;
    use framelink_core::timestamp::{TimeBase, Timestamp};

    fn frame_with(metadata: Option<Tags>) -> GraphFrame {
        GraphFrame {
            buffer: FrameBuffer::new(8, 8, PixelFormat::Gray8),
            pts: Timestamp::none(TimeBase::MICROSECONDS),
            sample_aspect_ratio: Rational::ONE,
            flags: Default::default(),
            metadata,
            hw_frames: None,
        }
    }

    #[test]
    fn test_replaces_wholesale() {
        let mut stale = Tags::new();
        stale.set("stale", "1");
        let mut snapshot = Some(stale);

        let mut tags = Tags::new();
        tags.set("lavfi.cropdetect.w", "1904");
        capture(&mut snapshot, &frame_with(Some(tags)));

        let snapshot = snapshot.unwrap();
        assert_eq!(snapshot.get("stale"), None);
        assert_eq!(snapshot.get("lavfi.cropdetect.w"), Some("1904"));
    }

    #[test]
    fn test_untagged_frame_keeps_snapshot() {
        let mut kept = Tags::new();
        kept.set("kept", "1");
        let mut snapshot = Some(kept);
        capture(&mut snapshot, &frame_with(None));
        assert_eq!(snapshot.unwrap().get("kept"), Some("1"));
    }

    #[test]
    fn test_no_snapshot_until_first_dictionary() {
        let mut snapshot = None;
        capture(&mut snapshot, &frame_with(None));
        assert!(snapshot.is_none());
        capture(&mut snapshot, &frame_with(Some(Tags::new())));
        assert!(snapshot.is_some());
    }
}
