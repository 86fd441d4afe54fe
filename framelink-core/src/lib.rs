//! Core types for the framelink filter-graph bridge.
//!
//! Provides the leaf vocabulary shared by both sides of the bridge
//! boundary: rational arithmetic, time bases and tick timestamps, pixel
//! formats and frame buffers, the host video-frame type, ordered metadata
//! tags, and shared hardware device/frame-pool references.

pub mod frame;
pub mod hw;
pub mod rational;
pub mod tags;
pub mod timestamp;

pub use frame::{FrameBuffer, FrameFlags, PixelFormat, VideoFrame, VideoParams};
pub use hw::{HwDevice, HwDeviceKind, HwDeviceRef, HwFramesContext, HwFramesRef};
pub use rational::Rational;
pub use tags::Tags;
pub use timestamp::{TimeBase, Timestamp};
