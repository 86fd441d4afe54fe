//! Bridges frames from a host media pipeline into a dynamically
//! specified external filter graph.
//!
//! The host pipeline speaks optional floating-point seconds and owned
//! frame buffers; the graph speaks integer ticks and its own frame
//! representation. The bridge owns the graph's lifecycle, rebuilding it
//! whenever the input stream's geometry changes, converts frames in
//! both directions without copying pixel data, forwards runtime
//! commands, and surfaces per-frame metadata published by filters
//! inside the graph.

pub mod adapter;
pub mod bridge;
pub mod builder;
pub mod control;
pub mod error;
pub mod help;
pub mod metadata;
pub mod options;
pub mod stage;

pub use bridge::{GraphBridge, PullResult};
pub use builder::{ChainSpec, FilterSpecBuilder};
pub use control::{ControlRequest, ControlResponse};
pub use error::{BridgeError, Result};
pub use options::BridgeOptions;
pub use stage::{GraphBridgeStage, ReconfigHook, Stage, VideoStage};
