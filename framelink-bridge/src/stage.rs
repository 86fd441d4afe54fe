//! Pipeline stage interface and the graph-backed stage.
//!
//! The host pipeline composes stages without caring how each one is
//! implemented. A stage is either native host code or a wrapper around
//! a bridged filter graph; the two are distinguished by variant, not by
//! flags on a common struct.

use crate::bridge::{GraphBridge, PullResult};
use crate::control::{ControlRequest, ControlResponse};
use crate::error::{BridgeError, Result};
use crate::options::BridgeOptions;
use framelink_core::frame::{VideoFrame, VideoParams};
use framelink_graph::registry;

/// Hook adjusting stream parameters before the graph is rebuilt.
///
/// First argument is the declared input; the second starts as a copy
/// and may be edited in place.
pub type ReconfigHook = Box<dyn FnMut(&VideoParams, &mut VideoParams) + Send>;

/// A video processing stage in the host pipeline.
pub trait VideoStage: Send {
    /// The input stream changed; negotiate the output parameters.
    fn reconfig(&mut self, params: &VideoParams) -> Result<VideoParams>;

    /// Submit a frame.
    fn push_frame(&mut self, frame: VideoFrame) -> Result<()>;

    /// Signal end-of-stream.
    fn push_eof(&mut self) -> Result<()>;

    /// Poll for output.
    fn pull_frame(&mut self) -> Result<PullResult>;

    /// Handle a control request.
    fn control(&mut self, request: ControlRequest) -> ControlResponse {
        let _ = request;
        ControlResponse::Unsupported
    }
}

/// A stage in the host pipeline.
pub enum Stage {
    /// A stage implemented in host code.
    Native(Box<dyn VideoStage>),
    /// A stage backed by a bridged filter graph.
    GraphBridge(GraphBridgeStage),
}

impl Stage {
    pub fn reconfig(&mut self, params: &VideoParams) -> Result<VideoParams> {
        match self {
            Self::Native(s) => s.reconfig(params),
            Self::GraphBridge(s) => s.reconfig(params),
        }
    }

    pub fn push_frame(&mut self, frame: VideoFrame) -> Result<()> {
        match self {
            Self::Native(s) => s.push_frame(frame),
            Self::GraphBridge(s) => s.push_frame(frame),
        }
    }

    pub fn push_eof(&mut self) -> Result<()> {
        match self {
            Self::Native(s) => s.push_eof(),
            Self::GraphBridge(s) => s.push_eof(),
        }
    }

    pub fn pull_frame(&mut self) -> Result<PullResult> {
        match self {
            Self::Native(s) => s.pull_frame(),
            Self::GraphBridge(s) => s.pull_frame(),
        }
    }

    pub fn control(&mut self, request: ControlRequest) -> ControlResponse {
        match self {
            Self::Native(s) => s.control(request),
            Self::GraphBridge(s) => s.control(request),
        }
    }
}

/// A pipeline stage delegating its work to a bridged filter graph.
///
/// This is how host-facing filters are implemented as thin wrappers
/// over graph filters: wrap the graph filter by name, optionally swap
/// in a richer specification later, and let the bridge do the work.
pub struct GraphBridgeStage {
    bridge: GraphBridge,
    hook: Option<ReconfigHook>,
}

impl GraphBridgeStage {
    /// Create a stage from full bridge options.
    pub fn new(options: BridgeOptions) -> Result<Self> {
        Ok(Self {
            bridge: GraphBridge::new(options)?,
            hook: None,
        })
    }

    /// Wrap a single graph filter by name. Fails up front when no such
    /// filter exists, so a wrapper for a missing filter is caught at
    /// construction rather than on the first frame.
    pub fn wrap(filter_name: &str) -> Result<Self> {
        if registry::find(filter_name).is_none() {
            return Err(BridgeError::UnknownFilter(filter_name.to_string()));
        }
        Self::new(BridgeOptions::with_graph(filter_name))
    }

    /// Replace the graph specification. The active graph is discarded
    /// and rebuilt from the new specification on the next reconfig or
    /// frame.
    pub fn set_spec(&mut self, spec: impl Into<String>) -> Result<()> {
        let mut options = self.bridge.options().clone();
        options.graph = spec.into();
        let mut replacement = GraphBridge::new(options)?;
        if let Some(device) = self.bridge.hw_device() {
            replacement.set_hw_device(device.clone());
        }
        self.bridge = replacement;
        Ok(())
    }

    /// Install a hook that adjusts stream parameters before each
    /// rebuild. The graph is then built against the adjusted geometry.
    pub fn set_reconfig_hook(&mut self, hook: ReconfigHook) {
        self.hook = Some(hook);
    }

    /// Access the underlying bridge.
    pub fn bridge(&self) -> &GraphBridge {
        &self.bridge
    }

    /// Access the underlying bridge, mutable.
    pub fn bridge_mut(&mut self) -> &mut GraphBridge {
        &mut self.bridge
    }
}

impl VideoStage for GraphBridgeStage {
    fn reconfig(&mut self, params: &VideoParams) -> Result<VideoParams> {
        let mut adjusted = *params;
        if let Some(hook) = &mut self.hook {
            hook(params, &mut adjusted);
        }
        self.bridge.reconfigure(&adjusted)
    }

    fn push_frame(&mut self, frame: VideoFrame) -> Result<()> {
        self.bridge.push_frame(frame)
    }

    fn push_eof(&mut self) -> Result<()> {
        self.bridge.push_eof()
    }

    fn pull_frame(&mut self) -> Result<PullResult> {
        self.bridge.pull_frame()
    }

    fn control(&mut self, request: ControlRequest) -> ControlResponse {
        self.bridge.control(request)
    }
}
