//! The graph bridge: owns the filter graph lifecycle and moves frames
//! across the boundary.

use tracing::{debug, error, info, trace};

use crate::adapter::{self, LinkTiming};
use crate::control::{ControlRequest, ControlResponse};
use crate::error::{BridgeError, Result};
use crate::metadata;
use crate::options::BridgeOptions;
use framelink_core::frame::{VideoFrame, VideoParams};
use framelink_core::hw::{HwDeviceRef, HwFramesContext, HwFramesRef};
use framelink_core::tags::Tags;
use framelink_core::timestamp::TimeBase;
use framelink_graph::graph::SourceParams;
use framelink_graph::{FilterGraph, GraphConfig, SinkPoll};

/// Outcome of polling the bridge for output.
#[derive(Debug)]
pub enum PullResult {
    /// A filtered frame.
    Frame(VideoFrame),
    /// The graph needs more input first.
    NeedMore,
    /// The stream has ended; no further output will come.
    Eof,
}

struct ActiveGraph {
    graph: FilterGraph,
    timing: LinkTiming,
}

/// Owns a dynamically built filter graph and adapts host frames to and
/// from it.
///
/// The graph is rebuilt whenever the input stream's geometry or format
/// changes; end-of-stream is sticky until a rebuild or an explicit
/// reset. All state lives in this one struct, so dropping the bridge
/// tears everything down.
pub struct GraphBridge {
    options: BridgeOptions,
    hw_device: Option<HwDeviceRef>,
    active: Option<ActiveGraph>,
    /// End-of-stream was signaled; set until the graph is rebuilt.
    drained: bool,
    /// Snapshot of the newest frame-metadata dictionary, once any frame
    /// has carried one.
    metadata: Option<Tags>,
    last_input: Option<VideoParams>,
    output: Option<VideoParams>,
    in_hw_frames: Option<HwFramesRef>,
}

impl GraphBridge {
    /// Create a bridge from its options. The specification string is
    /// checked for emptiness here; everything else is validated when
    /// the graph is built.
    pub fn new(options: BridgeOptions) -> Result<Self> {
        if options.graph.trim().is_empty() {
            return Err(BridgeError::EmptySpec);
        }
        Ok(Self {
            options,
            hw_device: None,
            active: None,
            drained: false,
            metadata: None,
            last_input: None,
            output: None,
            in_hw_frames: None,
        })
    }

    /// Make a hardware device available to the graph.
    pub fn set_hw_device(&mut self, device: HwDeviceRef) {
        self.hw_device = Some(device);
    }

    /// The attached hardware device, if any.
    pub fn hw_device(&self) -> Option<&HwDeviceRef> {
        self.hw_device.as_ref()
    }

    /// The configured options.
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Output stream parameters negotiated by the last rebuild.
    pub fn output_params(&self) -> Option<&VideoParams> {
        self.output.as_ref()
    }

    /// Whether a graph is currently active.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Tear down the active graph, discarding the metadata snapshot,
    /// the end-of-stream latch, and the negotiated output parameters.
    /// Safe to call repeatedly; a bridge without a graph stays without
    /// one.
    pub fn destroy_graph(&mut self) {
        if self.active.take().is_some() {
            debug!("filter graph destroyed");
        }
        self.metadata = None;
        self.output = None;
        self.drained = false;
    }

    /// Build a fresh graph for the given input stream parameters.
    ///
    /// Any existing graph is destroyed first. On success the bridge's
    /// end-of-stream latch is cleared and the negotiated output
    /// parameters are returned.
    pub fn reconfigure(&mut self, params: &VideoParams) -> Result<VideoParams> {
        self.destroy_graph();

        if self.options.graph.trim().is_empty() {
            return Err(BridgeError::EmptySpec);
        }

        info!(graph = %self.options.graph, input = %params, "building filter graph");

        let config = GraphConfig {
            options: self.options.o.clone(),
            scale_opts: format!("flags={}", self.options.sws_flags),
        };
        let mut graph = FilterGraph::new(config);
        if let Some(device) = &self.hw_device {
            graph.set_hw_device(device.clone());
        }
        graph.parse_into(&self.options.graph)?;

        graph.set_source(SourceParams {
            width: params.width,
            height: params.height,
            format: params.format,
            time_base: TimeBase::MICROSECONDS,
            sample_aspect_ratio: params.par,
            hw_frames: self.source_hw_frames(params),
        });
        graph.set_sink();
        graph.configure()?;

        let source = graph.source_link()?;
        let timing = LinkTiming {
            to_graph: source.time_base,
            from_graph: graph.sink_link()?.time_base,
            par_in: source.sample_aspect_ratio,
        };
        let sink = graph.sink_link()?;
        let out = VideoParams {
            width: sink.width,
            height: sink.height,
            format: sink.format,
            par: sink.sample_aspect_ratio,
            hw_subfmt: sink.hw_frames.as_ref().map(|ctx| ctx.sw_format),
        };
        debug!(output = %out, "graph negotiated");

        self.active = Some(ActiveGraph { graph, timing });
        self.last_input = Some(*params);
        self.output = Some(out);
        self.drained = false;
        Ok(out)
    }

    /// Submit one frame. Fails with `NotConfigured` until the bridge
    /// has been configured via `reconfigure`.
    ///
    /// A configured bridge rebuilds its graph when the frame's
    /// parameters differ from the ones the graph was built for, or when
    /// end-of-stream was already signaled. The latter makes a fresh
    /// segment after EOF start over instead of being swallowed by the
    /// drained graph.
    pub fn push_frame(&mut self, frame: VideoFrame) -> Result<()> {
        if self.last_input.is_none() {
            return Err(BridgeError::NotConfigured);
        }
        let params = frame.params();
        self.in_hw_frames = frame.hw_frames.clone();

        if self.active.is_none() || self.drained || self.last_input != Some(params) {
            if let Err(e) = self.reconfigure(&params) {
                error!(error = %e, "mid-stream graph rebuild failed");
                return Err(BridgeError::Reconfig);
            }
        }

        let active = self.active.as_mut().ok_or(BridgeError::NotConfigured)?;
        let gf = adapter::to_graph_frame(frame, &active.timing);
        trace!(pts = gf.pts.value, "frame crosses into graph");
        active.graph.push(Some(gf)).map_err(BridgeError::Submit)
    }

    /// Signal end-of-stream. Idempotent on a configured bridge; fails
    /// with `NotConfigured` when the bridge was never configured.
    pub fn push_eof(&mut self) -> Result<()> {
        if self.last_input.is_none() {
            return Err(BridgeError::NotConfigured);
        }
        if let Some(active) = &mut self.active {
            active.graph.push(None).map_err(BridgeError::Submit)?;
        }
        self.drained = true;
        Ok(())
    }

    /// Poll for a filtered frame.
    pub fn pull_frame(&mut self) -> Result<PullResult> {
        let Some(active) = &mut self.active else {
            return if self.drained {
                Ok(PullResult::Eof)
            } else {
                Ok(PullResult::NeedMore)
            };
        };
        match active.graph.pull().map_err(BridgeError::Retrieve)? {
            SinkPoll::Frame(gf) => {
                metadata::capture(&mut self.metadata, &gf);
                let frame = adapter::from_graph_frame(gf, &active.timing);
                Ok(PullResult::Frame(frame))
            }
            SinkPoll::NotReady => Ok(PullResult::NeedMore),
            SinkPoll::Exhausted => Ok(PullResult::Eof),
        }
    }

    /// Discard in-flight graph state, as after a seek. The graph is
    /// rebuilt against the last known input parameters; if none are
    /// known yet there is nothing to discard.
    pub fn reset(&mut self) -> Result<()> {
        self.drained = false;
        match self.last_input {
            Some(params) => self.reconfigure(&params).map(|_| ()),
            None => {
                self.destroy_graph();
                Ok(())
            }
        }
    }

    /// Handle a control request.
    pub fn control(&mut self, request: ControlRequest) -> ControlResponse {
        match request {
            ControlRequest::SeekReset => match self.reset() {
                Ok(()) => ControlResponse::Ok,
                Err(e) => {
                    error!(error = %e, "graph reset failed");
                    self.destroy_graph();
                    ControlResponse::NotAvailable
                }
            },
            ControlRequest::Command { target, name, arg } => match &mut self.active {
                Some(active) => match active.graph.send_command(&target, &name, &arg) {
                    Ok(()) => ControlResponse::Ok,
                    Err(_) => ControlResponse::Unsupported,
                },
                None => ControlResponse::NotAvailable,
            },
            ControlRequest::GetMetadata => match &self.metadata {
                Some(tags) => ControlResponse::Metadata(tags.clone()),
                None => ControlResponse::NotAvailable,
            },
        }
    }

    fn source_hw_frames(&self, params: &VideoParams) -> Option<HwFramesRef> {
        if let Some(frames) = &self.in_hw_frames {
            return Some(frames.clone());
        }
        // Derive a pool from the declared surface format when the host
        // announced hardware input before any frame arrived.
        match (params.hw_subfmt, &self.hw_device) {
            (Some(subfmt), Some(device)) => Some(HwFramesContext::new(
                device.clone(),
                subfmt,
                params.width,
                params.height,
            )),
            _ => None,
        }
    }
}
