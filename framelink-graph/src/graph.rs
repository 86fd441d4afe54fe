//! The filter graph runtime.
//!
//! A graph is a single chain of filters between a source endpoint fed by
//! the caller and a sink endpoint the caller drains. Construction is
//! two-phase: parse the specification into nodes, then `configure` to
//! negotiate link parameters end to end.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::error::{GraphError, Result};
use crate::filters::GraphFilter;
use crate::link::{GraphFrame, LinkParams};
use crate::registry::{self, FilterInfo};
use crate::spec::parse_graph_spec;
use framelink_core::frame::PixelFormat;
use framelink_core::hw::{HwDeviceRef, HwFramesRef};
use framelink_core::rational::Rational;
use framelink_core::timestamp::TimeBase;

/// Graph-wide construction options.
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// Opaque `key=value` options applied to the graph as a whole.
    pub options: Vec<(String, String)>,
    /// Default options for scaling stages, as `key=value` pairs joined
    /// by `:`. Currently only `flags` is interpreted.
    pub scale_opts: String,
}

impl GraphConfig {
    /// Default resampling-quality flags for scale stages that do not
    /// set their own. Falls back to bicubic (4).
    pub fn default_scale_flags(&self) -> i64 {
        self.scale_opts
            .split(':')
            .filter_map(|kv| kv.split_once('='))
            .find(|(k, _)| k.trim() == "flags")
            .and_then(|(_, v)| v.trim().parse().ok())
            .unwrap_or(4)
    }

    /// Look up an injected graph-wide option.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Properties of the stream entering the graph.
#[derive(Debug, Clone)]
pub struct SourceParams {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub time_base: TimeBase,
    pub sample_aspect_ratio: Rational,
    pub hw_frames: Option<HwFramesRef>,
}

/// Result of polling the sink endpoint.
#[derive(Debug)]
pub enum SinkPoll {
    /// A filtered frame is ready.
    Frame(GraphFrame),
    /// The graph needs more input before it can produce output.
    NotReady,
    /// End-of-stream has propagated through; no more frames will come.
    Exhausted,
}

struct Node {
    info: &'static FilterInfo,
    filter: Box<dyn GraphFilter>,
}

/// A configured chain of filters with one source and one sink.
pub struct FilterGraph {
    config: GraphConfig,
    nodes: Vec<Node>,
    source: Option<SourceParams>,
    sink_set: bool,
    hw_device: Option<HwDeviceRef>,
    source_link: Option<LinkParams>,
    sink_link: Option<LinkParams>,
    ready: VecDeque<GraphFrame>,
    drained: bool,
}

impl FilterGraph {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            source: None,
            sink_set: false,
            hw_device: None,
            source_link: None,
            sink_link: None,
            ready: VecDeque::new(),
            drained: false,
        }
    }

    /// Declare the stream that will feed the source endpoint.
    pub fn set_source(&mut self, params: SourceParams) {
        self.source = Some(params);
    }

    /// Attach the sink endpoint.
    pub fn set_sink(&mut self) {
        self.sink_set = true;
    }

    /// Make a device context available to hardware-capable stages. The
    /// device is handed to every node during `configure`.
    pub fn set_hw_device(&mut self, device: HwDeviceRef) {
        self.hw_device = Some(device);
    }

    /// Parse a specification string and instantiate its stages.
    pub fn parse_into(&mut self, spec: &str) -> Result<()> {
        for parsed in parse_graph_spec(spec)? {
            let info = registry::find(&parsed.name)
                .ok_or_else(|| GraphError::UnknownFilter(parsed.name.clone()))?;
            let filter = registry::instantiate(&parsed, &self.config)?;
            self.nodes.push(Node { info, filter });
        }
        Ok(())
    }

    /// Negotiate link parameters through the chain and finalize the
    /// graph. Both endpoints must be set first.
    pub fn configure(&mut self) -> Result<()> {
        let source = self
            .source
            .as_ref()
            .ok_or(GraphError::MissingEndpoint("source"))?;
        if !self.sink_set {
            return Err(GraphError::MissingEndpoint("sink"));
        }

        for (key, value) in &self.config.options {
            debug!(%key, %value, "applying graph option");
        }
        if let Some(device) = &self.hw_device {
            for node in &mut self.nodes {
                node.filter.attach_hw_device(device);
            }
        }

        let mut link = LinkParams {
            width: source.width,
            height: source.height,
            format: source.format,
            time_base: source.time_base,
            sample_aspect_ratio: source.sample_aspect_ratio,
            hw_frames: source.hw_frames.clone(),
        };
        self.source_link = Some(link.clone());

        // The sink consumes exactly one output. Every extra output a
        // node declares is left dangling and fails configuration.
        let mut outputs: u32 = 1;
        for node in &mut self.nodes {
            outputs += node.info.num_outputs.saturating_sub(node.info.num_inputs);
            link = node.filter.negotiate(&link)?;
        }
        if outputs != 1 {
            return Err(GraphError::EndpointArity {
                expected: 1,
                actual: outputs,
            });
        }

        debug!(
            width = link.width,
            height = link.height,
            format = %link.format,
            stages = self.nodes.len(),
            "graph configured"
        );
        self.sink_link = Some(link);
        Ok(())
    }

    /// Parameters of the link feeding the first stage.
    pub fn source_link(&self) -> Result<&LinkParams> {
        self.source_link.as_ref().ok_or(GraphError::NotConfigured)
    }

    /// Parameters of the link entering the sink.
    pub fn sink_link(&self) -> Result<&LinkParams> {
        self.sink_link.as_ref().ok_or(GraphError::NotConfigured)
    }

    /// Submit a frame, or signal end-of-stream with `None`.
    ///
    /// After end-of-stream the graph is exhausted and rejects further
    /// frames until it is rebuilt.
    pub fn push(&mut self, frame: Option<GraphFrame>) -> Result<()> {
        if self.sink_link.is_none() {
            return Err(GraphError::NotConfigured);
        }
        match frame {
            Some(frame) => {
                if self.drained {
                    return Err(GraphError::Exhausted);
                }
                trace!(pts = frame.pts.value, "frame enters graph");
                let out = Self::run_chain(&mut self.nodes, 0, frame)?;
                self.ready.extend(out);
            }
            None => {
                if !self.drained {
                    debug!("end-of-stream entering graph");
                    self.flush_all()?;
                    self.drained = true;
                }
            }
        }
        Ok(())
    }

    /// Poll the sink for output.
    pub fn pull(&mut self) -> Result<SinkPoll> {
        if self.sink_link.is_none() {
            return Err(GraphError::NotConfigured);
        }
        if let Some(frame) = self.ready.pop_front() {
            trace!(pts = frame.pts.value, "frame leaves graph");
            return Ok(SinkPoll::Frame(frame));
        }
        if self.drained {
            return Ok(SinkPoll::Exhausted);
        }
        Ok(SinkPoll::NotReady)
    }

    /// Send a runtime command to the named stage, or to every stage
    /// when `target` is `"all"`.
    pub fn send_command(&mut self, target: &str, name: &str, arg: &str) -> Result<()> {
        let mut handled = false;
        for node in &mut self.nodes {
            if target == "all" || target == node.info.name {
                handled |= node.filter.process_command(name, arg);
            }
        }
        if handled {
            Ok(())
        } else {
            Err(GraphError::CommandUnsupported)
        }
    }

    /// Whether any stage in the chain handles runtime commands.
    pub fn supports_commands(&self) -> bool {
        self.nodes.iter().any(|n| n.filter.supports_commands())
    }

    fn run_chain(nodes: &mut [Node], from: usize, frame: GraphFrame) -> Result<Vec<GraphFrame>> {
        let mut frames = vec![frame];
        for node in &mut nodes[from..] {
            let mut next = Vec::with_capacity(frames.len());
            for f in frames {
                next.extend(node.filter.filter(f)?);
            }
            frames = next;
        }
        Ok(frames)
    }

    fn flush_all(&mut self) -> Result<()> {
        for i in 0..self.nodes.len() {
            let flushed = self.nodes[i].filter.flush()?;
            for frame in flushed {
                let out = Self::run_chain(&mut self.nodes, i + 1, frame)?;
                self.ready.extend(out);
            }
        }
        Ok(())
    }
}
