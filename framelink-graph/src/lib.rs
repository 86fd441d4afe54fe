//! Single-chain video filter-graph runtime.
//!
//! The graph takes frames at a source endpoint, runs them through an
//! ordered chain of filters parsed from a textual specification, and
//! hands results back at a sink endpoint. It is driven externally; the
//! caller alternates push and pull and handles the not-ready and
//! exhausted conditions the sink reports.

pub mod error;
pub mod filters;
pub mod graph;
pub mod link;
pub mod registry;
pub mod spec;

pub use error::{GraphError, Result};
pub use graph::{FilterGraph, GraphConfig, SinkPoll, SourceParams};
pub use link::{GraphFrame, LinkParams};
