//! Graph runtime error types.

use thiserror::Error;

/// Filter-graph runtime error type.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Malformed specification string.
    #[error("Invalid graph specification: {0}")]
    InvalidSpec(String),

    /// Parallel chains are not supported; the graph has exactly one
    /// source and one sink.
    #[error("Multiple filter chains are not supported")]
    MultiChain,

    /// No filter registered under this name.
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    /// Bad filter parameter.
    #[error("Invalid parameter for filter '{filter}': {message}")]
    InvalidParam {
        filter: String,
        message: String,
    },

    /// Source or sink endpoint was not set before configuration.
    #[error("Missing {0} endpoint")]
    MissingEndpoint(&'static str),

    /// The configured chain does not resolve to a single-input,
    /// single-output video path.
    #[error("Endpoint arity violation: expected {expected} sink-facing output(s), found {actual}")]
    EndpointArity { expected: u32, actual: u32 },

    /// Link parameter negotiation failed.
    #[error("Negotiation failed: {0}")]
    Negotiation(String),

    /// Operation requires a configured graph.
    #[error("Graph not configured")]
    NotConfigured,

    /// The graph has seen end-of-stream and refuses further input.
    #[error("Graph is exhausted; end-of-stream already signaled")]
    Exhausted,

    /// No node in the graph handled the command.
    #[error("Command not supported by any filter")]
    CommandUnsupported,
}

/// Graph result type.
pub type Result<T> = std::result::Result<T, GraphError>;
