//! Control-plane requests routed to a stage.

use framelink_core::tags::Tags;

/// A control request from the host pipeline.
#[derive(Debug, Clone)]
pub enum ControlRequest {
    /// A seek happened; discard in-flight state.
    SeekReset,
    /// Forward a runtime command to filters inside the graph.
    Command {
        /// Filter name to address, or `"all"`.
        target: String,
        /// Command name.
        name: String,
        /// Command argument.
        arg: String,
    },
    /// Read the most recent frame-metadata snapshot.
    GetMetadata,
}

/// Outcome of a control request.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlResponse {
    /// Request handled.
    Ok,
    /// Metadata snapshot.
    Metadata(Tags),
    /// The request needs an active graph and none exists right now.
    NotAvailable,
    /// No handler for this request.
    Unsupported,
}
