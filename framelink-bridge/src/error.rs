//! Bridge error types.

use framelink_graph::GraphError;
use thiserror::Error;

/// Errors raised at the bridge boundary.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The configured specification is empty; the bridge refuses to
    /// build a do-nothing graph.
    #[error("Empty graph specification")]
    EmptySpec,

    /// Building or configuring the graph failed.
    #[error("Failed to build filter graph: {0}")]
    GraphBuild(#[from] GraphError),

    /// A rebuild triggered mid-stream failed; the stream cannot
    /// continue in a defined state.
    #[error("Graph rebuild failed mid-stream")]
    Reconfig,

    /// An operation needed an active graph and none exists.
    #[error("No active filter graph")]
    NotConfigured,

    /// Submitting a frame to the graph failed.
    #[error("Failed to submit frame to graph: {0}")]
    Submit(GraphError),

    /// Retrieving a frame from the graph failed.
    #[error("Failed to retrieve frame from graph: {0}")]
    Retrieve(GraphError),

    /// The requested stage name does not exist in the registry.
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}

impl BridgeError {
    /// Whether the failure rules out continuing with this
    /// configuration.
    ///
    /// Specification and build failures mean the configured graph can
    /// never work and retrying is pointless. Submission and retrieval
    /// failures concern one frame; the graph stays up and the stream
    /// continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptySpec | Self::GraphBuild(_) | Self::Reconfig
        )
    }
}

/// Bridge result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_errors_keep_the_graph() {
        assert!(!BridgeError::Submit(GraphError::Exhausted).is_fatal());
        assert!(!BridgeError::Retrieve(GraphError::NotConfigured).is_fatal());
    }

    #[test]
    fn test_configuration_errors_are_fatal() {
        assert!(BridgeError::EmptySpec.is_fatal());
        assert!(BridgeError::GraphBuild(GraphError::MultiChain).is_fatal());
        assert!(BridgeError::Reconfig.is_fatal());
    }
}
