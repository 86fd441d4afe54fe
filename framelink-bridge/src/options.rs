//! User-facing bridge configuration.

use serde::{Deserialize, Serialize};

fn default_sws_flags() -> i64 {
    4 // bicubic
}

/// Configuration surface of a bridge stage.
///
/// `graph` is the raw specification string handed to the graph parser.
/// It is accepted verbatim at configuration time; validation happens
/// when the first frame arrives and the graph is actually built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeOptions {
    /// Textual graph specification.
    pub graph: String,
    /// Default resampling-quality flags for scaling stages inside the
    /// graph that do not set their own.
    pub sws_flags: i64,
    /// Opaque `key=value` options forwarded to graph construction.
    pub o: Vec<(String, String)>,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            graph: String::new(),
            sws_flags: default_sws_flags(),
            o: Vec::new(),
        }
    }
}

impl BridgeOptions {
    /// Options with only a graph specification set.
    pub fn with_graph(graph: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            ..Self::default()
        }
    }
}
