//! Diagnostic listing of available graph filters.

use std::fmt::Write;

use tracing::info;

use framelink_graph::registry;

/// Render the list of filters usable in a bridged graph.
///
/// Only simple video filters, one input and one output, are usable in
/// a chain; the listing is restricted to those.
pub fn filter_help() -> String {
    let mut out = String::from("Available filters:\n");
    for info in registry::video_filters() {
        // write! to a String cannot fail
        let _ = writeln!(out, "  {:<12} {}", info.name, info.description);
    }
    out
}

/// Log the filter listing.
pub fn log_filters() {
    for line in filter_help().lines() {
        info!("{}", line);
    }
}
