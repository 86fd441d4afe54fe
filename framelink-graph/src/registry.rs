//! Static filter registry.

use crate::error::{GraphError, Result};
use crate::filters::{
    EqFilter, GraphFilter, NullFilter, ScaleFilter, SetMetaFilter, SetSarFilter, SplitFilter,
};
use crate::graph::GraphConfig;
use crate::spec::ParsedFilter;

/// Registry entry for one filter.
#[derive(Debug, Clone, Copy)]
pub struct FilterInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub num_inputs: u32,
    pub num_outputs: u32,
}

static FILTERS: &[FilterInfo] = &[
    FilterInfo {
        name: "null",
        description: "Pass frames through unchanged",
        num_inputs: 1,
        num_outputs: 1,
    },
    FilterInfo {
        name: "scale",
        description: "Resize frames",
        num_inputs: 1,
        num_outputs: 1,
    },
    FilterInfo {
        name: "setsar",
        description: "Set the sample aspect ratio",
        num_inputs: 1,
        num_outputs: 1,
    },
    FilterInfo {
        name: "eq",
        description: "Adjust brightness",
        num_inputs: 1,
        num_outputs: 1,
    },
    FilterInfo {
        name: "setmeta",
        description: "Attach a metadata tag to frames",
        num_inputs: 1,
        num_outputs: 1,
    },
    FilterInfo {
        name: "split",
        description: "Duplicate the input to two outputs",
        num_inputs: 1,
        num_outputs: 2,
    },
];

/// Look up a filter by name.
pub fn find(name: &str) -> Option<&'static FilterInfo> {
    FILTERS.iter().find(|f| f.name == name)
}

/// All registered filters usable in a simple video chain, meaning one
/// input and one output.
pub fn video_filters() -> impl Iterator<Item = &'static FilterInfo> {
    FILTERS
        .iter()
        .filter(|f| f.num_inputs == 1 && f.num_outputs == 1)
}

/// Instantiate a filter from its parsed stage.
pub fn instantiate(parsed: &ParsedFilter, config: &GraphConfig) -> Result<Box<dyn GraphFilter>> {
    let filter: Box<dyn GraphFilter> = match parsed.name.as_str() {
        "null" => Box::new(NullFilter::new(parsed)?),
        "scale" => Box::new(ScaleFilter::new(parsed, config)?),
        "setsar" => Box::new(SetSarFilter::new(parsed)?),
        "eq" => Box::new(EqFilter::new(parsed)?),
        "setmeta" => Box::new(SetMetaFilter::new(parsed)?),
        "split" => Box::new(SplitFilter::new(parsed)?),
        other => return Err(GraphError::UnknownFilter(other.to_string())),
    };
    Ok(filter)
}
