//! Typed construction of graph specification strings.
//!
//! Assembling a specification by string formatting breaks as soon as a
//! parameter value contains a separator character. The builder escapes
//! every value it is given, so the assembled string always parses back
//! into exactly the filters and parameters that were specified.

use framelink_graph::spec::escape_value;

/// Builds the specification for one filter stage.
#[derive(Debug, Clone)]
pub struct FilterSpecBuilder {
    name: String,
    args: Vec<(Option<String>, String)>,
}

impl FilterSpecBuilder {
    /// Start a stage for the named filter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push((None, value.to_string()));
        self
    }

    /// Append a `key=value` argument.
    pub fn opt(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.args.push((Some(key.into()), value.to_string()));
        self
    }

    /// Render the stage specification.
    pub fn build(&self) -> String {
        if self.args.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self
            .args
            .iter()
            .map(|(key, value)| match key {
                Some(k) => format!("{}={}", escape_value(k), escape_value(value)),
                None => escape_value(value),
            })
            .collect();
        format!("{}={}", self.name, args.join(":"))
    }
}

/// Builds a full chain specification from stages.
#[derive(Debug, Clone, Default)]
pub struct ChainSpec {
    stages: Vec<String>,
}

impl ChainSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn then(mut self, stage: FilterSpecBuilder) -> Self {
        self.stages.push(stage.build());
        self
    }

    /// Number of stages so far.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Render the chain specification.
    pub fn build(&self) -> String {
        self.stages.join(",")
    }
}
