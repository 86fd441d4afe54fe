//! Graph specification parsing.
//!
//! A specification is a comma-separated chain of stages, each of the form
//! `name=arg:arg:key=value`. Separator characters inside values are
//! backslash-escaped, so a specification assembled by the typed builder
//! can never be re-tokenized by hostile parameter content.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};

/// A parsed filter stage: name plus ordered parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFilter {
    pub name: String,
    pub params: Vec<FilterParam>,
}

/// A filter parameter, keyed (`key=value`) or positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParam {
    pub key: Option<String>,
    pub value: String,
}

impl ParsedFilter {
    /// Look up a parameter by key, or by position among unkeyed params.
    pub fn param(&self, key: &str, position: usize) -> Option<&str> {
        if let Some(p) = self
            .params
            .iter()
            .find(|p| p.key.as_deref() == Some(key))
        {
            return Some(&p.value);
        }
        self.params
            .iter()
            .filter(|p| p.key.is_none())
            .nth(position)
            .map(|p| p.value.as_str())
    }
}

/// Escape separator characters in a parameter value.
pub fn escape_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | ',' | ':' | ';' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Remove backslash escapes.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Byte offset of the first unescaped occurrence of `sep`.
fn find_unescaped(s: &str, sep: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            return Some(i);
        }
    }
    None
}

/// Split on unescaped occurrences of `sep`.
fn split_unescaped(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(i) = find_unescaped(rest, sep) {
        parts.push(&rest[..i]);
        rest = &rest[i + sep.len_utf8()..];
    }
    parts.push(rest);
    parts
}

/// Parse a graph specification into an ordered filter chain.
pub fn parse_graph_spec(input: &str) -> Result<Vec<ParsedFilter>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(GraphError::InvalidSpec("empty specification".into()));
    }
    if find_unescaped(input, ';').is_some() {
        return Err(GraphError::MultiChain);
    }

    let mut filters = Vec::new();
    for stage in split_unescaped(input, ',') {
        let stage = stage.trim();
        if stage.is_empty() {
            return Err(GraphError::InvalidSpec("empty stage in chain".into()));
        }

        let (name, params_str) = match find_unescaped(stage, '=') {
            Some(i) => (stage[..i].trim(), Some(&stage[i + 1..])),
            None => (stage, None),
        };
        if name.is_empty() {
            return Err(GraphError::InvalidSpec(format!(
                "stage '{}' has no filter name",
                stage
            )));
        }

        let params = match params_str {
            Some(p) => split_unescaped(p, ':')
                .into_iter()
                .map(|param| match find_unescaped(param, '=') {
                    Some(i) => FilterParam {
                        key: Some(unescape(&param[..i])),
                        value: unescape(&param[i + 1..]),
                    },
                    None => FilterParam {
                        key: None,
                        value: unescape(param),
                    },
                })
                .collect(),
            None => Vec::new(),
        };

        filters.push(ParsedFilter {
            name: unescape(name),
            params,
        });
    }

    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_filter() {
        let chain = parse_graph_spec("scale=1280:720").unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name, "scale");
        assert_eq!(chain[0].params.len(), 2);
        assert_eq!(chain[0].params[0].value, "1280");
    }

    #[test]
    fn test_parse_chain() {
        let chain = parse_graph_spec("scale=1280:720,null,setsar=4/3").unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[1].name, "null");
        assert_eq!(chain[2].name, "setsar");
    }

    #[test]
    fn test_parse_keyed_params() {
        let chain = parse_graph_spec("eq=brightness=0.1").unwrap();
        assert_eq!(chain[0].params[0].key.as_deref(), Some("brightness"));
        assert_eq!(chain[0].params[0].value, "0.1");
    }

    #[test]
    fn test_param_lookup() {
        let chain = parse_graph_spec("scale=640:height=480").unwrap();
        assert_eq!(chain[0].param("width", 0), Some("640"));
        assert_eq!(chain[0].param("height", 1), Some("480"));
    }

    #[test]
    fn test_multi_chain_rejected() {
        assert!(matches!(
            parse_graph_spec("scale=1:1;null"),
            Err(GraphError::MultiChain)
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(parse_graph_spec("").is_err());
        assert!(parse_graph_spec("null,,null").is_err());
    }

    #[test]
    fn test_escaped_separators_stay_in_value() {
        let spec = format!("setmeta=comment={}", escape_value("a,b:c=d"));
        let chain = parse_graph_spec(&spec).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].params.len(), 1);
        assert_eq!(chain[0].params[0].value, "a,b:c=d");
    }

    #[test]
    fn test_escape_roundtrip() {
        let raw = r"semi;colon:comma,eq=back\slash";
        let spec = format!("setmeta=k={}", escape_value(raw));
        let chain = parse_graph_spec(&spec).unwrap();
        assert_eq!(chain[0].params[0].value, raw);
    }
}
