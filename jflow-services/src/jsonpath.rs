//! JSONPath extraction service
//!
//! Evaluates configured JSONPath expressions against the message payload and
//! writes the results to the payload or to metadata keys. Expressions are
//! compiled once at `init`; `apply` only evaluates.

use serde_json::Value;
use serde_json_path::JsonPath;
use tracing::debug;

use jflow_core::{JflowError, Message, Result, Service};

/// Where an extracted value is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Replace the message payload with the extracted value.
    Payload,
    /// Write the extracted value to this metadata key.
    Metadata(String),
}

/// One JSONPath expression and its destination.
#[derive(Debug, Clone)]
pub struct PathMapping {
    expr: String,
    target: Target,
}

impl PathMapping {
    /// Extract `expr` into the message payload.
    pub fn to_payload(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            target: Target::Payload,
        }
    }

    /// Extract `expr` into the given metadata key.
    pub fn to_metadata(expr: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            target: Target::Metadata(key.into()),
        }
    }

    /// The JSONPath expression text.
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// The destination of the extracted value.
    pub fn target(&self) -> &Target {
        &self.target
    }
}

/// Service applying a list of [`PathMapping`]s per message.
///
/// All expressions are evaluated against a snapshot of the incoming payload,
/// so a payload-targeted mapping does not change what later mappings see.
/// A singular query result is written as-is (strings land in metadata
/// unquoted); multiple results are collected into a JSON array. An empty
/// result fails the service unless [`allow_no_match`](Self::allow_no_match)
/// was configured.
#[derive(Debug)]
pub struct JsonPathService {
    mappings: Vec<PathMapping>,
    compiled: Vec<JsonPath>,
    fail_on_no_match: bool,
}

impl JsonPathService {
    /// Create the service; expressions compile at `init`.
    pub fn new(mappings: Vec<PathMapping>) -> Self {
        Self {
            mappings,
            compiled: Vec::new(),
            fail_on_no_match: true,
        }
    }

    /// Treat an empty query result as a no-op instead of an error.
    pub fn allow_no_match(mut self) -> Self {
        self.fail_on_no_match = false;
        self
    }
}

impl Service for JsonPathService {
    fn init(&mut self) -> Result<()> {
        self.compiled = self
            .mappings
            .iter()
            .map(|mapping| {
                JsonPath::parse(&mapping.expr).map_err(|err| {
                    JflowError::Config(format!("bad JSONPath '{}': {}", mapping.expr, err))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    fn apply(&mut self, message: &mut Message) -> Result<()> {
        if self.compiled.len() != self.mappings.len() {
            return Err(JflowError::Config(
                "JsonPathService used before init".to_string(),
            ));
        }

        let document = message.payload_value()?;
        for (mapping, path) in self.mappings.iter().zip(&self.compiled) {
            let nodes = path.query(&document).all();
            let extracted = match nodes.len() {
                0 => {
                    if self.fail_on_no_match {
                        return Err(JflowError::NoMatch(mapping.expr.clone()));
                    }
                    debug!(expr = %mapping.expr, "no match, skipping mapping");
                    continue;
                }
                1 => nodes[0].clone(),
                _ => Value::Array(nodes.into_iter().cloned().collect()),
            };

            match &mapping.target {
                Target::Payload => message.set_payload_value(&extracted)?,
                Target::Metadata(key) => {
                    message.add_metadata(key.clone(), metadata_repr(&extracted))
                }
            }
        }
        Ok(())
    }
}

/// Strings are written raw; everything else as compact JSON.
fn metadata_repr(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
