//! Message aggregators
//!
//! The inverse of splitting: fold a batch of messages back into a single
//! payload on the original message. Aggregation never touches the parts'
//! metadata; the original message keeps its own.

use serde_json::{Map, Value};
use tracing::debug;

use jflow_core::{JflowError, Message, Result};

use crate::splitter::json_type_name;

/// Folds a batch of messages into the original message's payload.
pub trait MessageAggregator {
    /// Replace `original`'s payload with the aggregate of `parts`.
    fn aggregate(&self, original: &mut Message, parts: &[Message]) -> Result<()>;
}

/// Collects each part's JSON payload into a single top-level array.
///
/// Part order is preserved. Any valid JSON payload is accepted; a part that
/// does not parse aborts aggregation with the original payload untouched.
#[derive(Debug, Clone, Default)]
pub struct ArrayAggregator;

impl ArrayAggregator {
    /// Create an array aggregator.
    pub fn new() -> Self {
        Self
    }
}

impl MessageAggregator for ArrayAggregator {
    fn aggregate(&self, original: &mut Message, parts: &[Message]) -> Result<()> {
        let mut elements = Vec::with_capacity(parts.len());
        for part in parts {
            elements.push(part.payload_value()?);
        }
        debug!(parts = elements.len(), "aggregated messages into array");
        original.set_payload_value(&Value::Array(elements))
    }
}

/// Merges object payloads into a single top-level object.
///
/// Keys from later parts overwrite earlier ones. Every part must carry an
/// object payload; anything else fails aggregation before the original
/// payload is modified.
#[derive(Debug, Clone, Default)]
pub struct MergeAggregator;

impl MergeAggregator {
    /// Create a merge aggregator.
    pub fn new() -> Self {
        Self
    }
}

impl MessageAggregator for MergeAggregator {
    fn aggregate(&self, original: &mut Message, parts: &[Message]) -> Result<()> {
        let mut merged = Map::new();
        for part in parts {
            match part.payload_value()? {
                Value::Object(fields) => merged.extend(fields),
                other => {
                    return Err(JflowError::Patch(format!(
                        "cannot merge non-object part ({})",
                        json_type_name(&other)
                    )))
                }
            }
        }
        debug!(keys = merged.len(), "merged messages into object");
        original.set_payload_value(&Value::Object(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_aggregator_preserves_order() {
        let mut original = Message::from_text("[]");
        let parts = vec![
            Message::from_text(r#"{"id":1}"#),
            Message::from_text("2"),
            Message::from_text(r#""three""#),
        ];
        ArrayAggregator::new()
            .aggregate(&mut original, &parts)
            .unwrap();
        assert_eq!(
            original.payload_value().unwrap(),
            json!([{"id":1}, 2, "three"])
        );
    }

    #[test]
    fn test_array_aggregator_empty_batch() {
        let mut original = Message::from_text(r#"{"untouched":true}"#);
        ArrayAggregator::new().aggregate(&mut original, &[]).unwrap();
        assert_eq!(original.payload_value().unwrap(), json!([]));
    }

    #[test]
    fn test_array_aggregator_bad_part_keeps_original() {
        let mut original = Message::from_text("[]");
        let parts = vec![Message::from_text("not json")];
        assert!(ArrayAggregator::new()
            .aggregate(&mut original, &parts)
            .is_err());
        assert_eq!(original.payload_str().unwrap(), "[]");
    }

    #[test]
    fn test_merge_aggregator_later_keys_win() {
        let mut original = Message::from_text("{}");
        let parts = vec![
            Message::from_text(r#"{"a":1,"b":1}"#),
            Message::from_text(r#"{"b":2,"c":3}"#),
        ];
        MergeAggregator::new()
            .aggregate(&mut original, &parts)
            .unwrap();
        assert_eq!(
            original.payload_value().unwrap(),
            json!({"a":1, "b":2, "c":3})
        );
    }

    #[test]
    fn test_merge_aggregator_rejects_scalar_part() {
        let mut original = Message::from_text("{}");
        let parts = vec![Message::from_text("1")];
        let err = MergeAggregator::new()
            .aggregate(&mut original, &parts)
            .unwrap_err();
        assert!(matches!(err, JflowError::Patch(_)));
        assert_eq!(original.payload_str().unwrap(), "{}");
    }
}
