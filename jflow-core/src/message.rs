//! The in-flight message container
//!
//! A [`Message`] is the host pipeline's unit of data: an opaque byte payload,
//! an optional content encoding, and string key/value metadata. Splitters
//! derive child messages from a parent; every child copies the parent's
//! metadata rather than moving it.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::Result;

/// Default content encoding applied to messages built from text.
pub const DEFAULT_CONTENT_ENCODING: &str = "UTF-8";

/// In-flight message: payload bytes plus string metadata.
///
/// Metadata iterates in key order, so derived artifacts (logs, aggregated
/// payloads) are deterministic for a given message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    payload: Vec<u8>,
    content_encoding: Option<String>,
    metadata: BTreeMap<String, String>,
}

impl Message {
    /// Create an empty message with no payload or metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a message from UTF-8 text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            payload: text.into().into_bytes(),
            content_encoding: Some(DEFAULT_CONTENT_ENCODING.to_string()),
            metadata: BTreeMap::new(),
        }
    }

    /// Create a message from raw bytes with no declared encoding.
    pub fn from_bytes(payload: Vec<u8>) -> Self {
        Self {
            payload,
            content_encoding: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Borrow the raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// View the payload as UTF-8 text.
    pub fn payload_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.payload)?)
    }

    /// Parse the payload as a JSON document.
    pub fn payload_value(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    /// Replace the payload with serialized JSON.
    pub fn set_payload_value(&mut self, value: &Value) -> Result<()> {
        self.payload = serde_json::to_vec(value)?;
        Ok(())
    }

    /// Replace the payload with UTF-8 text.
    pub fn set_payload_text(&mut self, text: impl Into<String>) {
        self.payload = text.into().into_bytes();
    }

    /// Replace the payload with raw bytes.
    pub fn set_payload_bytes(&mut self, payload: Vec<u8>) {
        self.payload = payload;
    }

    /// Declared character encoding of the payload, if any.
    pub fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }

    /// Set the declared character encoding.
    pub fn set_content_encoding(&mut self, encoding: impl Into<String>) {
        self.content_encoding = Some(encoding.into());
    }

    /// Set a metadata value, replacing any previous value for the key.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Look up a metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Whether the key is present in the metadata map.
    pub fn contains_metadata(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }

    /// Borrow the full metadata map.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Number of metadata entries.
    pub fn metadata_len(&self) -> usize {
        self.metadata.len()
    }

    /// Derive a child message carrying the given payload.
    ///
    /// The child copies this message's metadata and content encoding; the
    /// parent keeps its own copy untouched.
    pub fn child(&self, payload: impl Into<Vec<u8>>) -> Message {
        Message {
            payload: payload.into(),
            content_encoding: self.content_encoding.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_roundtrip() {
        let msg = Message::from_text("{\"a\":1}");
        assert_eq!(msg.payload_str().unwrap(), "{\"a\":1}");
        assert_eq!(msg.content_encoding(), Some(DEFAULT_CONTENT_ENCODING));
    }

    #[test]
    fn test_payload_value() {
        let mut msg = Message::from_text("{}");
        msg.set_payload_value(&json!({"a": [1, 2]})).unwrap();
        assert_eq!(msg.payload_value().unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_invalid_utf8_payload() {
        let msg = Message::from_bytes(vec![0xff, 0xfe]);
        assert!(msg.payload_str().is_err());
    }

    #[test]
    fn test_child_copies_metadata() {
        let mut parent = Message::from_text("[]");
        parent.add_metadata("source", "queue-1");
        parent.add_metadata("trace", "abc");

        let child = parent.child("{}".as_bytes());
        assert_eq!(child.metadata_value("source"), Some("queue-1"));
        assert_eq!(child.metadata_value("trace"), Some("abc"));
        assert_eq!(child.payload_str().unwrap(), "{}");

        // Copy, not move
        assert_eq!(parent.metadata_len(), 2);
        assert_eq!(child.content_encoding(), parent.content_encoding());
    }

    #[test]
    fn test_metadata_replaces_existing() {
        let mut msg = Message::new();
        msg.add_metadata("k", "v1");
        msg.add_metadata("k", "v2");
        assert_eq!(msg.metadata_value("k"), Some("v2"));
        assert_eq!(msg.metadata_len(), 1);
    }
}
