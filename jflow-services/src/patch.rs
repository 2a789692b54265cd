//! JSON Patch services: RFC 6902 apply/diff and RFC 7386 merge

use json_patch::Patch;
use serde_json::Value;
use tracing::debug;

use jflow_core::{JflowError, Message, Result, Service};

/// Applies a configured RFC 6902 patch to each message payload.
///
/// The patch document deserializes once at `init`. The patch is applied to a
/// parsed copy of the payload and only written back on success, so a failing
/// operation leaves the message exactly as it arrived.
pub struct JsonPatchService {
    patch_doc: Value,
    compiled: Option<Patch>,
}

impl JsonPatchService {
    /// Create the service from a patch document (a JSON array of operations).
    pub fn new(patch_doc: Value) -> Self {
        Self {
            patch_doc,
            compiled: None,
        }
    }
}

impl Service for JsonPatchService {
    fn init(&mut self) -> Result<()> {
        let patch: Patch = serde_json::from_value(self.patch_doc.clone())
            .map_err(|err| JflowError::Config(format!("bad patch document: {err}")))?;
        self.compiled = Some(patch);
        Ok(())
    }

    fn apply(&mut self, message: &mut Message) -> Result<()> {
        let patch = self
            .compiled
            .as_ref()
            .ok_or_else(|| JflowError::Config("JsonPatchService used before init".to_string()))?;

        let mut document = message.payload_value()?;
        json_patch::patch(&mut document, patch)
            .map_err(|err| JflowError::Patch(err.to_string()))?;
        debug!(operations = patch.0.len(), "applied JSON patch");
        message.set_payload_value(&document)
    }
}

/// Diffs the payload against a document held in a metadata key.
///
/// The resulting RFC 6902 patch (payload -> target) replaces the payload;
/// applying that patch to the original payload yields the target document.
pub struct JsonDiffService {
    source_key: String,
}

impl JsonDiffService {
    /// Create the service; `source_key` names the metadata key holding the
    /// document to diff against.
    pub fn new(source_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
        }
    }
}

impl Service for JsonDiffService {
    fn apply(&mut self, message: &mut Message) -> Result<()> {
        let target_text = message
            .metadata_value(&self.source_key)
            .ok_or_else(|| JflowError::MissingMetadata(self.source_key.clone()))?;
        let target: Value = serde_json::from_str(target_text)?;
        let source = message.payload_value()?;

        let patch = json_patch::diff(&source, &target);
        debug!(operations = patch.0.len(), "generated JSON diff");
        message.set_payload_value(&serde_json::to_value(&patch)?)
    }
}

/// Applies a configured RFC 7386 merge patch to each message payload.
///
/// This is the transformation component: `null` values in the merge patch
/// delete keys, objects merge recursively, everything else replaces.
pub struct MergeService {
    merge_patch: Value,
}

impl MergeService {
    /// Create the service from a merge patch document.
    pub fn new(merge_patch: Value) -> Self {
        Self { merge_patch }
    }
}

impl Service for MergeService {
    fn apply(&mut self, message: &mut Message) -> Result<()> {
        let mut document = message.payload_value()?;
        json_patch::merge(&mut document, &self.merge_patch);
        message.set_payload_value(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_applies_operations() {
        let mut svc = JsonPatchService::new(json!([
            {"op": "replace", "path": "/name", "value": "bob"},
            {"op": "add", "path": "/active", "value": true},
            {"op": "remove", "path": "/tmp"}
        ]));
        svc.init().unwrap();

        let mut msg = Message::from_text(r#"{"name":"alice","tmp":1}"#);
        svc.apply(&mut msg).unwrap();
        assert_eq!(
            msg.payload_value().unwrap(),
            json!({"name":"bob","active":true})
        );
    }

    #[test]
    fn test_failed_patch_leaves_message_unchanged() {
        let mut svc = JsonPatchService::new(json!([
            {"op": "replace", "path": "/missing/deep", "value": 1}
        ]));
        svc.init().unwrap();

        let mut msg = Message::from_text(r#"{"name":"alice"}"#);
        let before = msg.clone();
        assert!(matches!(svc.apply(&mut msg), Err(JflowError::Patch(_))));
        assert_eq!(msg, before);
    }

    #[test]
    fn test_malformed_patch_fails_init() {
        let mut svc = JsonPatchService::new(json!([{"op": "teleport", "path": "/a"}]));
        assert!(matches!(svc.init(), Err(JflowError::Config(_))));
    }

    #[test]
    fn test_patch_before_init_is_an_error() {
        let mut svc = JsonPatchService::new(json!([]));
        let mut msg = Message::from_text("{}");
        assert!(matches!(svc.apply(&mut msg), Err(JflowError::Config(_))));
    }

    #[test]
    fn test_diff_then_patch_roundtrip() {
        let mut diff_svc = JsonDiffService::new("target");
        let mut msg = Message::from_text(r#"{"a":1,"b":2}"#);
        msg.add_metadata("target", r#"{"a":1,"b":3,"c":4}"#);
        diff_svc.apply(&mut msg).unwrap();

        // The produced patch transforms the original payload into the target.
        let mut patch_svc = JsonPatchService::new(msg.payload_value().unwrap());
        patch_svc.init().unwrap();
        let mut original = Message::from_text(r#"{"a":1,"b":2}"#);
        patch_svc.apply(&mut original).unwrap();
        assert_eq!(
            original.payload_value().unwrap(),
            json!({"a":1,"b":3,"c":4})
        );
    }

    #[test]
    fn test_diff_missing_metadata_key() {
        let mut svc = JsonDiffService::new("target");
        let mut msg = Message::from_text("{}");
        assert!(matches!(
            svc.apply(&mut msg),
            Err(JflowError::MissingMetadata(key)) if key == "target"
        ));
    }

    #[test]
    fn test_merge_patch_semantics() {
        let mut svc = MergeService::new(json!({"b": null, "c": {"d": 5}}));
        let mut msg = Message::from_text(r#"{"a":1,"b":2,"c":{"e":6}}"#);
        svc.apply(&mut msg).unwrap();
        assert_eq!(
            msg.payload_value().unwrap(),
            json!({"a":1,"c":{"d":5,"e":6}})
        );
    }

    #[test]
    fn test_identical_documents_diff_to_empty_patch() {
        let mut svc = JsonDiffService::new("target");
        let mut msg = Message::from_text(r#"{"a":1}"#);
        msg.add_metadata("target", r#"{"a":1}"#);
        svc.apply(&mut msg).unwrap();
        assert_eq!(msg.payload_value().unwrap(), json!([]));
    }
}
