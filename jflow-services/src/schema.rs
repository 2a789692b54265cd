//! JSON Schema validation service

use jsonschema::Validator;
use serde_json::Value;
use tracing::debug;

use jflow_core::{JflowError, Message, Result, Service};

/// Validates each message payload against a JSON Schema.
///
/// The schema compiles once at `init`. A failing payload surfaces every
/// violation (not just the first) in [`JflowError::Validation`]; the message
/// itself is never modified by this service.
pub struct SchemaValidationService {
    schema: Value,
    validator: Option<Validator>,
}

impl SchemaValidationService {
    /// Create the service from a schema document.
    pub fn new(schema: Value) -> Self {
        Self {
            schema,
            validator: None,
        }
    }
}

impl Service for SchemaValidationService {
    fn init(&mut self) -> Result<()> {
        let validator = jsonschema::validator_for(&self.schema)
            .map_err(|err| JflowError::Config(format!("bad schema: {err}")))?;
        self.validator = Some(validator);
        Ok(())
    }

    fn apply(&mut self, message: &mut Message) -> Result<()> {
        let validator = self.validator.as_ref().ok_or_else(|| {
            JflowError::Config("SchemaValidationService used before init".to_string())
        })?;

        let document = message.payload_value()?;
        let violations: Vec<String> = validator
            .iter_errors(&document)
            .map(|err| format!("{} at {}", err, err.instance_path))
            .collect();

        if violations.is_empty() {
            debug!("payload passed schema validation");
            Ok(())
        } else {
            Err(JflowError::Validation(violations))
        }
    }
}
