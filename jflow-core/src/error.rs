//! Error types shared across jflow crates

use thiserror::Error;

/// jflow error types
#[derive(Debug, Error)]
pub enum JflowError {
    /// Payload was expected to be a JSON array but opened with something else.
    #[error("Expected a JSON array, found {0}")]
    NotAnArray(String),
    /// Input is not well-formed JSON.
    #[error("JSON syntax error: {0}")]
    Syntax(String),
    /// Payload bytes are not valid UTF-8.
    #[error("Payload is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
    /// A JSONPath expression matched nothing and the service is configured to fail.
    #[error("JSONPath '{0}' matched nothing")]
    NoMatch(String),
    /// Schema validation rejected the document; one entry per violation.
    #[error("Schema validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    /// A patch could not be applied to the document.
    #[error("Patch error: {0}")]
    Patch(String),
    /// Component configuration is invalid (bad expression, bad schema, ...).
    #[error("Configuration error: {0}")]
    Config(String),
    /// Operation is not supported by this component.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    /// A required metadata key was absent from the message.
    #[error("Metadata key '{0}' not present")]
    MissingMetadata(String),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, JflowError>;
