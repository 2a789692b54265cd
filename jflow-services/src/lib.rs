//! jflow services - per-message JSON operations
//!
//! Each service in this crate is a thin adapter around one JSON engine
//! crate, configured up front and driven by the host lifecycle:
//!
//! - [`JsonPathService`] - JSONPath extraction (`serde_json_path`)
//! - [`SchemaValidationService`] - JSON Schema validation (`jsonschema`)
//! - [`JsonPatchService`] - RFC 6902 patch application (`json-patch`)
//! - [`JsonDiffService`] - RFC 6902 diff generation (`json-patch`)
//! - [`MergeService`] - RFC 7386 merge patch (`json-patch`)
//!
//! Services cache compiled configuration (parsed expressions, compiled
//! schemas) at `init` and hold no other state across `apply` calls.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod jsonpath;
pub mod patch;
pub mod schema;

// Re-export commonly used types
pub use jsonpath::{JsonPathService, PathMapping, Target};
pub use patch::{JsonDiffService, JsonPatchService, MergeService};
pub use schema::SchemaValidationService;

pub use jflow_core::{JflowError, Message, Result, Service};
