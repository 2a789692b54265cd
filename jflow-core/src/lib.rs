//! jflow core - primitives for JSON message services
//!
//! This crate provides the building blocks shared by every jflow component,
//! with no I/O or engine dependencies. It includes:
//!
//! - The in-flight [`Message`] container (payload + metadata)
//! - The host-driven [`Service`] lifecycle trait
//! - Error types
//!
//! The host pipeline owns the lifecycle: components are constructed from
//! configuration, then driven through `init`/`start`/`apply`/`stop`/`close`
//! in that order. Nothing in this crate schedules or retries work.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod message;
pub mod service;

// Re-export commonly used types
pub use error::{JflowError, Result};
pub use message::Message;
pub use service::Service;
