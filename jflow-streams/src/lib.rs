//! jflow streams - splitting and aggregating JSON message payloads
//!
//! This crate provides the split/aggregate layer of jflow:
//!
//! - A lazy, bounded-memory cursor over the elements of a JSON array
//! - Message splitters deriving one child message per array element
//! - Aggregators folding split messages back into a single payload
//!
//! Splitting is single-consumer and single-pass: each cursor owns its parser
//! handle exclusively and reads the source exactly once, forward only.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod array_stream;
pub mod splitter;

// Re-export commonly used types
pub use aggregator::{ArrayAggregator, MergeAggregator, MessageAggregator};
pub use array_stream::{JsonArrayStream, DEFAULT_BUFFER_SIZE};
pub use splitter::{JsonArraySplitter, LargeJsonArraySplitter, MessageSplitter, SplitMessages};

pub use jflow_core::{JflowError, Message, Result};
