//! Lazy cursor over the elements of a JSON array
//!
//! [`JsonArrayStream`] walks the token stream of a JSON document whose top
//! level is an array, yielding one fully parsed tree per object element. At
//! most one element is materialized at a time, so memory stays bounded no
//! matter how large the source document is.

use std::io::{BufReader, Read};

use serde_json::Value;
use struson::reader::{JsonReader, JsonStreamReader, ValueType};
use tracing::{debug, trace};

use jflow_core::{JflowError, Result};

/// Read-ahead buffer size used when none is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Forward-only cursor over the top-level elements of a JSON array.
///
/// The cursor consumes its source exactly once. Object elements are parsed
/// into [`Value`] trees and yielded in source order; non-object elements
/// between the array brackets (bare scalars, nested arrays, nulls) are
/// skipped without producing anything. A parse error ends iteration: the
/// error is yielded once and every later pull returns `None`. Elements
/// yielded before the error remain valid.
///
/// Call [`close`](Self::close) to release the underlying reader before the
/// source is exhausted; dropping the cursor releases it implicitly.
pub struct JsonArrayStream<R: Read> {
    reader: Option<JsonStreamReader<BufReader<R>>>,
    pending: Option<Value>,
    done: bool,
}

impl<R: Read> JsonArrayStream<R> {
    /// Open a cursor with the default read-ahead buffer.
    ///
    /// Fails with [`JflowError::NotAnArray`] if the first structural token
    /// does not open an array, or [`JflowError::Syntax`] if the input is not
    /// JSON at all. No element is yielded in either case.
    pub fn new(source: R) -> Result<Self> {
        Self::with_buffer_size(source, DEFAULT_BUFFER_SIZE)
    }

    /// Open a cursor with an explicit read-ahead buffer size.
    pub fn with_buffer_size(source: R, buffer_size: usize) -> Result<Self> {
        let mut reader = JsonStreamReader::new(BufReader::with_capacity(buffer_size, source));

        match reader.peek() {
            Ok(ValueType::Array) => {}
            Ok(other) => return Err(JflowError::NotAnArray(type_name(other).to_string())),
            Err(err) => return Err(syntax(err)),
        }
        reader.begin_array().map_err(syntax)?;

        Ok(Self {
            reader: Some(reader),
            pending: None,
            done: false,
        })
    }

    /// Whether another element is available, buffering it if so.
    ///
    /// At most one element is held in the lookahead slot; a subsequent call
    /// to `next` drains it without touching the source again.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        match self.advance() {
            Ok(Some(value)) => {
                self.pending = Some(value);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Release the underlying reader and end iteration.
    ///
    /// Safe to call at any point, including mid-iteration and repeatedly;
    /// pulls after close return `None` rather than stale elements.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!("json array stream closed");
        }
        self.pending = None;
        self.done = true;
    }

    /// Pull the next object element, or `None` at the end of the array.
    ///
    /// Closes the cursor on both exits: end of array and error.
    fn advance(&mut self) -> Result<Option<Value>> {
        if self.done {
            return Ok(None);
        }
        let outcome = match self.reader.as_mut() {
            Some(reader) => Self::pull(reader),
            None => return Ok(None),
        };
        match outcome {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => {
                self.close();
                Ok(None)
            }
            Err(err) => {
                self.close();
                Err(err)
            }
        }
    }

    fn pull(reader: &mut JsonStreamReader<BufReader<R>>) -> Result<Option<Value>> {
        loop {
            if !reader.has_next().map_err(syntax)? {
                reader.end_array().map_err(syntax)?;
                return Ok(None);
            }

            let element_type = reader.peek().map_err(syntax)?;
            if element_type == ValueType::Object {
                return Ok(Some(reader.deserialize_next::<Value>().map_err(syntax)?));
            }

            // Non-object top-level elements produce nothing.
            trace!(
                element = type_name(element_type),
                "skipping non-object array element"
            );
            reader.skip_value().map_err(syntax)?;
        }
    }
}

fn syntax<E: std::fmt::Display>(err: E) -> JflowError {
    JflowError::Syntax(err.to_string())
}

impl<R: Read> Iterator for JsonArrayStream<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.pending.take() {
            return Some(Ok(value));
        }
        self.advance().transpose()
    }
}

fn type_name(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::Array => "array",
        ValueType::Object => "object",
        ValueType::String => "string",
        ValueType::Number => "number",
        ValueType::Boolean => "boolean",
        ValueType::Null => "null",
    }
}
