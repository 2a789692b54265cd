//! Message splitters
//!
//! A splitter turns one message whose payload is a JSON array into a
//! sequence of child messages, one per element, each copying the parent's
//! metadata. [`LargeJsonArraySplitter`] streams the payload and never holds
//! more than one element in memory; [`JsonArraySplitter`] parses the whole
//! document up front and emits every element regardless of its type.

use std::io::Cursor;

use serde_json::Value;
use tracing::debug;

use jflow_core::{JflowError, Message, Result};

use crate::array_stream::{JsonArrayStream, DEFAULT_BUFFER_SIZE};

/// Boxed sequence of split results.
pub type MessageStream = Box<dyn Iterator<Item = Result<Message>>>;

/// Splits one message into many.
pub trait MessageSplitter {
    /// Split the message into a lazy sequence of children.
    ///
    /// Fails up front if the payload does not open with a JSON array;
    /// element-level failures surface through the returned sequence.
    fn split(&self, message: &Message) -> Result<MessageStream>;
}

/// Streaming splitter for large JSON array payloads.
///
/// Walks the payload token-by-token, yielding one child message per object
/// element in source order. Non-object elements are skipped. Memory use is
/// bounded by the largest single element, not the whole document.
#[derive(Debug, Clone)]
pub struct LargeJsonArraySplitter {
    buffer_size: Option<usize>,
}

impl LargeJsonArraySplitter {
    /// Create a splitter with the default read-ahead buffer.
    pub fn new() -> Self {
        Self { buffer_size: None }
    }

    /// Override the read-ahead buffer size of the underlying reader.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: Some(buffer_size),
        }
    }

    /// Effective buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
    }

    /// Split into a concrete [`SplitMessages`] cursor, keeping access to
    /// [`SplitMessages::close`] for early termination.
    pub fn split_stream(&self, message: &Message) -> Result<SplitMessages> {
        let stream = JsonArrayStream::with_buffer_size(
            Cursor::new(message.payload().to_vec()),
            self.buffer_size(),
        )?;
        debug!(buffer_size = self.buffer_size(), "opened streaming array split");
        Ok(SplitMessages {
            stream,
            template: message.child(Vec::new()),
        })
    }
}

impl Default for LargeJsonArraySplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSplitter for LargeJsonArraySplitter {
    fn split(&self, message: &Message) -> Result<MessageStream> {
        Ok(Box::new(self.split_stream(message)?))
    }
}

/// Cursor of child messages produced by [`LargeJsonArraySplitter`].
///
/// Single-pass and non-restartable. Consumers that stop early should call
/// [`close`](Self::close); dropping the cursor closes it implicitly.
pub struct SplitMessages {
    stream: JsonArrayStream<Cursor<Vec<u8>>>,
    template: Message,
}

impl SplitMessages {
    /// Whether another child message is available.
    pub fn has_next(&mut self) -> Result<bool> {
        self.stream.has_next()
    }

    /// Release the underlying reader; later pulls return `None`.
    pub fn close(&mut self) {
        self.stream.close();
    }

    fn wrap(&self, value: &Value) -> Result<Message> {
        Ok(self.template.child(serde_json::to_vec(value)?))
    }
}

impl Iterator for SplitMessages {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stream.next()? {
            Ok(value) => Some(self.wrap(&value)),
            Err(err) => Some(Err(err)),
        }
    }
}

/// Whole-document splitter for modestly sized JSON array payloads.
///
/// Parses the payload in one go and emits one child per element, objects
/// and scalars alike, serialized standalone.
#[derive(Debug, Clone, Default)]
pub struct JsonArraySplitter;

impl JsonArraySplitter {
    /// Create a whole-document splitter.
    pub fn new() -> Self {
        Self
    }
}

impl MessageSplitter for JsonArraySplitter {
    fn split(&self, message: &Message) -> Result<MessageStream> {
        let document = message.payload_value()?;
        let elements = match document {
            Value::Array(elements) => elements,
            other => return Err(JflowError::NotAnArray(json_type_name(&other).to_string())),
        };
        debug!(elements = elements.len(), "split in-memory array");

        let template = message.child(Vec::new());
        let children = elements.into_iter().map(move |element| -> Result<Message> {
            Ok(template.child(serde_json::to_vec(&element)?))
        });
        Ok(Box::new(children))
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
