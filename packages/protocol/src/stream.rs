//! Newline-delimited JSON framing.
//!
//! Bytes arrive in arbitrary chunks. Complete lines are decoded as soon as
//! their newline is seen; the tail is buffered until the next chunk or
//! [`StreamParser::finish`]. Buffering happens on bytes, so a multi-byte
//! character split across two chunks decodes correctly.

use crate::error::{ParseError, StreamError};
use crate::message::ServerMessage;
use serde_json::Value;
use tracing::{debug, warn};

pub type StreamItem = Result<ServerMessage, StreamError>;

#[derive(Debug, Default)]
pub struct StreamParser {
    buffer: Vec<u8>,
    line: usize,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return everything decoded from the lines it completed
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) -> Vec<StreamItem> {
        self.buffer.extend_from_slice(chunk.as_ref());

        let mut items = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            self.process_line(&line, &mut items);
        }
        items
    }

    /// Decode whatever is left after the last newline
    pub fn finish(&mut self) -> Vec<StreamItem> {
        let rest = std::mem::take(&mut self.buffer);
        let mut items = Vec::new();
        if !rest.is_empty() {
            self.process_line(&rest, &mut items);
        }
        items
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.line = 0;
    }

    /// Number of lines consumed so far, blank ones included
    pub fn line(&self) -> usize {
        self.line
    }

    /// Bytes waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn process_line(&mut self, bytes: &[u8], items: &mut Vec<StreamItem>) {
        self.line += 1;
        let line = self.line;

        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                warn!(line, "Skipping line with invalid UTF-8");
                items.push(Err(ParseError::InvalidUtf8 { line }.into()));
                return;
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        let value: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(err) => {
                warn!(line, error = %err, "Skipping malformed JSON line");
                items.push(Err(ParseError::invalid_json(line, &err, trimmed).into()));
                return;
            }
        };

        match ServerMessage::from_value(value) {
            Ok(messages) => {
                debug!(line, count = messages.len(), "Decoded line");
                items.extend(messages.into_iter().map(Ok));
            }
            Err(err) => {
                warn!(line, error = %err, "Dropping invalid message");
                items.push(Err(StreamError::Validation {
                    line,
                    raw: trimmed.to_string(),
                    source: err,
                }));
            }
        }
    }
}

/// Parse a complete NDJSON document
pub fn parse_jsonl(text: &str) -> Vec<StreamItem> {
    let mut parser = StreamParser::new();
    let mut items = parser.feed(text);
    items.extend(parser.finish());
    items
}
