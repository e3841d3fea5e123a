//! # A2UI Protocol
//!
//! Wire types for the agent-to-UI message stream and the newline-delimited
//! JSON framing that carries them.
//!
//! ```rust,ignore
//! use a2ui_protocol::{StreamParser, ServerMessage};
//!
//! let mut parser = StreamParser::new();
//! for item in parser.feed(chunk) {
//!     match item {
//!         Ok(message) => processor.process_message(message),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

pub mod component;
pub mod error;
pub mod message;
pub mod stream;

#[cfg(test)]
mod tests_message;

#[cfg(test)]
mod tests_stream;

pub use component::{ComponentDefinition, ComponentType};
#[cfg(feature = "pretty-errors")]
pub use error::format_errors;
pub use error::{json_kind, ParseError, ProtocolResult, StreamError, ValidationError};
pub use message::{
    BeginRendering, DataModelUpdate, DeleteSurface, ServerMessage, SurfaceUpdate,
    DEFAULT_SURFACE_ID, ENVELOPE_KEYS,
};
pub use stream::{parse_jsonl, StreamItem, StreamParser};
