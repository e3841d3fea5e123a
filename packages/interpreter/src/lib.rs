//! # A2UI Interpreter
//!
//! Turns a stream of server messages into per-surface trees of resolved UI
//! nodes.
//!
//! ```rust,ignore
//! use a2ui_interpreter::MessageProcessor;
//! use a2ui_protocol::parse_jsonl;
//!
//! let mut processor = MessageProcessor::new();
//! for item in parse_jsonl(input) {
//!     if let Ok(message) = item {
//!         for err in processor.process_message(message) {
//!             eprintln!("{}", err);
//!         }
//!     }
//! }
//! let tree = processor.surface("@default").and_then(|s| s.component_tree.as_ref());
//! ```
//!
//! ## Rebuilds
//!
//! Every mutating message rebuilds its surface's tree from scratch. A
//! rebuild that fails on a cycle or a shape mismatch leaves the previous
//! tree in place and records the error on the surface. Other surfaces are
//! never touched.
//!
//! ## Determinism
//!
//! Building twice from the same definitions and data gives equal trees.
//! Resolved properties are kept in key order and data-model objects keep
//! their insertion order, so template expansion over an object follows the
//! order its keys arrived in.

pub mod builder;
pub mod data_model;
pub mod node;
pub mod path;
pub mod processor;
pub mod shape;
pub mod surface;
pub mod visitor;

#[cfg(test)]
mod tests_data_model;



pub use builder::{BuildError, BuildResult, TreeBuilder, MAX_DEPTH};
pub use data_model::{DataModel, DataModelError, DataModelResult};
pub use node::{BoundValue, ResolvedNode, ResolvedValue};
pub use processor::{MessageProcessor, ProcessError, ProcessorOptions};
pub use shape::check_shape;
pub use surface::{Surface, SurfaceStore};
pub use visitor::{collect_ids, walk_node, walk_value, Visitor};
