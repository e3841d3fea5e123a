//! Message dispatcher.
//!
//! Applies server messages to the surface store in order. Every message
//! except `deleteSurface` ends with a full rebuild of its surface. Failures
//! are reported per message and never stop the batch.

use crate::builder::BuildError;
use crate::data_model::DataModelError;
use crate::node::ResolvedNode;
use crate::path;
use crate::surface::{Surface, SurfaceStore};
use a2ui_protocol::{
    BeginRendering, DataModelUpdate, DeleteSurface, ServerMessage, SurfaceUpdate, ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessorOptions {
    /// Parse data-model strings that look like JSON objects or arrays
    pub parse_json_strings: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            parse_json_strings: true,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessError {
    #[error("Rebuild of surface '{surface_id}' failed: {source}")]
    Build {
        surface_id: String,
        #[source]
        source: BuildError,
    },

    #[error("Data update on surface '{surface_id}' rejected: {source}")]
    DataModel {
        surface_id: String,
        #[source]
        source: DataModelError,
    },
}

impl ProcessError {
    pub fn surface_id(&self) -> &str {
        match self {
            ProcessError::Build { surface_id, .. } => surface_id,
            ProcessError::DataModel { surface_id, .. } => surface_id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageProcessor {
    store: SurfaceStore,
    options: ProcessorOptions,
}

impl MessageProcessor {
    pub fn new() -> Self {
        Self::with_options(ProcessorOptions::default())
    }

    pub fn with_options(options: ProcessorOptions) -> Self {
        Self {
            store: SurfaceStore::new().with_json_string_parsing(options.parse_json_strings),
            options,
        }
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Apply `messages` in order. Returns every problem hit along the way.
    pub fn process_messages(
        &mut self,
        messages: impl IntoIterator<Item = ServerMessage>,
    ) -> Vec<ProcessError> {
        messages
            .into_iter()
            .flat_map(|message| self.process_message(message))
            .collect()
    }

    pub fn process_message(&mut self, message: ServerMessage) -> Vec<ProcessError> {
        match message {
            ServerMessage::BeginRendering(begin) => self.handle_begin_rendering(begin),
            ServerMessage::SurfaceUpdate(update) => self.handle_surface_update(update),
            ServerMessage::DataModelUpdate(update) => self.handle_data_model_update(update),
            ServerMessage::DeleteSurface(delete) => {
                self.handle_delete_surface(delete);
                Vec::new()
            }
            ServerMessage::Unknown { kind, .. } => {
                debug!(kind = %kind, "Ignoring unrecognised message");
                Vec::new()
            }
        }
    }

    /// Decode one JSON envelope and apply everything it carries
    pub fn process_value(&mut self, value: Value) -> Result<Vec<ProcessError>, ValidationError> {
        let messages = ServerMessage::from_value(value)?;
        Ok(self.process_messages(messages))
    }

    fn handle_begin_rendering(&mut self, message: BeginRendering) -> Vec<ProcessError> {
        let surface = self.store.get_or_create(&message.surface_id);
        surface.root_component_id = Some(message.root);
        surface.styles = message.styles;
        self.rebuild(&message.surface_id).err().into_iter().collect()
    }

    fn handle_surface_update(&mut self, message: SurfaceUpdate) -> Vec<ProcessError> {
        let surface = self.store.get_or_create(&message.surface_id);
        surface.merge_components(message.components);
        self.rebuild(&message.surface_id).err().into_iter().collect()
    }

    fn handle_data_model_update(&mut self, message: DataModelUpdate) -> Vec<ProcessError> {
        let mut errors = Vec::new();
        let path = message.path.as_deref().unwrap_or("/");
        let surface = self.store.get_or_create(&message.surface_id);

        if let Err(source) = surface.data_model.set(path, message.contents) {
            warn!(surface_id = %message.surface_id, path = path, error = %source, "Data model update rejected");
            errors.push(ProcessError::DataModel {
                surface_id: message.surface_id.clone(),
                source,
            });
        }

        errors.extend(self.rebuild(&message.surface_id).err());
        errors
    }

    fn handle_delete_surface(&mut self, message: DeleteSurface) {
        if self.store.delete(&message.surface_id).is_some() {
            info!(surface_id = %message.surface_id, "Surface deleted");
        }
    }

    /// Recompute one surface's tree. Unknown surfaces are left alone.
    #[instrument(skip(self), fields(version = tracing::field::Empty))]
    pub fn rebuild(&mut self, surface_id: &str) -> Result<(), ProcessError> {
        let Some(surface) = self.store.get_mut(surface_id) else {
            return Ok(());
        };

        let result = surface.rebuild();
        tracing::Span::current().record("version", surface.version);

        result.map_err(|source| {
            warn!(error = %source, "Rebuild failed; keeping previous tree");
            ProcessError::Build {
                surface_id: surface_id.to_string(),
                source,
            }
        })
    }

    /// Read a value relative to `node`'s data context
    pub fn get_data(&self, node: &ResolvedNode, relative_path: &str, surface_id: &str) -> Option<&Value> {
        let surface = self.store.get(surface_id)?;
        let path = path::resolve_path(relative_path, &node.data_context_path);
        surface.data_model.get(&path)
    }

    /// Write a value relative to `node`'s data context. No rebuild follows;
    /// this is the renderer's side of two-way binding.
    pub fn set_data(
        &mut self,
        node: &ResolvedNode,
        relative_path: &str,
        value: Value,
        surface_id: &str,
    ) -> Result<(), ProcessError> {
        let path = path::resolve_path(relative_path, &node.data_context_path);
        let surface = self.store.get_or_create(surface_id);

        surface
            .data_model
            .set(&path, value)
            .map_err(|source| ProcessError::DataModel {
                surface_id: surface_id.to_string(),
                source,
            })
    }

    pub fn resolve_path(&self, path: &str, data_context_path: &str) -> String {
        path::resolve_path(path, data_context_path)
    }

    /// Current value of the bound-value property `property` on `node`
    pub fn resolve_bound(&self, surface_id: &str, node: &ResolvedNode, property: &str) -> Option<Value> {
        let bound = node.bound(property)?;
        if let Some(literal) = bound.literal {
            return Some(literal);
        }
        let path = bound.path?;
        self.get_data(node, &path, surface_id).cloned()
    }

    pub fn surfaces(&self) -> &BTreeMap<String, Surface> {
        self.store.all()
    }

    pub fn surface(&self, surface_id: &str) -> Option<&Surface> {
        self.store.get(surface_id)
    }

    pub fn store(&self) -> &SurfaceStore {
        &self.store
    }

    pub fn clear_surfaces(&mut self) {
        self.store.clear();
    }
}
