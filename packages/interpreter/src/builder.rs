//! # Tree Builder
//!
//! Expands a flat map of component definitions into a resolved node tree,
//! starting at a root id and resolving every property against the data
//! model.
//!
//! ## Property resolution
//!
//! - a string equal to a defined component id becomes that child node
//! - `{explicitList: [ids]}` becomes a list of children, a missing id
//!   leaving `null` in its slot
//! - `{template: {componentId, dataBinding}}` instantiates `componentId` once
//!   per element (or key) of the list (or object) found at `dataBinding`
//! - arrays and objects are resolved element-wise, everything else is copied
//!
//! The id rule applies to every field, bound values included, so a
//! `literalString` naming a component resolves to that node. Outside the root
//! data context `path` strings are never looked up: a leading `/item`, `/text`
//! or `/label` is rewritten relative to the item and the rest is kept.
//!
//! ## Cycle protection
//!
//! The ids currently being resolved are kept on a stack. Reaching an id that
//! is already on the stack aborts the build with [`BuildError::Cycle`]. The
//! stack is popped on the way out, so siblings may reuse the same definition.
//! Template expansion appends `:index` or `:key` suffixes, which makes each
//! instance a distinct id for this check.

use crate::data_model::DataModel;
use crate::node::{ResolvedNode, ResolvedValue};
use crate::path::{index_segments, resolve_path, strip_item_prefix};
use crate::shape::check_shape;
use a2ui_protocol::ComponentDefinition;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Nesting limit for one build. Must fail before a default 2 MiB thread
/// overflows in a debug build. Data-driven templates can nest without ever
/// repeating an id, so the cycle check alone does not bound depth.
pub const MAX_DEPTH: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Circular component reference: {component}\nCall stack: {}\n{}", call_stack.join(" → "), hint.as_deref().unwrap_or_default())]
    Cycle {
        component: String,
        call_stack: Vec<String>,
        hint: Option<String>,
    },

    #[error("Invalid data for '{id}'; expected {component_type}: {reason}")]
    ShapeMismatch {
        id: String,
        component_type: String,
        reason: String,
    },

    #[error("Component '{component}' is nested more than {depth} levels deep")]
    TooDeep { component: String, depth: usize },
}

impl BuildError {
    /// Full id of the component the build stopped at
    pub fn component(&self) -> &str {
        match self {
            BuildError::Cycle { component, .. } => component,
            BuildError::ShapeMismatch { id, .. } => id,
            BuildError::TooDeep { component, .. } => component,
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;

pub struct TreeBuilder<'a> {
    components: &'a HashMap<String, ComponentDefinition>,
    data: &'a DataModel,
    stack: Vec<String>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(components: &'a HashMap<String, ComponentDefinition>, data: &'a DataModel) -> Self {
        Self {
            components,
            data,
            stack: Vec::new(),
        }
    }

    /// Build the tree rooted at `root_id` with the root data context.
    /// `Ok(None)` when the root is not defined yet.
    pub fn build(mut self, root_id: &str) -> BuildResult<Option<ResolvedNode>> {
        self.build_node(root_id, "/", "")
    }

    /// Instantiate one component. Missing definitions resolve to `None`.
    pub fn build_node(
        &mut self,
        component_id: &str,
        data_context_path: &str,
        id_suffix: &str,
    ) -> BuildResult<Option<ResolvedNode>> {
        let components = self.components;
        let Some(definition) = components.get(component_id) else {
            debug!(component = component_id, "Reference to undefined component");
            return Ok(None);
        };

        let full_id = format!("{}{}", component_id, id_suffix);

        if self.stack.contains(&full_id) {
            let mut call_stack = self.stack.clone();
            call_stack.push(full_id.clone());

            let hint = if self.stack.last() == Some(&full_id) {
                format!(
                    "Component '{}' references itself. Point the child at a different id or drive the nesting from a template.",
                    full_id
                )
            } else {
                "Component cycle detected. Ensure components do not reference each other in a loop.".to_string()
            };

            error!(component = %full_id, stack = ?call_stack, "Circular component reference");
            return Err(BuildError::Cycle {
                component: full_id,
                call_stack,
                hint: Some(hint),
            });
        }

        if self.stack.len() >= MAX_DEPTH {
            error!(component = %full_id, depth = MAX_DEPTH, "Component nesting limit reached");
            return Err(BuildError::TooDeep {
                component: full_id,
                depth: MAX_DEPTH,
            });
        }

        self.stack.push(full_id.clone());
        let resolved = self.resolve_properties(&definition.properties, data_context_path, id_suffix);
        self.stack.pop();
        let properties = resolved?;

        check_shape(&definition.component_type, &properties).map_err(|reason| {
            error!(component = %full_id, component_type = %definition.component_type, reason = %reason, "Shape mismatch");
            BuildError::ShapeMismatch {
                id: full_id.clone(),
                component_type: definition.component_type.to_string(),
                reason,
            }
        })?;

        Ok(Some(
            ResolvedNode::new(full_id, definition.component_type.clone(), data_context_path)
                .with_properties(properties)
                .with_weight(definition.weight),
        ))
    }

    fn resolve_properties(
        &mut self,
        properties: &Map<String, Value>,
        data_context_path: &str,
        id_suffix: &str,
    ) -> BuildResult<BTreeMap<String, ResolvedValue>> {
        let mut resolved = BTreeMap::new();
        for (key, value) in properties {
            let value = self.resolve_field(key, value, data_context_path, id_suffix)?;
            resolved.insert(key.clone(), value);
        }
        Ok(resolved)
    }

    fn resolve_field(
        &mut self,
        key: &str,
        value: &Value,
        data_context_path: &str,
        id_suffix: &str,
    ) -> BuildResult<ResolvedValue> {
        if key == "path" && data_context_path != "/" {
            if let Value::String(path) = value {
                return Ok(ResolvedValue::String(strip_item_prefix(path)));
            }
        }
        self.resolve_value(value, data_context_path, id_suffix)
    }

    /// Resolve one property value in the given data context
    pub fn resolve_value(
        &mut self,
        value: &Value,
        data_context_path: &str,
        id_suffix: &str,
    ) -> BuildResult<ResolvedValue> {
        match value {
            Value::String(id) if self.components.contains_key(id) => Ok(self
                .build_node(id, data_context_path, id_suffix)?
                .map_or(ResolvedValue::Null, ResolvedValue::node)),
            Value::Object(map) => {
                if let Some(ids) = map.get("explicitList").and_then(Value::as_array) {
                    return self.resolve_explicit_list(ids, data_context_path, id_suffix);
                }
                if let Some(template) = map.get("template").and_then(Value::as_object) {
                    return self.expand_template(template, data_context_path);
                }
                let mut resolved = BTreeMap::new();
                for (key, value) in map {
                    let value = self.resolve_field(key, value, data_context_path, id_suffix)?;
                    resolved.insert(key.clone(), value);
                }
                Ok(ResolvedValue::Map(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item, data_context_path, id_suffix))
                .collect::<BuildResult<Vec<_>>>()
                .map(ResolvedValue::Array),
            other => Ok(ResolvedValue::from_json(other)),
        }
    }

    fn resolve_explicit_list(
        &mut self,
        ids: &[Value],
        data_context_path: &str,
        id_suffix: &str,
    ) -> BuildResult<ResolvedValue> {
        let mut children = Vec::with_capacity(ids.len());
        for id in ids {
            let child = match id.as_str() {
                Some(id) => self.build_node(id, data_context_path, id_suffix)?,
                None => None,
            };
            children.push(child.map_or(ResolvedValue::Null, ResolvedValue::node));
        }
        Ok(ResolvedValue::Array(children))
    }

    fn expand_template(
        &mut self,
        template: &Map<String, Value>,
        data_context_path: &str,
    ) -> BuildResult<ResolvedValue> {
        let component_id = template.get("componentId").and_then(Value::as_str);
        let binding = template.get("dataBinding").and_then(Value::as_str);
        let (Some(component_id), Some(binding)) = (component_id, binding) else {
            warn!(template = ?template, "Template needs a componentId and a dataBinding");
            return Ok(ResolvedValue::Array(Vec::new()));
        };

        let data_path = resolve_path(binding, data_context_path);
        let data = self.data;
        let mut children = Vec::new();

        match data.get(&data_path) {
            Some(Value::Array(items)) => {
                let parent_indices = index_segments(data_context_path);
                for index in 0..items.len() {
                    let index = index.to_string();
                    let mut indices = parent_indices.clone();
                    indices.push(&index);
                    let suffix = format!(":{}", indices.join(":"));
                    let child_path = join_path(&data_path, &index);
                    let child = self.build_node(component_id, &child_path, &suffix)?;
                    children.push(child.map_or(ResolvedValue::Null, ResolvedValue::node));
                }
            }
            Some(Value::Object(entries)) => {
                for key in entries.keys() {
                    let suffix = format!(":{}", key);
                    let child_path = join_path(&data_path, key);
                    let child = self.build_node(component_id, &child_path, &suffix)?;
                    children.push(child.map_or(ResolvedValue::Null, ResolvedValue::node));
                }
            }
            _ => {
                debug!(path = %data_path, component = component_id, "Template binding is not a list or object");
            }
        }

        Ok(ResolvedValue::Array(children))
    }
}

fn join_path(base: &str, segment: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, segment)
    } else {
        format!("{}/{}", base, segment)
    }
}
