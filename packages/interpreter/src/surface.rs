use crate::builder::{BuildError, TreeBuilder};
use crate::data_model::DataModel;
use crate::node::ResolvedNode;
use a2ui_protocol::ComponentDefinition;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// One named rendering context
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pub root_component_id: Option<String>,
    pub components: HashMap<String, ComponentDefinition>,
    pub data_model: DataModel,
    pub styles: Map<String, Value>,
    /// Last successfully built tree. Valid until the next message.
    pub component_tree: Option<ResolvedNode>,
    /// Why the most recent rebuild failed, if it did
    pub build_error: Option<BuildError>,
    /// Bumped on every rebuild attempt
    pub version: u64,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json_string_parsing(mut self, enabled: bool) -> Self {
        self.data_model = self.data_model.with_json_string_parsing(enabled);
        self
    }

    /// Upsert definitions by id, keeping the rest
    pub fn merge_components(&mut self, components: impl IntoIterator<Item = ComponentDefinition>) {
        for component in components {
            self.components.insert(component.id.clone(), component);
        }
    }

    /// Build a fresh tree without touching the surface
    pub fn build_tree(&self) -> Result<Option<ResolvedNode>, BuildError> {
        match &self.root_component_id {
            Some(root) => TreeBuilder::new(&self.components, &self.data_model).build(root),
            None => Ok(None),
        }
    }

    /// Recompute the tree from scratch.
    ///
    /// On failure the previous tree stays in place and the error is kept in
    /// `build_error` until a later rebuild succeeds.
    pub fn rebuild(&mut self) -> Result<(), BuildError> {
        self.version += 1;
        match self.build_tree() {
            Ok(tree) => {
                self.component_tree = tree;
                self.build_error = None;
                Ok(())
            }
            Err(err) => {
                self.build_error = Some(err.clone());
                Err(err)
            }
        }
    }
}

/// Surfaces by id, iterated in id order
#[derive(Debug, Clone)]
pub struct SurfaceStore {
    surfaces: BTreeMap<String, Surface>,
    parse_json_strings: bool,
}

impl Default for SurfaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self {
            surfaces: BTreeMap::new(),
            parse_json_strings: true,
        }
    }

    /// Controls JSON-string parsing for surfaces created from now on
    pub fn with_json_string_parsing(mut self, enabled: bool) -> Self {
        self.parse_json_strings = enabled;
        self
    }

    pub fn get_or_create(&mut self, surface_id: &str) -> &mut Surface {
        let parse_json_strings = self.parse_json_strings;
        self.surfaces
            .entry(surface_id.to_string())
            .or_insert_with(|| Surface::new().with_json_string_parsing(parse_json_strings))
    }

    pub fn get(&self, surface_id: &str) -> Option<&Surface> {
        self.surfaces.get(surface_id)
    }

    pub fn get_mut(&mut self, surface_id: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(surface_id)
    }

    pub fn delete(&mut self, surface_id: &str) -> Option<Surface> {
        self.surfaces.remove(surface_id)
    }

    pub fn contains(&self, surface_id: &str) -> bool {
        self.surfaces.contains_key(surface_id)
    }

    pub fn all(&self) -> &BTreeMap<String, Surface> {
        &self.surfaces
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.surfaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
    }
}
