use crate::node::{ResolvedNode, ResolvedValue};

/// Read-only traversal over a resolved tree.
///
/// The defaults walk every node and property value. Override a `visit_*`
/// method to act on it, and call the matching `walk_*` function to keep
/// descending.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &ResolvedNode) {
        walk_node(self, node);
    }

    fn visit_value(&mut self, value: &ResolvedValue) {
        walk_value(self, value);
    }

    /// A `null` left by a reference to an undefined component
    fn visit_missing(&mut self) {}
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &ResolvedNode) {
    for value in node.properties.values() {
        visitor.visit_value(value);
    }
}

pub fn walk_value<V: Visitor>(visitor: &mut V, value: &ResolvedValue) {
    match value {
        ResolvedValue::Node(node) => visitor.visit_node(node),
        ResolvedValue::Array(items) => {
            for item in items {
                if item.is_null() {
                    visitor.visit_missing();
                } else {
                    visitor.visit_value(item);
                }
            }
        }
        ResolvedValue::Map(map) => {
            for value in map.values() {
                visitor.visit_value(value);
            }
        }
        ResolvedValue::Null
        | ResolvedValue::Bool(_)
        | ResolvedValue::Number(_)
        | ResolvedValue::String(_) => {}
    }
}

/// Collects node ids in depth-first pre-order
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_node(&mut self, node: &ResolvedNode) {
        self.ids.push(node.id.clone());
        walk_node(self, node);
    }
}

/// Ids of every node in `root`'s tree, depth-first pre-order
pub fn collect_ids(root: &ResolvedNode) -> Vec<String> {
    let mut collector = IdCollector::default();
    collector.visit_node(root);
    collector.ids
}
