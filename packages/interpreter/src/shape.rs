/// Shape guards for resolved property bags.
///
/// Each standard component type names the properties a renderer relies on.
/// A node slot may hold a node or null, since a missing reference degrades
/// to an empty branch. Custom types are not checked.
use crate::node::{BoundValue, ResolvedValue};
use a2ui_protocol::ComponentType;
use std::collections::BTreeMap;

pub type Properties = BTreeMap<String, ResolvedValue>;

/// Check `properties` against the shape expected for `component_type`.
/// On mismatch returns a short reason naming the offending property.
pub fn check_shape(component_type: &ComponentType, properties: &Properties) -> Result<(), String> {
    match component_type {
        ComponentType::Text => bound(properties, "text"),
        ComponentType::Image | ComponentType::Video | ComponentType::AudioPlayer => {
            bound(properties, "url")
        }
        ComponentType::Icon => bound(properties, "name"),
        ComponentType::Row | ComponentType::Column | ComponentType::List => {
            node_list(properties, "children")
        }
        ComponentType::Card => {
            if properties.contains_key("child") {
                node_slot(properties, "child")
            } else {
                node_list(properties, "children")
            }
        }
        ComponentType::Tabs => tab_items(properties),
        ComponentType::Divider => Ok(()),
        ComponentType::Modal => {
            node_slot(properties, "entryPointChild")?;
            node_slot(properties, "contentChild")
        }
        ComponentType::Button => {
            node_slot(properties, "child")?;
            present(properties, "action")
        }
        ComponentType::CheckBox => {
            bound(properties, "label")?;
            bound(properties, "value")
        }
        ComponentType::TextField => bound(properties, "label"),
        ComponentType::DateTimeInput => bound(properties, "value"),
        ComponentType::MultipleChoice => present(properties, "selections"),
        ComponentType::Slider => bound(properties, "value"),
        ComponentType::Custom(_) => Ok(()),
    }
}

fn present(properties: &Properties, key: &str) -> Result<(), String> {
    match properties.get(key) {
        Some(_) => Ok(()),
        None => Err(format!("missing '{}'", key)),
    }
}

fn bound(properties: &Properties, key: &str) -> Result<(), String> {
    match properties.get(key) {
        Some(value) if BoundValue::is_bound(value) => Ok(()),
        Some(_) => Err(format!("'{}' is not a bound value", key)),
        None => Err(format!("missing '{}'", key)),
    }
}

fn is_node_or_null(value: &ResolvedValue) -> bool {
    matches!(value, ResolvedValue::Node(_) | ResolvedValue::Null)
}

fn node_slot(properties: &Properties, key: &str) -> Result<(), String> {
    match properties.get(key) {
        Some(value) if is_node_or_null(value) => Ok(()),
        Some(_) => Err(format!("'{}' does not reference a component", key)),
        None => Err(format!("missing '{}'", key)),
    }
}

fn node_list(properties: &Properties, key: &str) -> Result<(), String> {
    match properties.get(key) {
        Some(ResolvedValue::Array(items)) => match items.iter().position(|v| !is_node_or_null(v)) {
            None => Ok(()),
            Some(index) => Err(format!("'{}[{}]' does not reference a component", key, index)),
        },
        Some(_) => Err(format!("'{}' is not a list of components", key)),
        None => Err(format!("missing '{}'", key)),
    }
}

fn tab_items(properties: &Properties) -> Result<(), String> {
    let Some(ResolvedValue::Array(items)) = properties.get("tabItems") else {
        return Err("missing 'tabItems' list".to_string());
    };

    for (index, item) in items.iter().enumerate() {
        let title_ok = item.get("title").is_some_and(BoundValue::is_bound);
        let child_ok = item.get("child").is_some_and(is_node_or_null);
        if !title_ok || !child_ok {
            return Err(format!("'tabItems[{}]' needs a bound title and a child", index));
        }
    }
    Ok(())
}
