//! Component definitions as authored by the agent.
//!
//! On the wire a definition looks like
//! `{"id": "title", "weight": 1, "component": {"Text": {"text": {...}}}}`;
//! the single key inside `component` names the type. Here the type is an
//! explicit [`ComponentType`] and the remaining object is kept, unresolved,
//! as the property bag.

use crate::error::{json_kind, ProtocolResult, ValidationError};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Known component kinds plus a passthrough for anything newer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Text,
    Image,
    Icon,
    Video,
    AudioPlayer,
    Row,
    Column,
    List,
    Card,
    Tabs,
    Divider,
    Modal,
    Button,
    CheckBox,
    TextField,
    DateTimeInput,
    MultipleChoice,
    Slider,
    Custom(String),
}

impl ComponentType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Text" => Self::Text,
            "Image" => Self::Image,
            "Icon" => Self::Icon,
            "Video" => Self::Video,
            "AudioPlayer" => Self::AudioPlayer,
            "Row" => Self::Row,
            "Column" => Self::Column,
            "List" => Self::List,
            "Card" => Self::Card,
            "Tabs" => Self::Tabs,
            "Divider" => Self::Divider,
            "Modal" => Self::Modal,
            "Button" => Self::Button,
            "CheckBox" => Self::CheckBox,
            "TextField" => Self::TextField,
            "DateTimeInput" => Self::DateTimeInput,
            "MultipleChoice" => Self::MultipleChoice,
            "Slider" => Self::Slider,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Icon => "Icon",
            Self::Video => "Video",
            Self::AudioPlayer => "AudioPlayer",
            Self::Row => "Row",
            Self::Column => "Column",
            Self::List => "List",
            Self::Card => "Card",
            Self::Tabs => "Tabs",
            Self::Divider => "Divider",
            Self::Modal => "Modal",
            Self::Button => "Button",
            Self::CheckBox => "CheckBox",
            Self::TextField => "TextField",
            Self::DateTimeInput => "DateTimeInput",
            Self::MultipleChoice => "MultipleChoice",
            Self::Slider => "Slider",
            Self::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComponentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// One unresolved component, keyed by a stable id within its surface
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDefinition {
    pub id: String,
    pub weight: Option<f64>,
    pub component_type: ComponentType,
    pub properties: Map<String, Value>,
}

impl ComponentDefinition {
    pub fn new(id: impl Into<String>, component_type: ComponentType) -> Self {
        Self {
            id: id.into(),
            weight: None,
            component_type,
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Decode the wire form. `componentProperties` is accepted as an older
    /// spelling of `component`.
    pub fn from_value(value: &Value) -> ProtocolResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ValidationError::invalid_component(
                "<unknown>",
                format!("expected an object, found {}", json_kind(value)),
            )
        })?;

        let id = match object.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(ValidationError::invalid_component(
                    "<unknown>",
                    format!("id must be a string, found {}", json_kind(other)),
                ))
            }
            None => return Err(ValidationError::missing_field("component", "id")),
        };

        let weight = match object.get("weight") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(other) => {
                return Err(ValidationError::invalid_component(
                    &id,
                    format!("weight must be a number, found {}", json_kind(other)),
                ))
            }
        };

        let wrapper = object
            .get("component")
            .or_else(|| object.get("componentProperties"))
            .and_then(Value::as_object)
            .ok_or_else(|| ValidationError::invalid_component(&id, "missing component object"))?;

        let mut entries = wrapper.iter();
        let (type_name, props) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => {
                return Err(ValidationError::invalid_component(
                    &id,
                    "component object names no type",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(ValidationError::invalid_component(
                    &id,
                    "component object names more than one type",
                ))
            }
        };

        let properties = match props {
            Value::Object(props) => props.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(ValidationError::invalid_component(
                    &id,
                    format!(
                        "properties of {} must be an object, found {}",
                        type_name,
                        json_kind(other)
                    ),
                ))
            }
        };

        Ok(Self {
            id,
            weight,
            component_type: ComponentType::from_name(type_name),
            properties,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut component = Map::new();
        component.insert(
            self.component_type.as_str().to_string(),
            Value::Object(self.properties.clone()),
        );

        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        if let Some(weight) = self.weight {
            object.insert("weight".to_string(), Value::from(weight));
        }
        object.insert("component".to_string(), Value::Object(component));
        Value::Object(object)
    }
}

impl Serialize for ComponentDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ComponentDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}
