use a2ui_protocol::ComponentType;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A fully instantiated component, ready for a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNode {
    /// Definition id plus any `:index`/`:key` suffix from template expansion
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub properties: BTreeMap<String, ResolvedValue>,
    /// Data model path that relative bindings on this node resolve against
    pub data_context_path: String,
    /// Flex weight; serialized as `"initial"` when unset
    #[serde(serialize_with = "serialize_weight")]
    pub weight: Option<f64>,
}

fn serialize_weight<S: Serializer>(weight: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match weight {
        Some(weight) => serializer.serialize_f64(*weight),
        None => serializer.serialize_str("initial"),
    }
}

impl ResolvedNode {
    pub fn new(
        id: impl Into<String>,
        component_type: ComponentType,
        data_context_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            component_type,
            properties: BTreeMap::new(),
            data_context_path: data_context_path.into(),
            weight: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: ResolvedValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, ResolvedValue>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn with_weight(mut self, weight: Option<f64>) -> Self {
        self.weight = weight;
        self
    }

    pub fn property(&self, key: &str) -> Option<&ResolvedValue> {
        self.properties.get(key)
    }

    /// Node held directly in `key` (e.g. `child`)
    pub fn child(&self, key: &str) -> Option<&ResolvedNode> {
        self.property(key).and_then(ResolvedValue::as_node)
    }

    /// Entries of the list held in `key`; `None` marks a missing reference
    pub fn children(&self, key: &str) -> Vec<Option<&ResolvedNode>> {
        match self.property(key) {
            Some(ResolvedValue::Array(items)) => items.iter().map(ResolvedValue::as_node).collect(),
            _ => Vec::new(),
        }
    }

    /// Bound value held in `key`, if it has the shape of one
    pub fn bound(&self, key: &str) -> Option<BoundValue> {
        self.property(key).and_then(BoundValue::from_resolved)
    }
}

/// A property value after child references have been instantiated
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Node(Box<ResolvedNode>),
    Array(Vec<ResolvedValue>),
    Map(BTreeMap<String, ResolvedValue>),
}

impl ResolvedValue {
    /// Convert a literal JSON value with no component references
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Back to JSON; nodes become their serialized form
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Node(node) => serde_json::to_value(node).unwrap_or(Value::Null),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    pub fn node(node: ResolvedNode) -> Self {
        Self::Node(Box::new(node))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_node(&self) -> Option<&ResolvedNode> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ResolvedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ResolvedValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ResolvedValue> {
        self.as_map().and_then(|map| map.get(key))
    }
}

impl From<ResolvedNode> for ResolvedValue {
    fn from(node: ResolvedNode) -> Self {
        Self::node(node)
    }
}

/// A property that is either a literal or a reference into the data model.
///
/// `{path}` reads the model and `{literalString}` (or any other `literal*`
/// key) is a constant. When both are present the literal wins.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    pub path: Option<String>,
    pub literal: Option<Value>,
}

const LITERAL_KEYS: [&str; 5] = [
    "literal",
    "literalString",
    "literalNumber",
    "literalBoolean",
    "literalArray",
];

impl BoundValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self {
            path: None,
            literal: Some(value.into()),
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            literal: None,
        }
    }

    /// Read a bound value out of a resolved property
    pub fn from_resolved(value: &ResolvedValue) -> Option<Self> {
        let map = value.as_map()?;
        let path = map.get("path").and_then(ResolvedValue::as_str).map(str::to_string);
        let literal = LITERAL_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .map(ResolvedValue::to_json);

        if path.is_none() && literal.is_none() {
            return None;
        }
        Some(Self { path, literal })
    }

    /// Whether `value` has the shape of a bound value
    pub fn is_bound(value: &ResolvedValue) -> bool {
        match value.as_map() {
            Some(map) => map.keys().any(|key| key == "path" || key.starts_with("literal")),
            None => false,
        }
    }
}
