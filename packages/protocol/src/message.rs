//! Server-to-client message envelope.
//!
//! Two shapes are accepted on the wire: the keyed envelope
//! (`{"surfaceUpdate": {...}}`) and the flat form with a `type`
//! discriminant (`{"type": "surfaceUpdate", ...}`). Discriminants that are
//! not recognised decode to [`ServerMessage::Unknown`] so newer agents do
//! not break older clients.

use crate::component::ComponentDefinition;
use crate::error::{json_kind, ProtocolResult, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Surface used when a message carries no `surfaceId`
pub const DEFAULT_SURFACE_ID: &str = "@default";

/// Envelope keys in the order the dispatcher applies them
pub const ENVELOPE_KEYS: [&str; 4] = [
    "beginRendering",
    "surfaceUpdate",
    "dataModelUpdate",
    "deleteSurface",
];

fn default_surface_id() -> String {
    DEFAULT_SURFACE_ID.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginRendering {
    #[serde(default = "default_surface_id")]
    pub surface_id: String,
    pub root: String,
    #[serde(default)]
    pub styles: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    #[serde(default = "default_surface_id")]
    pub surface_id: String,
    pub components: Vec<ComponentDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelUpdate {
    #[serde(default = "default_surface_id")]
    pub surface_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Usually a list of `{key, value*}` records; coerced by the data model
    pub contents: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSurface {
    #[serde(default = "default_surface_id")]
    pub surface_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    BeginRendering(BeginRendering),
    SurfaceUpdate(SurfaceUpdate),
    DataModelUpdate(DataModelUpdate),
    DeleteSurface(DeleteSurface),
    /// A discriminant this client does not know; carried through untouched
    Unknown { kind: String, payload: Value },
}

impl ServerMessage {
    /// Decode one parsed JSON line.
    ///
    /// A keyed envelope may carry several messages at once; they are
    /// returned in [`ENVELOPE_KEYS`] order.
    pub fn from_value(value: Value) -> ProtocolResult<Vec<ServerMessage>> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ValidationError::NotAnObject {
                    found: json_kind(&other),
                })
            }
        };

        match object.remove("type") {
            Some(Value::String(kind)) => {
                return Ok(vec![Self::from_payload(&kind, Value::Object(object))?]);
            }
            Some(other) => {
                return Err(ValidationError::invalid_message(
                    "message",
                    format!("type must be a string, found {}", json_kind(&other)),
                ));
            }
            None => {}
        }

        let mut messages = Vec::new();
        for key in ENVELOPE_KEYS {
            if let Some(payload) = object.remove(key) {
                messages.push(Self::from_payload(key, payload)?);
            }
        }

        if messages.is_empty() {
            // Exactly one object-valued key is read as an envelope we do not know yet
            let mut candidates = object.into_iter().filter(|(_, v)| v.is_object());
            match (candidates.next(), candidates.next()) {
                (Some((kind, payload)), None) => {
                    messages.push(ServerMessage::Unknown { kind, payload });
                }
                _ => return Err(ValidationError::MissingDiscriminant),
            }
        }

        Ok(messages)
    }

    /// Decode a payload whose type is already known
    pub fn from_payload(kind: &str, payload: Value) -> ProtocolResult<ServerMessage> {
        match kind {
            "beginRendering" => {
                require(kind, &payload, "root")?;
                decode(kind, payload).map(ServerMessage::BeginRendering)
            }
            "surfaceUpdate" => {
                require(kind, &payload, "components")?;
                decode(kind, payload).map(ServerMessage::SurfaceUpdate)
            }
            "dataModelUpdate" => {
                require(kind, &payload, "contents")?;
                decode(kind, payload).map(ServerMessage::DataModelUpdate)
            }
            "deleteSurface" => decode(kind, payload).map(ServerMessage::DeleteSurface),
            other => Ok(ServerMessage::Unknown {
                kind: other.to_string(),
                payload,
            }),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            ServerMessage::BeginRendering(_) => "beginRendering",
            ServerMessage::SurfaceUpdate(_) => "surfaceUpdate",
            ServerMessage::DataModelUpdate(_) => "dataModelUpdate",
            ServerMessage::DeleteSurface(_) => "deleteSurface",
            ServerMessage::Unknown { kind, .. } => kind,
        }
    }

    pub fn surface_id(&self) -> &str {
        match self {
            ServerMessage::BeginRendering(m) => &m.surface_id,
            ServerMessage::SurfaceUpdate(m) => &m.surface_id,
            ServerMessage::DataModelUpdate(m) => &m.surface_id,
            ServerMessage::DeleteSurface(m) => &m.surface_id,
            ServerMessage::Unknown { payload, .. } => payload
                .get("surfaceId")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_SURFACE_ID),
        }
    }

    /// Encode back into the keyed envelope form
    pub fn to_value(&self) -> Value {
        let payload = match self {
            ServerMessage::BeginRendering(m) => serde_json::to_value(m),
            ServerMessage::SurfaceUpdate(m) => serde_json::to_value(m),
            ServerMessage::DataModelUpdate(m) => serde_json::to_value(m),
            ServerMessage::DeleteSurface(m) => serde_json::to_value(m),
            ServerMessage::Unknown { payload, .. } => Ok(payload.clone()),
        }
        .unwrap_or(Value::Null);

        let mut envelope = Map::new();
        envelope.insert(self.kind().to_string(), payload);
        Value::Object(envelope)
    }
}

fn require(kind: &str, payload: &Value, field: &str) -> ProtocolResult<()> {
    match payload.get(field) {
        Some(Value::Null) | None => Err(ValidationError::missing_field(kind, field)),
        Some(_) => Ok(()),
    }
}

fn decode<T: DeserializeOwned>(kind: &str, payload: Value) -> ProtocolResult<T> {
    serde_json::from_value(payload).map_err(|err| ValidationError::invalid_message(kind, err))
}
