use crate::*;
use serde_json::json;

fn single(value: serde_json::Value) -> ServerMessage {
    let mut messages = ServerMessage::from_value(value).expect("Failed to decode message");
    assert_eq!(messages.len(), 1);
    messages.remove(0)
}

#[test]
fn test_keyed_begin_rendering() {
    let message = single(json!({
        "beginRendering": { "surfaceId": "main", "root": "root", "styles": { "primaryColor": "#00f" } }
    }));

    match message {
        ServerMessage::BeginRendering(begin) => {
            assert_eq!(begin.surface_id, "main");
            assert_eq!(begin.root, "root");
            assert_eq!(begin.styles["primaryColor"], "#00f");
        }
        other => panic!("Expected BeginRendering, got {:?}", other),
    }
}

#[test]
fn test_flat_form_with_type_discriminant() {
    let message = single(json!({ "type": "deleteSurface", "surfaceId": "gone" }));
    assert_eq!(message, ServerMessage::DeleteSurface(DeleteSurface { surface_id: "gone".to_string() }));
}

#[test]
fn test_missing_surface_id_uses_default() {
    let message = single(json!({ "dataModelUpdate": { "contents": [] } }));
    assert_eq!(message.surface_id(), DEFAULT_SURFACE_ID);
    match message {
        ServerMessage::DataModelUpdate(update) => assert!(update.path.is_none()),
        other => panic!("Expected DataModelUpdate, got {:?}", other),
    }
}

#[test]
fn test_surface_update_decodes_tagged_components() {
    let message = single(json!({
        "surfaceUpdate": {
            "surfaceId": "s",
            "components": [
                { "id": "root", "weight": 2, "component": { "Column": { "children": { "explicitList": ["a"] } } } },
                { "id": "a", "component": { "Sparkline": { "points": [1, 2, 3] } } }
            ]
        }
    }));

    let ServerMessage::SurfaceUpdate(update) = message else {
        panic!("Expected SurfaceUpdate");
    };
    assert_eq!(update.components.len(), 2);
    assert_eq!(update.components[0].component_type, ComponentType::Column);
    assert_eq!(update.components[0].weight, Some(2.0));
    assert_eq!(
        update.components[1].component_type,
        ComponentType::Custom("Sparkline".to_string())
    );
    assert!(update.components[1].component_type.is_custom());
}

#[test]
fn test_envelope_with_several_keys_keeps_dispatch_order() {
    let messages = ServerMessage::from_value(json!({
        "deleteSurface": { "surfaceId": "a" },
        "beginRendering": { "surfaceId": "a", "root": "r" }
    }))
    .unwrap();

    let kinds: Vec<&str> = messages.iter().map(|m| m.kind()).collect();
    assert_eq!(kinds, vec!["beginRendering", "deleteSurface"]);
}

#[test]
fn test_unknown_discriminants_pass_through() {
    let flat = single(json!({ "type": "surfaceCreated", "surfaceId": "x" }));
    assert_eq!(flat.kind(), "surfaceCreated");
    assert_eq!(flat.surface_id(), "x");

    let keyed = single(json!({ "version": "v0.9", "createSurface": { "surfaceId": "y" } }));
    match keyed {
        ServerMessage::Unknown { kind, payload } => {
            assert_eq!(kind, "createSurface");
            assert_eq!(payload["surfaceId"], "y");
        }
        other => panic!("Expected Unknown, got {:?}", other),
    }
}

#[test]
fn test_validation_errors() {
    assert_eq!(
        ServerMessage::from_value(json!([1, 2])),
        Err(ValidationError::NotAnObject { found: "array" })
    );
    assert_eq!(
        ServerMessage::from_value(json!({ "hello": 1 })),
        Err(ValidationError::MissingDiscriminant)
    );
    assert_eq!(
        ServerMessage::from_value(json!({ "beginRendering": { "surfaceId": "s" } })),
        Err(ValidationError::missing_field("beginRendering", "root"))
    );
    assert_eq!(
        ServerMessage::from_value(json!({ "type": "surfaceUpdate" })),
        Err(ValidationError::missing_field("surfaceUpdate", "components"))
    );
}

#[test]
fn test_invalid_component_definition_is_reported() {
    let result = ServerMessage::from_value(json!({
        "surfaceUpdate": { "components": [ { "id": "x", "component": { "Text": {}, "Image": {} } } ] }
    }));

    match result {
        Err(ValidationError::InvalidMessage { message_type, reason }) => {
            assert_eq!(message_type, "surfaceUpdate");
            assert!(reason.contains("more than one type"), "unexpected reason: {}", reason);
        }
        other => panic!("Expected InvalidMessage, got {:?}", other),
    }
}

#[test]
fn test_component_definition_accepts_component_properties_alias() {
    let definition = ComponentDefinition::from_value(&json!({
        "id": "legacy",
        "componentProperties": { "Divider": {} }
    }))
    .unwrap();

    assert_eq!(definition.component_type, ComponentType::Divider);
    assert!(definition.properties.is_empty());
}

#[test]
fn test_component_definition_wire_form() {
    let definition = ComponentDefinition::new("title", ComponentType::Text)
        .with_weight(1.0)
        .with_property("text", json!({ "literalString": "Hello" }));

    assert_eq!(
        definition.to_value(),
        json!({ "id": "title", "weight": 1.0, "component": { "Text": { "text": { "literalString": "Hello" } } } })
    );
}

#[test]
fn test_to_value_uses_keyed_envelope() {
    let message = ServerMessage::DeleteSurface(DeleteSurface {
        surface_id: "s".to_string(),
    });
    assert_eq!(message.to_value(), json!({ "deleteSurface": { "surfaceId": "s" } }));
}
