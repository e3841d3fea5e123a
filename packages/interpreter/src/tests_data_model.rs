use crate::*;
use serde_json::json;

#[test]
fn test_set_then_get_round_trips() {
    let mut model = DataModel::new();
    for (path, value) in [
        ("/a", json!(1)),
        ("/a2/b/c", json!("deep")),
        ("/flags/on", json!(true)),
        ("/nums", json!([1, 2, 3])),
        ("/obj", json!({ "x": { "y": null } })),
    ] {
        model.set(path, value.clone()).unwrap();
        assert_eq!(model.get(path), Some(&value), "path {}", path);
    }
}

#[test]
fn test_get_missing_or_untraversable() {
    let mut model = DataModel::new();
    model.set("/count", json!(2)).unwrap();

    assert_eq!(model.get("/nothing"), None);
    assert_eq!(model.get("/count/inner"), None);
    assert_eq!(model.get("/"), Some(&json!({ "count": 2 })));
}

#[test]
fn test_bracket_and_dot_paths_address_same_value() {
    let mut model = DataModel::new();
    model.set("/list", json!([10, 20, 30])).unwrap();

    assert_eq!(model.get("/list/1"), Some(&json!(20)));
    assert_eq!(model.get("list[1]"), Some(&json!(20)));
    assert_eq!(model.get("list.2"), Some(&json!(30)));
    assert_eq!(model.get("/list/x"), None);
}

#[test]
fn test_key_value_records_become_map() {
    let mut model = DataModel::new();
    model
        .set("/user", json!([{ "key": "name", "valueString": "Ana" }]))
        .unwrap();

    assert_eq!(model.get("/user/name"), Some(&json!("Ana")));
}

#[test]
fn test_nested_value_map_is_folded() {
    let mut model = DataModel::new();
    model
        .set(
            "/",
            json!([
                { "key": "title", "valueString": "Profile" },
                { "key": "profile", "valueMap": [
                    { "key": "age", "valueNumber": 31 },
                    { "key": "active", "valueBool": true }
                ]}
            ]),
        )
        .unwrap();

    assert_eq!(model.get("/title"), Some(&json!("Profile")));
    assert_eq!(model.get("/profile/age"), Some(&json!(31)));
    assert_eq!(model.get("/profile/active"), Some(&json!(true)));
}

#[test]
fn test_dot_record_sets_value_at_path() {
    let mut model = DataModel::new();
    model
        .set("/greeting", json!([{ "key": ".", "valueString": "Hello" }]))
        .unwrap();

    assert_eq!(model.get("/greeting"), Some(&json!("Hello")));
    assert_eq!(model.get("/greeting/."), Some(&json!("Hello")));
}

#[test]
fn test_record_keys_are_paths() {
    let mut model = DataModel::new();
    model
        .set(
            "/",
            json!([
                { "key": "form/name", "valueString": "Ana" },
                { "key": "form.email", "valueString": "ana@example.com" }
            ]),
        )
        .unwrap();

    assert_eq!(
        model.get("/form"),
        Some(&json!({ "name": "Ana", "email": "ana@example.com" }))
    );
}

#[test]
fn test_records_without_value_are_skipped() {
    let mut model = DataModel::new();
    model
        .set(
            "/x",
            json!([{ "key": "a" }, { "key": "b", "valueNumber": 2 }, "stray"]),
        )
        .unwrap();

    assert_eq!(model.get("/x"), Some(&json!({ "b": 2 })));
}

#[test]
fn test_empty_list_is_coerced_to_map() {
    let mut model = DataModel::new();
    model.set("/x", json!([])).unwrap();
    assert_eq!(model.get("/x"), Some(&json!({})));
}

#[test]
fn test_json_strings_are_parsed() {
    let mut model = DataModel::new();
    model
        .set(
            "/",
            json!([
                { "key": "items", "valueString": "[1, 2]" },
                { "key": "meta", "valueString": " {\"a\": 1} " },
                { "key": "broken", "valueString": "{not json}" },
                { "key": "plain", "valueString": "just text" }
            ]),
        )
        .unwrap();

    assert_eq!(model.get("/items"), Some(&json!([1, 2])));
    assert_eq!(model.get("/meta/a"), Some(&json!(1)));
    assert_eq!(model.get("/broken"), Some(&json!("{not json}")));
    assert_eq!(model.get("/plain"), Some(&json!("just text")));
}

#[test]
fn test_plain_string_writes_are_stored_verbatim() {
    let mut model = DataModel::new();
    model.set("/raw", json!("[1, 2]")).unwrap();

    assert_eq!(model.get("/raw"), Some(&json!("[1, 2]")));
}

#[test]
fn test_json_string_parsing_can_be_disabled() {
    let mut model = DataModel::new().with_json_string_parsing(false);
    model
        .set("/", json!([{ "key": "items", "valueString": "[1, 2]" }]))
        .unwrap();

    assert_eq!(model.get("/items"), Some(&json!("[1, 2]")));
}

#[test]
fn test_root_replace_requires_object() {
    let mut model = DataModel::new();
    model.set("/keep", json!(1)).unwrap();

    assert_eq!(
        model.set("/", json!(5)),
        Err(DataModelError::NonMapRoot { found: "number" })
    );
    assert_eq!(model.get("/keep"), Some(&json!(1)));

    model.set("", json!({ "fresh": true })).unwrap();
    assert_eq!(model.root(), &json!({ "fresh": true }));
}

#[test]
fn test_writes_vivify_through_scalars() {
    let mut model = DataModel::new();
    model.set("/a", json!(1)).unwrap();
    model.set("/a/b/c", json!(2)).unwrap();

    assert_eq!(model.get("/a"), Some(&json!({ "b": { "c": 2 } })));
}

#[test]
fn test_list_writes_pad_with_null() {
    let mut model = DataModel::new();
    model.set("/list", json!([1, 2])).unwrap();
    model.set("/list/4", json!("x")).unwrap();

    assert_eq!(model.get("/list"), Some(&json!([1, 2, null, null, "x"])));
}

#[test]
fn test_list_write_with_name_segment_is_rejected() {
    let mut model = DataModel::new();
    model.set("/list", json!([1, 2])).unwrap();

    assert_eq!(
        model.set("/list/name", json!(1)),
        Err(DataModelError::NonNumericIndex {
            path: "/list".to_string(),
            segment: "name".to_string(),
        })
    );
}

#[test]
fn test_list_growth_is_bounded() {
    let mut model = DataModel::new();
    model.set("/list", json!([1, 2])).unwrap();

    let result = model.set("/list/20000", json!(1));
    assert!(matches!(result, Err(DataModelError::IndexOutOfRange { index: 20000, len: 2, .. })));
    assert_eq!(model.get("/list"), Some(&json!([1, 2])));
}

#[test]
fn test_clear_resets_to_empty_object() {
    let mut model = DataModel::new();
    model.set("/a", json!(1)).unwrap();
    assert!(!model.is_empty());
    model.clear();
    assert!(model.is_empty());
}
