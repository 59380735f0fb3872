mod common;

use common::{compile, fixture_schemas, token_count, worst_case_instance};
use json_schema_to_c::{RootGenerator, Settings};
use serde_json::json;

#[test]
fn worst_case_documents_fit_the_budget() {
    for (name, schema) in fixture_schemas() {
        let root = compile(&schema);
        let instance = worst_case_instance(root.generator());
        let tokens = token_count(&instance);
        assert!(
            tokens <= root.generator().max_token_num,
            "{name}: {tokens} tokens for {instance}, budget {}",
            root.generator().max_token_num
        );
        assert!(tokens <= root.max_token_num());
    }
}

#[test]
fn scalar_only_objects_are_budgeted_exactly() {
    let schema = json!({
        "$id": "flat",
        "type": "object",
        "properties": {
            "a": {"type": "integer"},
            "b": {"type": "string", "maxLength": 3},
            "c": {"type": "array", "maxItems": 4, "items": {"type": "boolean"}}
        }
    });
    let root = RootGenerator::new(&schema, Settings::new(0)).unwrap();
    let instance = worst_case_instance(root.generator());
    // the array value costs 1 + 4 tokens but is budgeted 2 * 5 as a field
    assert_eq!(token_count(&instance), 1 + 2 + 2 + 1 + 5);
    assert_eq!(root.max_token_num(), 1 + 2 + 2 + 2 * 5);
}

#[test]
fn slack_is_added_once_at_the_root() {
    let schema = json!({"$id": "flag", "type": "boolean"});
    for slack in [0, 1, 100] {
        let root = RootGenerator::new(&schema, Settings::new(slack)).unwrap();
        assert_eq!(root.max_token_num(), 1 + slack);
    }
}

#[test]
fn nested_arrays_multiply() {
    let schema = json!({
        "$id": "cube",
        "type": "array",
        "maxItems": 2,
        "items": {
            "type": "array",
            "maxItems": 3,
            "items": {"type": "array", "maxItems": 4, "items": {"type": "number"}}
        }
    });
    let root = RootGenerator::new(&schema, Settings::new(0)).unwrap();
    let instance = worst_case_instance(root.generator());
    assert_eq!(token_count(&instance), root.max_token_num());
    assert_eq!(root.max_token_num(), 1 + 2 * (1 + 3 * (1 + 4)));
}
