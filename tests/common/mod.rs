#![allow(dead_code)]

use std::path::{Path, PathBuf};

use json_schema_to_c::codegen::{EnumValues, Generator, Kind, StringStorage};
use json_schema_to_c::schema::load_schema;
use json_schema_to_c::{RootGenerator, Settings, SettingsLayer};
use serde_json::{Map, Value, json};

/// Schemas of the end-to-end C cases, with their directory names.
pub fn fixture_schemas() -> Vec<(String, Value)> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("c");
    let mut cases: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.join("schema.json").is_file())
        .collect();
    cases.sort();
    cases
        .into_iter()
        .map(|case| {
            let name = case.file_name().unwrap().to_string_lossy().into_owned();
            (name, load_schema(&case.join("schema.json")).unwrap())
        })
        .collect()
}

pub fn compile(schema: &Value) -> RootGenerator {
    let settings = Settings::for_schema(SettingsLayer::default(), schema).unwrap();
    RootGenerator::new(schema, settings).unwrap()
}

/// The largest document the generator accepts, token-wise: every optional
/// property present, every array at `maxItems`.
pub fn worst_case_instance(generator: &Generator) -> Value {
    match &generator.kind {
        Kind::Enum(e) => match &e.values {
            EnumValues::Strings(values) => json!(values[0]),
            EnumValues::Integers(values) => json!(values[0]),
        },
        Kind::NumericString(_) => json!("1"),
        Kind::IntegerStringUnion(_) | Kind::Integer(_) => json!(1),
        Kind::String(s) => match &s.storage {
            StringStorage::Buffer { max_length, .. } => json!("x".repeat(*max_length as usize)),
            StringStorage::Custom { .. } => json!("custom"),
        },
        Kind::Float(_) => json!(0.5),
        Kind::Bool(_) => json!(true),
        Kind::Object(object) => Value::Object(
            object
                .fields
                .iter()
                .map(|(key, field)| (key.clone(), worst_case_instance(&field.generator)))
                .collect::<Map<_, _>>(),
        ),
        Kind::Array(array) => {
            Value::Array(vec![worst_case_instance(&array.item); array.max_items as usize])
        }
    }
}

/// Tokens the runtime tokenizer allocates for a document: one per scalar,
/// container and object key.
pub fn token_count(value: &Value) -> u64 {
    match value {
        Value::Array(items) => 1 + items.iter().map(token_count).sum::<u64>(),
        Value::Object(map) => 1 + map.values().map(|v| 1 + token_count(v)).sum::<u64>(),
        _ => 1,
    }
}
