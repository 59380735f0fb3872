mod common;

use std::collections::HashSet;

use common::{compile, fixture_schemas};
use json_schema_to_c::root::{NOTE_FOR_GENERATED_FILES, header_guard};
use json_schema_to_c::{Settings, compile as compile_schema};
use serde_json::json;

#[test]
fn generation_is_byte_identical_across_runs() {
    for (name, schema) in fixture_schemas() {
        let first = compile(&schema).generate("parser.h");
        let second = compile(&schema).generate("parser.h");
        assert_eq!(first, second, "{name}");
    }
}

#[test]
fn every_generator_has_one_typedef_and_one_parser() {
    for (name, schema) in fixture_schemas() {
        let root = compile(&schema);
        let artifacts = root.generate("parser.h");
        let mut names = HashSet::new();
        root.generator().walk(&mut |generator| {
            assert!(names.insert(generator.name.clone()), "{name}: {} twice", generator.name);
            // `typedef ... x_t;` or, for string buffers, `typedef char x_t[N];`
            let declarations = artifacts.header.matches(&format!(" {}_t;", generator.name)).count()
                + artifacts.header.matches(&format!(" {}_t[", generator.name)).count();
            assert_eq!(declarations, 1, "{name}: {}", generator.name);
            let definition = format!("static bool parse_{}(parse_state_t* parse_state,", generator.name);
            assert_eq!(artifacts.source.matches(&definition).count(), 1, "{name}: {definition}");
        });
    }
}

#[test]
fn artifacts_are_marked_and_guarded() {
    for (name, schema) in fixture_schemas() {
        let root = compile(&schema);
        let artifacts = root.generate("out/my-parser.h");
        assert!(artifacts.header.starts_with(NOTE_FOR_GENERATED_FILES), "{name}");
        assert!(artifacts.source.starts_with(NOTE_FOR_GENERATED_FILES), "{name}");
        assert_eq!(header_guard("out/my-parser.h"), "MY_PARSER_H");
        assert!(artifacts.header.contains("#ifndef MY_PARSER_H\n#define MY_PARSER_H\n"));
        assert!(artifacts.header.trim_end().ends_with("#endif /* MY_PARSER_H */"));
        assert!(artifacts.source.contains("#include \"my-parser.h\""));
        assert!(artifacts.source.contains(&format!("#define MAX_TOKEN_NUM {}\n", root.max_token_num())));
        let entry = format!("bool {}(const char* json_string, {}_t* out)", root.entry_point(), root.name());
        assert!(artifacts.header.contains(&format!("{entry};")), "{name}");
        assert!(artifacts.source.contains(&format!("{entry}\n{{")), "{name}");
    }
}

#[test]
fn emitted_code_does_not_allocate() {
    for (name, schema) in fixture_schemas() {
        let source = compile(&schema).generate("parser.h").source;
        for call in ["malloc(", "calloc(", "realloc(", "free("] {
            assert!(!source.contains(call), "{name}: {call}");
        }
    }
}

#[test]
fn schema_errors_carry_the_node_path() {
    let schema = json!({
        "$id": "config",
        "type": "object",
        "properties": {
            "servers": {
                "type": "array",
                "maxItems": 2,
                "items": {
                    "type": "object",
                    "properties": {"host": {"type": "string"}}
                }
            }
        }
    });
    let err = compile_schema(&schema, Settings::new(0), "config.h").unwrap_err();
    assert_eq!(err.path, "config.properties.servers.items.properties.host");
    assert_eq!(err.to_string(), format!("{}: {}", err.path, err.message));
}

#[test]
fn unsupported_keywords_fail_the_compilation() {
    for keyword in ["$ref", "oneOf", "allOf", "not", "if", "then", "else", "patternProperties", "dependencies"] {
        let mut schema = json!({"$id": "x", "type": "object", "properties": {"a": {"type": "boolean"}}});
        schema["properties"]["a"][keyword] = json!({});
        let err = compile_schema(&schema, Settings::new(0), "x.h").unwrap_err();
        assert_eq!(err.path, "x.properties.a", "{keyword}");
        assert!(err.message.contains(keyword), "{keyword}: {err}");
    }
}
