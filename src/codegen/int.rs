//! Integer-valued nodes: plain integers, numeric strings and the
//! integer-or-numeric-string `anyOf`.
//!
//! All three share one generator; they differ only in which JSON token
//! kinds the runtime accepts (`number_allowed` / `string_allowed`) and the
//! radix used for string forms.
use serde_json::{Map, Value};

use super::{CURRENT_POSITION, generate_logged_error, reject_unsupported_keywords};
use crate::error::SchemaError;
use crate::ir::{NativeInt, Radix, c_string_literal};
use crate::printer::CodePrinter;
use crate::schema::{SchemaNode, value_as_i128};

/// Accepted unsigned numeric-string patterns. The signed forms are the same
/// patterns behind a `[+-]?` prefix.
pub const UNSIGNED_PATTERNS: [(&str, Radix); 4] = [
    ("[0-9]+", Radix::Decimal),
    ("[0-9a-fA-F]+", Radix::Hex),
    ("(0x|0X)?[0-9a-fA-F]+", Radix::Hex),
    ("(0[0-7]+|[0-9]+|0[xX][0-9a-fA-F]+)", Radix::Auto),
];

const SIGN_PREFIX: &str = "[+-]?";

/// Radix of an allow-listed pattern of the given signedness.
pub fn pattern_radix(pattern: &str, signed: bool) -> Option<Radix> {
    let unsigned = if signed { pattern.strip_prefix(SIGN_PREFIX)? } else { pattern };
    UNSIGNED_PATTERNS
        .iter()
        .find(|(p, _)| *p == unsigned)
        .map(|(_, radix)| *radix)
}

pub fn is_numeric_pattern(pattern: &str) -> bool {
    pattern_radix(pattern, false).is_some() || pattern_radix(pattern, true).is_some()
}

fn valid_patterns(signed: bool) -> String {
    UNSIGNED_PATTERNS
        .iter()
        .map(|(p, _)| if signed { format!("\"{SIGN_PREFIX}{p}\"") } else { format!("\"{p}\"") })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct IntegerGenerator {
    pub native: NativeInt,
    pub radix: Radix,
    pub number_allowed: bool,
    pub string_allowed: bool,
    pub minimum: Option<i128>,
    pub maximum: Option<i128>,
    pub exclusive_minimum: Option<i128>,
    pub exclusive_maximum: Option<i128>,
    pub default: Option<i128>,
}

impl IntegerGenerator {
    pub fn can_parse_numeric_string(node: &SchemaNode) -> bool {
        node.type_name() == Some("string")
            && !node.has("js2cParseFunction")
            && node.get("pattern").and_then(Value::as_str).is_some_and(is_numeric_pattern)
    }

    pub fn can_parse_union(node: &SchemaNode) -> bool {
        let Some(Value::Array(branches)) = node.get("anyOf") else {
            return false;
        };
        let types: Option<Vec<&str>> = branches
            .iter()
            .map(|b| b.get("type").and_then(Value::as_str))
            .collect();
        matches!(types.as_deref(), Some(["integer", "string"] | ["string", "integer"]))
    }

    pub fn integer(node: &SchemaNode) -> Result<Self, SchemaError> {
        Self::new(node, true, false)
    }

    pub fn numeric_string(node: &SchemaNode) -> Result<Self, SchemaError> {
        Self::new(node, false, true)
    }

    /// Both branches of the `anyOf` are merged into one numeric-string
    /// description that also accepts JSON numbers.
    pub fn union(node: &SchemaNode) -> Result<Self, SchemaError> {
        let mut merged: Map<String, Value> = node.map.clone();
        merged.remove("anyOf");
        if let Some(Value::Array(branches)) = node.get("anyOf") {
            for (i, branch) in branches.iter().enumerate() {
                let path = format!("{}.anyOf.{i}", node.path);
                let Value::Object(branch) = branch else {
                    return Err(SchemaError::new(path, format!("'{branch}' is not a type descriptor")));
                };
                reject_unsupported_keywords(&SchemaNode::new(branch, &path))?;
                merged.extend(branch.clone());
            }
        }
        merged.insert("type".to_string(), Value::String("string".to_string()));
        Self::new(&SchemaNode::new(&merged, node.path), true, true)
    }

    fn new(node: &SchemaNode, number_allowed: bool, string_allowed: bool) -> Result<Self, SchemaError> {
        let pattern = if string_allowed { node.str("pattern")? } else { None };
        let unsigned_pattern = pattern.is_some_and(|p| pattern_radix(p, false).is_some());

        let mut minimum = node.int("minimum")?;
        if minimum.is_none() && unsigned_pattern {
            minimum = Some(0);
        }
        let native = match node.str("js2cType")? {
            None => NativeInt::infer(minimum),
            Some(name) => NativeInt::from_c_name(name).ok_or_else(|| {
                node.error(format!(
                    "Unsupported integer type: {name}. Valid types are: {}",
                    NativeInt::C_NAMES.join(", ")
                ))
            })?,
        };

        let radix = match pattern {
            _ if !string_allowed => Radix::Decimal,
            None => return Err(node.error("Numeric strings must have a 'pattern'")),
            Some(p) => pattern_radix(p, !native.is_unsigned()).ok_or_else(|| {
                node.error(format!(
                    "Pattern \"{p}\" is not valid for {}. Valid patterns are: {}",
                    native.c_name(),
                    valid_patterns(!native.is_unsigned())
                ))
            })?,
        };

        let mut generator = Self {
            native,
            radix,
            number_allowed,
            string_allowed,
            minimum,
            maximum: node.int("maximum")?,
            exclusive_minimum: node.int("exclusiveMinimum")?,
            exclusive_maximum: node.int("exclusiveMaximum")?,
            default: None,
        };

        let (lo, hi) = native.range();
        // an exclusive bound one past the type's range is its inclusive limit
        if generator.exclusive_maximum == Some(hi + 1) {
            generator.exclusive_maximum = None;
            generator.maximum = generator.maximum.or(Some(hi));
        }
        if generator.exclusive_minimum == Some(lo - 1) {
            generator.exclusive_minimum = None;
            generator.minimum = generator.minimum.or(Some(lo));
        }
        for (key, bound) in generator.bounds() {
            if let Some(value) = bound {
                if value < lo || value > hi {
                    return Err(node.error(format!(
                        "'{key}' {value} is outside the range of {}",
                        native.c_name()
                    )));
                }
            }
        }
        if native.bits() < 64 {
            if generator.maximum.is_none() && generator.exclusive_maximum.is_none() {
                generator.maximum = Some(hi);
            }
            if !native.is_unsigned() && generator.minimum.is_none() && generator.exclusive_minimum.is_none() {
                generator.minimum = Some(lo);
            }
        }
        // the runtime already rejects negative input for unsigned types
        if native.is_unsigned() && generator.minimum == Some(0) {
            generator.minimum = None;
        }

        generator.default = match node.get("default") {
            None => None,
            Some(Value::String(text)) if string_allowed => Some(radix.parse(text).ok_or_else(|| {
                node.error(format!("Default value \"{text}\" is not a base-{} number", radix.value()))
            })?),
            Some(value) => Some(
                value_as_i128(value)
                    .ok_or_else(|| node.error(format!("Default value {value} is not an integer")))?,
            ),
        };
        if let Some(default) = generator.default {
            if !generator.admits(default) {
                return Err(node.error(format!("Default value {default} is out of range")));
            }
        }
        Ok(generator)
    }

    fn bounds(&self) -> [(&'static str, Option<i128>); 4] {
        [
            ("minimum", self.minimum),
            ("maximum", self.maximum),
            ("exclusiveMinimum", self.exclusive_minimum),
            ("exclusiveMaximum", self.exclusive_maximum),
        ]
    }

    /// Whether `value` passes the type's range and every declared bound.
    pub fn admits(&self, value: i128) -> bool {
        let (lo, hi) = self.native.range();
        (lo..=hi).contains(&value)
            && self.minimum.is_none_or(|m| value >= m)
            && self.maximum.is_none_or(|m| value <= m)
            && self.exclusive_minimum.is_none_or(|m| value > m)
            && self.exclusive_maximum.is_none_or(|m| value < m)
    }

    pub fn generate_parser_body(&self, c_type: &str, out: &mut CodePrinter) {
        out.print(format!("{} value;", self.native.parsed_type()));
        out.print(format!(
            "if ({}(parse_state, {}, {}, {}, &value))",
            self.native.parser_fn(),
            self.number_allowed,
            self.string_allowed,
            self.radix.value()
        ));
        out.code_block(|out| out.print("return true;"));
        let checks = [
            (self.minimum, ">="),
            (self.maximum, "<="),
            (self.exclusive_minimum, ">"),
            (self.exclusive_maximum, "<"),
        ];
        for (bound, op) in checks {
            let Some(bound) = bound else { continue };
            out.print(format!("if (!(value {op} {}))", self.native.literal(bound)));
            out.code_block(|out| {
                out.print("parse_state->current_token -= 1;");
                let message = format!(
                    "{} {} {}",
                    c_string_literal("Integer %"),
                    self.native.format_macro(),
                    c_string_literal(&format!(" out of range. It must be {op} {bound}."))
                );
                generate_logged_error(out, CURRENT_POSITION, &message, &["value"]);
            });
        }
        out.print(format!("*out = ({c_type})value;"));
        out.print("return false;");
    }

    pub fn generate_set_default_value(&self, lvalue: &str, out: &mut CodePrinter) {
        if let Some(default) = self.default {
            out.print(format!("{lvalue} = {};", self.native.literal(default)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{Kind, tests::build};
    use serde_json::json;

    fn integer(schema: Value) -> IntegerGenerator {
        match build(schema).unwrap().kind {
            Kind::Integer(i) | Kind::NumericString(i) | Kind::IntegerStringUnion(i) => i,
            other => panic!("not an integer generator: {other:?}"),
        }
    }

    fn body(schema: Value) -> String {
        let mut out = CodePrinter::new();
        build(schema).unwrap().generate_parser_bodies(&mut out);
        out.into_string()
    }

    #[test]
    fn native_type_inference() {
        assert_eq!(integer(json!({"type": "integer"})).native, NativeInt::I64);
        assert_eq!(integer(json!({"type": "integer", "minimum": 0})).native, NativeInt::U64);
        assert_eq!(integer(json!({"type": "integer", "minimum": -4})).native, NativeInt::I64);
        assert_eq!(
            integer(json!({"type": "integer", "js2cType": "int16_t"})).native,
            NativeInt::I16
        );
    }

    #[test]
    fn unsigned_zero_minimum_is_dropped() {
        let i = integer(json!({"type": "integer", "minimum": 0, "maximum": 10}));
        assert_eq!(i.minimum, None);
        assert_eq!(i.maximum, Some(10));
        let text = body(json!({"type": "integer", "minimum": 0}));
        assert!(!text.contains(">="));
        assert!(text.contains("builtin_parse_unsigned(parse_state, true, false, 10, &value)"));
    }

    #[test]
    fn narrow_types_get_implicit_bounds() {
        let i = integer(json!({"type": "integer", "js2cType": "int8_t"}));
        assert_eq!((i.minimum, i.maximum), (Some(-128), Some(127)));
        let u = integer(json!({"type": "integer", "js2cType": "uint16_t"}));
        assert_eq!((u.minimum, u.maximum), (None, Some(65535)));
        let kept = integer(json!({"type": "integer", "js2cType": "uint8_t", "exclusiveMaximum": 200}));
        assert_eq!(kept.maximum, None);
    }

    #[test]
    fn bad_integer_declarations() {
        let err = build(json!({"type": "integer", "js2cType": "long"})).unwrap_err();
        assert!(err.message.starts_with("Unsupported integer type: long"));
        let err = build(json!({"type": "integer", "js2cType": "uint32_t", "minimum": -1})).unwrap_err();
        assert!(err.message.contains("outside the range of uint32_t"));
        let err = build(json!({"type": "integer", "js2cType": "uint8_t", "maximum": 300})).unwrap_err();
        assert!(err.message.contains("outside the range"));
        let err = build(json!({"type": "integer", "minimum": 1, "default": 0})).unwrap_err();
        assert!(err.message.contains("out of range"));
    }

    #[test]
    fn bound_checks_roll_back_the_token() {
        let text = body(json!({"type": "integer", "minimum": -5, "exclusiveMaximum": 100}));
        assert!(text.contains("if (!(value >= -5LL))"));
        assert!(text.contains("if (!(value < 100LL))"));
        assert!(text.contains("parse_state->current_token -= 1;"));
        assert!(text.contains(
            r#"LOG_ERROR(parse_state->tokens[parse_state->current_token].start, "Integer %" PRId64 " out of range. It must be >= -5.", value);"#
        ));
        assert!(text.contains("*out = (root_t)value;"));
    }

    #[test]
    fn numeric_string_patterns() {
        let hex = integer(json!({"type": "string", "pattern": "(0x|0X)?[0-9a-fA-F]+"}));
        assert_eq!(hex.radix, Radix::Hex);
        assert_eq!(hex.native, NativeInt::U64);
        assert!(!hex.number_allowed && hex.string_allowed);

        let signed = integer(json!({"type": "string", "pattern": "[+-]?[0-9]+"}));
        assert_eq!(signed.native, NativeInt::I64);
        assert_eq!(signed.radix, Radix::Decimal);

        let err = build(json!({"type": "string", "pattern": "[+-]?[0-9]+", "js2cType": "uint32_t"})).unwrap_err();
        assert!(err.message.contains("is not valid for uint32_t"));
        let err = build(json!({"type": "string", "pattern": "[0-9]+", "minimum": -3})).unwrap_err();
        assert!(err.message.contains("is not valid for int64_t"));
    }

    #[test]
    fn string_defaults_use_the_node_radix() {
        let i = integer(json!({"type": "string", "pattern": "[0-9a-fA-F]+", "default": "ff"}));
        assert_eq!(i.default, Some(255));
        let mut out = CodePrinter::new();
        i.generate_set_default_value("out->x", &mut out);
        assert_eq!(out.into_string(), "out->x = 255ULL;\n");

        let err = build(json!({"type": "string", "pattern": "[0-9]+", "default": "12a"})).unwrap_err();
        assert!(err.message.contains("is not a base-10 number"));
    }

    #[test]
    fn integer_string_union() {
        let union = integer(json!({
            "anyOf": [
                {"type": "integer", "minimum": 2},
                {"type": "string", "pattern": "(0[0-7]+|[0-9]+|0[xX][0-9a-fA-F]+)"}
            ]
        }));
        assert!(union.number_allowed && union.string_allowed);
        assert_eq!(union.radix, Radix::Auto);
        assert_eq!(union.native, NativeInt::U64);
        assert_eq!(union.minimum, Some(2));
    }

    #[test]
    fn unsigned_patterns_stay_unsigned_with_an_exclusive_minimum() {
        let i = integer(json!({"type": "string", "pattern": "[0-9]+", "exclusiveMinimum": 5}));
        assert_eq!(i.native, NativeInt::U64);
        assert_eq!(i.radix, Radix::Decimal);
        assert_eq!(i.minimum, None);
        let text = body(json!({"type": "string", "pattern": "[0-9]+", "exclusiveMinimum": 5}));
        assert!(text.contains("uint64_t value;"));
        assert!(text.contains("if (!(value > 5ULL))"));
    }

    #[test]
    fn exclusive_bounds_just_outside_the_type_are_its_limits() {
        let u = integer(json!({"type": "integer", "js2cType": "uint8_t", "exclusiveMaximum": 256}));
        assert_eq!((u.maximum, u.exclusive_maximum), (Some(255), None));
        let i = integer(json!({"type": "integer", "js2cType": "int8_t", "exclusiveMinimum": -129}));
        assert_eq!((i.minimum, i.exclusive_minimum), (Some(-128), None));
        let tighter = integer(json!({
            "type": "integer", "js2cType": "uint8_t", "maximum": 9, "exclusiveMaximum": 256
        }));
        assert_eq!(tighter.maximum, Some(9));

        let err = build(json!({"type": "integer", "js2cType": "uint8_t", "exclusiveMaximum": 257})).unwrap_err();
        assert!(err.message.contains("outside the range of uint8_t"));
    }

    #[test]
    fn union_branches_are_checked_for_unsupported_keywords() {
        let err = build(json!({
            "anyOf": [
                {"type": "integer", "$ref": "#/x"},
                {"type": "string", "pattern": "[0-9]+"}
            ]
        }))
        .unwrap_err();
        assert_eq!(err.path, "root.anyOf.0");
        assert_eq!(err.message, "Unsupported keyword '$ref'");

        let err = build(json!({
            "anyOf": [
                {"type": "integer"},
                {"type": "string", "pattern": "[0-9]+", "not": {}}
            ]
        }))
        .unwrap_err();
        assert_eq!(err.path, "root.anyOf.1");
        assert!(err.message.contains("'not'"));
    }
}
