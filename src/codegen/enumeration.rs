//! Closed sets of string or integer literals, mapped onto a C `enum`.
use std::collections::HashSet;

use serde_json::Value;

use super::{CURRENT_POSITION, CURRENT_TEXT_ARGS, generate_logged_error, string_match_args};
use crate::error::SchemaError;
use crate::ir::{c_string_literal, enum_label};
use crate::printer::CodePrinter;
use crate::schema::SchemaNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValues {
    Strings(Vec<String>),
    Integers(Vec<i64>),
}

#[derive(Debug, Clone)]
pub struct EnumGenerator {
    pub values: EnumValues,
    /// C constant of each value, same order as `values`.
    pub labels: Vec<String>,
    /// Index into `values`.
    pub default: Option<usize>,
}

impl EnumGenerator {
    pub fn can_parse(node: &SchemaNode) -> bool {
        node.has("enum")
    }

    pub fn new(node: &SchemaNode, name: &str) -> Result<Self, SchemaError> {
        let Some(Value::Array(items)) = node.get("enum") else {
            return Err(node.error("'enum' must be an array"));
        };
        if items.is_empty() {
            return Err(node.error("'enum' must not be empty"));
        }
        let prefix = enum_label(name);

        let values = if items.iter().all(Value::is_string) {
            EnumValues::Strings(items.iter().filter_map(Value::as_str).map(str::to_owned).collect())
        } else if items.iter().all(|v| v.as_i64().is_some()) {
            EnumValues::Integers(items.iter().filter_map(Value::as_i64).collect())
        } else {
            return Err(node.error("'enum' values must be all strings or all integers"));
        };

        let (expected_type, labels) = match &values {
            EnumValues::Strings(strings) => (
                "string",
                strings.iter().map(|s| format!("{prefix}_{}", enum_label(s))).collect::<Vec<_>>(),
            ),
            EnumValues::Integers(integers) => {
                if let Some(n) = integers.iter().find(|n| i32::try_from(**n).is_err()) {
                    return Err(node.error(format!("Enum value {n} does not fit a C enum constant")));
                }
                (
                    "integer",
                    integers
                        .iter()
                        .map(|n| match n {
                            n if *n < 0 => format!("{prefix}_MINUS_{}", n.unsigned_abs()),
                            n => format!("{prefix}_{n}"),
                        })
                        .collect(),
                )
            }
        };
        if let Some(ty) = node.type_name() {
            if ty != expected_type {
                return Err(node.error(format!("'enum' values do not match type '{ty}'")));
            }
        }

        let mut seen = HashSet::new();
        if matches!(values, EnumValues::Strings(_)) {
            seen.insert(format!("{prefix}_LAST"));
        }
        for label in &labels {
            if !seen.insert(label.clone()) {
                return Err(node.error(format!("Enum label {label} is generated by more than one value")));
            }
        }

        let default = match node.get("default") {
            None => None,
            Some(value) => Some(
                items
                    .iter()
                    .position(|item| item == value)
                    .ok_or_else(|| node.error(format!("Default value {value} is not one of the enum values")))?,
            ),
        };
        Ok(Self { values, labels, default })
    }

    pub fn generate_type_declaration(&self, name: &str, comment: Option<&str>, out: &mut CodePrinter) {
        out.print_comment(comment);
        out.scoped(format!("typedef enum {name}_e {{"), format!("}} {name}_t;"), |out| {
            match &self.values {
                EnumValues::Strings(_) => {
                    for label in &self.labels {
                        out.print(format!("{label},"));
                    }
                    out.print(format!("{}_LAST", enum_label(name)));
                }
                EnumValues::Integers(integers) => {
                    let last = self.labels.len() - 1;
                    for (i, (label, value)) in self.labels.iter().zip(integers).enumerate() {
                        let separator = if i == last { "" } else { "," };
                        out.print(format!("{label} = {value}{separator}"));
                    }
                }
            }
        });
    }

    pub fn generate_parser_body(&self, name: &str, out: &mut CodePrinter) {
        let unknown = c_string_literal(&format!("Unknown enum value in '{name}': "));
        match &self.values {
            EnumValues::Strings(strings) => {
                out.print("if (check_type(parse_state, JSON_TOKEN_STRING))");
                out.code_block(|out| out.print("return true;"));
                for (i, (value, label)) in strings.iter().zip(&self.labels).enumerate() {
                    let keyword = if i == 0 { "if" } else { "else if" };
                    out.print(format!(
                        "{keyword} (builtin_check_current_string(parse_state, {}))",
                        string_match_args(value)
                    ));
                    out.code_block(|out| out.print(format!("*out = {label};")));
                }
                out.print("else");
                out.code_block(|out| {
                    let message = format!("{unknown} \"%.*s\"");
                    generate_logged_error(out, CURRENT_POSITION, &message, &CURRENT_TEXT_ARGS);
                });
                out.print("parse_state->current_token += 1;");
            }
            EnumValues::Integers(integers) => {
                out.print("int64_t value;");
                out.print("if (builtin_parse_signed(parse_state, true, false, 10, &value))");
                out.code_block(|out| out.print("return true;"));
                for (i, (value, label)) in integers.iter().zip(&self.labels).enumerate() {
                    let keyword = if i == 0 { "if" } else { "else if" };
                    out.print(format!("{keyword} (value == {value}LL)"));
                    out.code_block(|out| out.print(format!("*out = {label};")));
                }
                out.print("else");
                out.code_block(|out| {
                    out.print("parse_state->current_token -= 1;");
                    let message = format!("{unknown} \"%\" PRId64");
                    generate_logged_error(out, CURRENT_POSITION, &message, &["value"]);
                });
            }
        }
        out.print("return false;");
    }

    pub fn generate_set_default_value(&self, lvalue: &str, out: &mut CodePrinter) {
        if let Some(index) = self.default {
            out.print(format!("{lvalue} = {};", self.labels[index]));
        }
    }
}
