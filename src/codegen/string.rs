use serde_json::Value;

use crate::error::SchemaError;
use crate::ir::c_string_literal;
use crate::printer::CodePrinter;
use crate::schema::SchemaNode;

#[derive(Debug, Clone)]
pub enum StringStorage {
    /// A NUL-terminated `char[max_length + 1]`, filled by the runtime.
    Buffer { min_length: u64, max_length: u64 },
    /// A user type filled by a user function (`js2cType` + `js2cParseFunction`).
    Custom { c_type: String, parse_function: String },
}

#[derive(Debug, Clone)]
pub struct StringGenerator {
    pub storage: StringStorage,
    pub default: Option<String>,
}

impl StringGenerator {
    pub fn new(node: &SchemaNode) -> Result<Self, SchemaError> {
        if let Some(parse_function) = node.str("js2cParseFunction")? {
            let c_type = node
                .str("js2cType")?
                .ok_or_else(|| node.error("'js2cParseFunction' requires 'js2cType'"))?;
            if node.has("default") {
                return Err(node.error("'default' is not supported together with 'js2cParseFunction'"));
            }
            return Ok(Self {
                storage: StringStorage::Custom {
                    c_type: c_type.to_string(),
                    parse_function: parse_function.to_string(),
                },
                default: None,
            });
        }

        if let Some(pattern) = node.str("pattern")? {
            return Err(node.error(format!(
                "Pattern \"{pattern}\" is not supported. Only numeric string patterns are accepted"
            )));
        }
        let max_length = node
            .count("maxLength")?
            .ok_or_else(|| node.error("Strings must have a 'maxLength'"))?;
        let min_length = node.count("minLength")?.unwrap_or(0);
        if min_length > max_length {
            return Err(node.error(format!("'minLength' {min_length} is larger than 'maxLength' {max_length}")));
        }
        if max_length >= i32::MAX as u64 {
            return Err(node.error(format!("'maxLength' {max_length} is too large")));
        }
        let default = match node.get("default") {
            None => None,
            Some(Value::String(text)) => {
                let length = text.len() as u64;
                if length > max_length || length < min_length {
                    return Err(node.error(format!(
                        "Default value \"{text}\" does not fit the length limits {min_length}..={max_length}"
                    )));
                }
                Some(text.clone())
            }
            Some(other) => return Err(node.error(format!("Default value {other} is not a string"))),
        };
        Ok(Self { storage: StringStorage::Buffer { min_length, max_length }, default })
    }

    pub fn generate_type_declaration(&self, c_type: &str, comment: Option<&str>, out: &mut CodePrinter) {
        let line = match &self.storage {
            StringStorage::Buffer { max_length, .. } => format!("typedef char {c_type}[{}];", max_length + 1),
            StringStorage::Custom { c_type: native, .. } => format!("typedef {native} {c_type};"),
        };
        out.print_with_comment(line, comment);
    }

    pub fn generate_parser_body(&self, out: &mut CodePrinter) {
        match &self.storage {
            StringStorage::Buffer { min_length, max_length } => out.print(format!(
                "return builtin_parse_string(parse_state, *out, {min_length}, {max_length});"
            )),
            StringStorage::Custom { parse_function, .. } => {
                out.print(format!("return {parse_function}(parse_state, out);"))
            }
        }
    }

    pub fn generate_set_default_value(&self, lvalue: &str, out: &mut CodePrinter) {
        if let Some(default) = &self.default {
            out.print(format!("strcpy({lvalue}, {});", c_string_literal(default)));
        }
    }
}
