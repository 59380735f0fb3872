//! JSON objects with a fixed set of properties, mapped onto a C struct.
//!
//! The parse routine walks the key/value pairs of the object token,
//! dispatching each key to its field parser. After the loop, missing
//! required fields fail the parse and missing optional fields are filled
//! with their default, or zeroed and flagged absent through `has_<field>`.
use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use super::{
    CURRENT_POSITION, CURRENT_TEXT_ARGS, Context, Generator, generate_logged_error, printf_text,
    string_match_args,
};
use crate::error::SchemaError;
use crate::ir::{c_identifier, c_string_literal};
use crate::printer::CodePrinter;
use crate::schema::SchemaNode;

#[derive(Debug, Clone)]
pub struct Field {
    /// Struct member name.
    pub c_name: String,
    pub required: bool,
    pub generator: Generator,
}

impl Field {
    /// Optional fields without a default report their presence.
    pub fn has_presence_flag(&self) -> bool {
        !self.required && !self.generator.has_default_value()
    }
}

#[derive(Debug, Clone)]
pub struct ObjectGenerator {
    /// Keyed by JSON property name, in document order.
    pub fields: IndexMap<String, Field>,
    pub additional_properties: bool,
}

impl ObjectGenerator {
    pub fn new(node: &SchemaNode, ctx: &Context) -> Result<Self, SchemaError> {
        let properties = match node.get("properties") {
            Some(Value::Object(properties)) if !properties.is_empty() => properties,
            Some(Value::Object(_)) => return Err(node.error("Objects must have at least one property")),
            Some(other) => return Err(node.error(format!("'properties' must be an object, found {other}"))),
            None => return Err(node.error("Objects must have 'properties'")),
        };

        let required: Vec<&str> = match node.get("required") {
            None => Vec::new(),
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| {
                    name.as_str()
                        .ok_or_else(|| node.error(format!("'required' entries must be strings, found {name}")))
                })
                .collect::<Result<_, _>>()?,
            Some(other) => return Err(node.error(format!("'required' must be an array, found {other}"))),
        };
        if let Some(unknown) = required.iter().find(|name| !properties.contains_key(**name)) {
            return Err(node.error(format!("Required field '{unknown}' is not in 'properties'")));
        }

        let additional_properties = match node.get("additionalProperties") {
            None => ctx.settings.allow_additional_properties,
            Some(Value::Bool(allowed)) => *allowed,
            Some(_) => return Err(node.error("Only boolean 'additionalProperties' is supported")),
        };

        let mut fields = IndexMap::new();
        let mut members = HashSet::new();
        for (key, schema) in properties {
            let c_name = c_identifier(key);
            let child_ctx = ctx.child(&format!("properties.{key}"), &c_name);
            let field = Field {
                required: required.contains(&key.as_str()),
                generator: Generator::for_schema(schema, &child_ctx)?,
                c_name,
            };
            let mut new_members = vec![field.c_name.clone()];
            if field.has_presence_flag() {
                new_members.push(format!("has_{}", field.c_name));
            }
            for member in new_members {
                if !members.insert(member.clone()) {
                    return Err(node.error(format!("Property '{key}' maps to the C member '{member}' more than once")));
                }
            }
            fields.insert(key.clone(), field);
        }
        Ok(Self { fields, additional_properties })
    }

    /// One token for the object, two per field (key and value).
    pub fn max_token_num(&self, path: &str) -> Result<u64, SchemaError> {
        self.fields.values().try_fold(1u64, |total, field| {
            field
                .generator
                .max_token_num
                .checked_mul(2)
                .and_then(|field_tokens| total.checked_add(field_tokens))
                .ok_or_else(|| SchemaError::new(path, "The token count overflows"))
        })
    }

    pub fn generate_type_declaration(&self, name: &str, comment: Option<&str>, out: &mut CodePrinter) {
        out.print_comment(comment);
        out.scoped(format!("typedef struct {name}_s {{"), format!("}} {name}_t;"), |out| {
            for field in self.fields.values() {
                field.generator.generate_field_declaration(&field.c_name, out);
                if field.has_presence_flag() {
                    out.print(format!("bool has_{};", field.c_name));
                }
            }
        });
    }

    pub fn generate_parser_body(&self, name: &str, out: &mut CodePrinter) {
        out.print("if (check_type(parse_state, JSON_TOKEN_OBJECT))");
        out.code_block(|out| out.print("return true;"));
        let any_required = self.fields.values().any(|f| f.required);
        if any_required {
            out.print(format!("const int object_start = {CURRENT_POSITION};"));
        }
        out.print("const int n = parse_state->tokens[parse_state->current_token].size;");
        out.print("int i;");
        for field in self.fields.values() {
            out.print(format!("bool seen_{} = false;", field.c_name));
        }
        out.print("parse_state->current_token += 1;");

        out.print("for (i = 0; i < n; ++i)");
        out.code_block(|out| {
            for (i, (key, field)) in self.fields.iter().enumerate() {
                let keyword = if i == 0 { "if" } else { "else if" };
                out.print(format!(
                    "{keyword} (builtin_check_current_string(parse_state, {}))",
                    string_match_args(key)
                ));
                out.code_block(|out| {
                    out.print(format!("if (seen_{})", field.c_name));
                    out.code_block(|out| {
                        let message = c_string_literal(&format!("Duplicate field in '{name}': {}", printf_text(key)));
                        generate_logged_error(out, CURRENT_POSITION, &message, &[]);
                    });
                    out.print(format!("seen_{} = true;", field.c_name));
                    out.print("parse_state->current_token += 1;");
                    field
                        .generator
                        .generate_parser_call(&format!("&out->{}", field.c_name), out);
                });
            }
            out.print("else");
            out.code_block(|out| {
                if self.additional_properties {
                    out.print("parse_state->current_token += 1;");
                    out.print("builtin_skip(parse_state);");
                } else {
                    let message = c_string_literal(&format!("Unknown field in '{name}': %.*s"));
                    generate_logged_error(out, CURRENT_POSITION, &message, &CURRENT_TEXT_ARGS);
                }
            });
        });

        for (key, field) in &self.fields {
            let member = format!("out->{}", field.c_name);
            if field.required {
                out.print(format!("if (!seen_{})", field.c_name));
                out.code_block(|out| {
                    let message = c_string_literal(&format!("Missing required field in '{name}': {}", printf_text(key)));
                    generate_logged_error(out, "object_start", &message, &[]);
                });
            } else if field.generator.has_default_value() {
                out.print(format!("if (!seen_{})", field.c_name));
                out.code_block(|out| field.generator.generate_set_default_value(&member, out));
            } else {
                out.print(format!("if (!seen_{})", field.c_name));
                out.code_block(|out| out.print(format!("memset(&{member}, 0, sizeof({member}));")));
                out.print(format!("out->has_{0} = seen_{0};", field.c_name));
            }
        }
        out.print("return false;");
    }
}
