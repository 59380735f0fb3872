use serde_json::Value;

use super::{CURRENT_POSITION, Context, Generator, generate_logged_error};
use crate::error::SchemaError;
use crate::ir::c_string_literal;
use crate::printer::CodePrinter;
use crate::schema::SchemaNode;

/// Homogeneous arrays with a compile-time capacity (`maxItems`).
#[derive(Debug, Clone)]
pub struct ArrayGenerator {
    pub item: Box<Generator>,
    pub min_items: u64,
    pub max_items: u64,
}

impl ArrayGenerator {
    pub fn new(node: &SchemaNode, ctx: &Context) -> Result<Self, SchemaError> {
        let items = match node.get("items") {
            Some(items @ Value::Object(_)) => items,
            Some(Value::Array(_)) => return Err(node.error("Tuple-form 'items' is not supported")),
            Some(other) => return Err(node.error(format!("'items' must be an object, found {other}"))),
            None => return Err(node.error("Arrays must have 'items'")),
        };
        let max_items = node
            .count("maxItems")?
            .ok_or_else(|| node.error("Arrays must have 'maxItems'"))?;
        if max_items == 0 {
            return Err(node.error("'maxItems' must be at least 1"));
        }
        if max_items > i32::MAX as u64 {
            return Err(node.error(format!("'maxItems' {max_items} is too large")));
        }
        let min_items = node.count("minItems")?.unwrap_or(0);
        if min_items > max_items {
            return Err(node.error(format!("'minItems' {min_items} is larger than 'maxItems' {max_items}")));
        }
        let item = Generator::for_schema(items, &ctx.child("items", "item"))?;
        Ok(Self { item: Box::new(item), min_items, max_items })
    }

    /// One token for the array plus `maxItems` worst-case items.
    pub fn max_token_num(&self, path: &str) -> Result<u64, SchemaError> {
        self.item
            .max_token_num
            .checked_mul(self.max_items)
            .and_then(|items| items.checked_add(1))
            .ok_or_else(|| SchemaError::new(path, "The token count overflows"))
    }

    pub fn generate_type_declaration(&self, name: &str, comment: Option<&str>, out: &mut CodePrinter) {
        out.print_comment(comment);
        out.scoped(format!("typedef struct {name}_s {{"), format!("}} {name}_t;"), |out| {
            out.print_with_comment("uint64_t n;", Some("The number of elements in the array"));
            out.print(format!("{} items[{}];", self.item.c_type(), self.max_items));
        });
    }

    pub fn generate_parser_body(&self, name: &str, out: &mut CodePrinter) {
        out.print("if (check_type(parse_state, JSON_TOKEN_ARRAY))");
        out.code_block(|out| out.print("return true;"));
        out.print("const int n = parse_state->tokens[parse_state->current_token].size;");
        out.print("int i;");
        out.print(format!("if (n > {})", self.max_items));
        out.code_block(|out| {
            let message = c_string_literal(&format!(
                "Array {name} too large. Length: %i. Maximum length: {}.",
                self.max_items
            ));
            generate_logged_error(out, CURRENT_POSITION, &message, &["n"]);
        });
        if self.min_items > 0 {
            out.print(format!("if (n < {})", self.min_items));
            out.code_block(|out| {
                let message = c_string_literal(&format!(
                    "Array {name} too small. Length: %i. Minimum length: {}.",
                    self.min_items
                ));
                generate_logged_error(out, CURRENT_POSITION, &message, &["n"]);
            });
        }
        out.print("out->n = n;");
        out.print("parse_state->current_token += 1;");
        out.print("for (i = 0; i < n; ++i)");
        out.code_block(|out| self.item.generate_parser_call("&out->items[i]", out));
        out.print("return false;");
    }
}
