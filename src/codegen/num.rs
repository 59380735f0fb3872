use serde_json::Value;

use super::{CURRENT_POSITION, generate_logged_error};
use crate::error::SchemaError;
use crate::ir::{c_string_literal, float_literal};
use crate::printer::CodePrinter;
use crate::schema::SchemaNode;

#[derive(Debug, Clone)]
pub struct FloatGenerator {
    /// `double` unless `js2cType` says `float`.
    pub c_type: &'static str,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub default: Option<f64>,
}

impl FloatGenerator {
    pub fn new(node: &SchemaNode) -> Result<Self, SchemaError> {
        let c_type = match node.str("js2cType")? {
            None | Some("double") => "double",
            Some("float") => "float",
            Some(other) => {
                return Err(node.error(format!(
                    "Unsupported number type: {other}. Valid types are: double, float"
                )));
            }
        };
        let generator = Self {
            c_type,
            minimum: node.float("minimum")?,
            maximum: node.float("maximum")?,
            exclusive_minimum: node.float("exclusiveMinimum")?,
            exclusive_maximum: node.float("exclusiveMaximum")?,
            default: match node.get("default") {
                None => None,
                Some(Value::Number(n)) => n.as_f64(),
                Some(other) => return Err(node.error(format!("Default value {other} is not a number"))),
            },
        };
        if let Some(default) = generator.default {
            if !generator.admits(default) {
                return Err(node.error(format!("Default value {default} is out of range")));
            }
        }
        Ok(generator)
    }

    pub fn admits(&self, value: f64) -> bool {
        self.minimum.is_none_or(|m| value >= m)
            && self.maximum.is_none_or(|m| value <= m)
            && self.exclusive_minimum.is_none_or(|m| value > m)
            && self.exclusive_maximum.is_none_or(|m| value < m)
    }

    pub fn generate_parser_body(&self, c_type: &str, out: &mut CodePrinter) {
        out.print("double value;");
        out.print("if (builtin_parse_double(parse_state, &value))");
        out.code_block(|out| out.print("return true;"));
        let checks = [
            (self.minimum, ">="),
            (self.maximum, "<="),
            (self.exclusive_minimum, ">"),
            (self.exclusive_maximum, "<"),
        ];
        for (bound, op) in checks {
            let Some(bound) = bound else { continue };
            let bound = float_literal(bound);
            out.print(format!("if (!(value {op} {bound}))"));
            out.code_block(|out| {
                out.print("parse_state->current_token -= 1;");
                let message = c_string_literal(&format!("Number %f out of range. It must be {op} {bound}."));
                generate_logged_error(out, CURRENT_POSITION, &message, &["value"]);
            });
        }
        out.print(format!("*out = ({c_type})value;"));
        out.print("return false;");
    }

    pub fn generate_set_default_value(&self, lvalue: &str, out: &mut CodePrinter) {
        if let Some(default) = self.default {
            out.print(format!("{lvalue} = {};", float_literal(default)));
        }
    }
}
