//! Schema → generator tree → C.
//!
//! Every schema node becomes one [`Generator`]. Composite generators
//! (objects, arrays) own their children, so the generator tree mirrors the
//! schema tree. Emission is a depth-first walk: children's declarations and
//! parse routines are printed before their parent's, since the parent refers
//! to them by name.
//!
//! The variant for a node is picked by [`Variant::PRECEDENCE`]: the first
//! variant whose predicate accepts the node wins. Specific shapes (enums,
//! numeric strings, the integer/string `anyOf`) come before the generic
//! type-name matches they would otherwise fall into.
pub mod arr;
pub mod boolean;
pub mod enumeration;
pub mod int;
pub mod num;
pub mod obj;
pub mod string;

use serde_json::Value;

use crate::error::SchemaError;
use crate::ir::c_string_literal;
use crate::printer::CodePrinter;
use crate::schema::SchemaNode;
use crate::settings::Settings;

pub use arr::ArrayGenerator;
pub use boolean::BoolGenerator;
pub use enumeration::{EnumGenerator, EnumValues};
pub use int::IntegerGenerator;
pub use num::FloatGenerator;
pub use obj::{Field, ObjectGenerator};
pub use string::{StringGenerator, StringStorage};

/// Keywords no generator understands. Their presence fails compilation
/// instead of being ignored.
pub const UNSUPPORTED_KEYWORDS: [&str; 9] = [
    "$ref",
    "oneOf",
    "allOf",
    "not",
    "if",
    "then",
    "else",
    "patternProperties",
    "dependencies",
];

/// C expression for the byte offset of the current token.
pub(crate) const CURRENT_POSITION: &str = "parse_state->tokens[parse_state->current_token].start";

/// `%.*s` arguments printing the raw text of the current token.
pub(crate) const CURRENT_TEXT_ARGS: [&str; 2] = [
    "parse_state->tokens[parse_state->current_token].end - parse_state->tokens[parse_state->current_token].start",
    "parse_state->json_string + parse_state->tokens[parse_state->current_token].start",
];

/// Where a generator sits in the schema and what it is called in C.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    pub path: String,
    pub name: String,
    pub settings: &'a Settings,
}

impl<'a> Context<'a> {
    pub fn root(name: &str, settings: &'a Settings) -> Self {
        Self { path: name.to_string(), name: name.to_string(), settings }
    }

    /// `path_segment` extends the dotted schema path, `name_suffix` the C name.
    pub fn child(&self, path_segment: &str, name_suffix: &str) -> Self {
        Self {
            path: format!("{}.{path_segment}", self.path),
            name: format!("{}_{name_suffix}", self.name),
            settings: self.settings,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Generator {
    pub name: String,
    pub path: String,
    pub description: Option<String>,
    /// Upper bound of tokenizer tokens any valid value of this node produces.
    pub max_token_num: u64,
    pub kind: Kind,
}

#[derive(Debug, Clone)]
pub enum Kind {
    Enum(EnumGenerator),
    NumericString(IntegerGenerator),
    IntegerStringUnion(IntegerGenerator),
    String(StringGenerator),
    Integer(IntegerGenerator),
    Float(FloatGenerator),
    Bool(BoolGenerator),
    Object(ObjectGenerator),
    Array(ArrayGenerator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Enum,
    NumericString,
    IntegerStringUnion,
    String,
    Integer,
    Float,
    Bool,
    Object,
    Array,
}

impl Variant {
    pub const PRECEDENCE: [Variant; 9] = [
        Variant::Enum,
        Variant::NumericString,
        Variant::IntegerStringUnion,
        Variant::String,
        Variant::Integer,
        Variant::Float,
        Variant::Bool,
        Variant::Object,
        Variant::Array,
    ];

    pub fn can_parse(self, node: &SchemaNode) -> bool {
        match self {
            Self::Enum => EnumGenerator::can_parse(node),
            Self::NumericString => IntegerGenerator::can_parse_numeric_string(node),
            Self::IntegerStringUnion => IntegerGenerator::can_parse_union(node),
            Self::String => node.type_name() == Some("string"),
            Self::Integer => node.type_name() == Some("integer"),
            Self::Float => node.type_name() == Some("number"),
            Self::Bool => node.type_name() == Some("boolean"),
            Self::Object => node.type_name() == Some("object"),
            Self::Array => node.type_name() == Some("array"),
        }
    }

    fn build(self, node: &SchemaNode, ctx: &Context) -> Result<Kind, SchemaError> {
        Ok(match self {
            Self::Enum => Kind::Enum(EnumGenerator::new(node, &ctx.name)?),
            Self::NumericString => Kind::NumericString(IntegerGenerator::numeric_string(node)?),
            Self::IntegerStringUnion => Kind::IntegerStringUnion(IntegerGenerator::union(node)?),
            Self::String => Kind::String(StringGenerator::new(node)?),
            Self::Integer => Kind::Integer(IntegerGenerator::integer(node)?),
            Self::Float => Kind::Float(FloatGenerator::new(node)?),
            Self::Bool => Kind::Bool(BoolGenerator::new(node)?),
            Self::Object => Kind::Object(ObjectGenerator::new(node, ctx)?),
            Self::Array => Kind::Array(ArrayGenerator::new(node, ctx)?),
        })
    }
}

impl Kind {
    pub fn variant(&self) -> Variant {
        match self {
            Self::Enum(_) => Variant::Enum,
            Self::NumericString(_) => Variant::NumericString,
            Self::IntegerStringUnion(_) => Variant::IntegerStringUnion,
            Self::String(_) => Variant::String,
            Self::Integer(_) => Variant::Integer,
            Self::Float(_) => Variant::Float,
            Self::Bool(_) => Variant::Bool,
            Self::Object(_) => Variant::Object,
            Self::Array(_) => Variant::Array,
        }
    }

    fn max_token_num(&self, path: &str) -> Result<u64, SchemaError> {
        match self {
            Self::Object(object) => object.max_token_num(path),
            Self::Array(array) => array.max_token_num(path),
            _ => Ok(1),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FACTORY
// ————————————————————————————————————————————————————————————————————————————

impl Generator {
    pub fn for_schema(schema: &Value, ctx: &Context) -> Result<Self, SchemaError> {
        let Some(map) = schema.as_object() else {
            return Err(SchemaError::new(
                &ctx.path,
                format!("'{schema}' is not a type descriptor (an object including the field 'type')"),
            ));
        };
        let node = SchemaNode::new(map, &ctx.path);
        reject_unsupported_keywords(&node)?;
        if !node.has("type") && !node.has("anyOf") {
            return Err(node.error("Missing field: 'type'"));
        }
        let variant = Variant::PRECEDENCE
            .into_iter()
            .find(|variant| variant.can_parse(&node))
            .ok_or_else(|| match node.get("type") {
                Some(ty) => node.error(format!("Unsupported type '{}'", display_json(ty))),
                None => node.error("Unsupported 'anyOf': only an integer/string pair is supported"),
            })?;
        let kind = variant.build(&node, ctx)?;
        let max_token_num = kind.max_token_num(&ctx.path)?;
        log::debug!("{}: {variant:?} generator `{}`, max {max_token_num} token(s)", ctx.path, ctx.name);
        Ok(Self {
            name: ctx.name.clone(),
            path: ctx.path.clone(),
            description: node.description(),
            max_token_num,
            kind,
        })
    }
}

fn display_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EMISSION
// ————————————————————————————————————————————————————————————————————————————

impl Generator {
    pub fn c_type(&self) -> String {
        format!("{}_t", self.name)
    }

    pub fn parse_fn(&self) -> String {
        format!("parse_{}", self.name)
    }

    pub fn children(&self) -> Vec<&Generator> {
        match &self.kind {
            Kind::Object(object) => object.fields.values().map(|f| &f.generator).collect(),
            Kind::Array(array) => vec![array.item.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Pre-order walk over this generator and all of its descendants.
    pub fn walk<'s>(&'s self, visit: &mut impl FnMut(&'s Generator)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Typedefs of the children, then this node's own typedef.
    pub fn generate_type_declaration(&self, out: &mut CodePrinter) {
        for child in self.children() {
            child.generate_type_declaration(out);
        }
        let c_type = self.c_type();
        let comment = self.description.as_deref();
        match &self.kind {
            Kind::Enum(e) => e.generate_type_declaration(&self.name, comment, out),
            Kind::NumericString(i) | Kind::IntegerStringUnion(i) | Kind::Integer(i) => {
                out.print_with_comment(format!("typedef {} {c_type};", i.native.c_name()), comment)
            }
            Kind::String(s) => s.generate_type_declaration(&c_type, comment, out),
            Kind::Float(f) => out.print_with_comment(format!("typedef {} {c_type};", f.c_type), comment),
            Kind::Bool(_) => out.print_with_comment(format!("typedef bool {c_type};"), comment),
            Kind::Object(o) => o.generate_type_declaration(&self.name, comment, out),
            Kind::Array(a) => a.generate_type_declaration(&self.name, comment, out),
        }
        out.print("");
    }

    /// A struct member of this node's type.
    pub fn generate_field_declaration(&self, field_name: &str, out: &mut CodePrinter) {
        out.print_with_comment(
            format!("{} {field_name};", self.c_type()),
            self.description.as_deref(),
        );
    }

    /// Parse routines of the children, then this node's own.
    pub fn generate_parser_bodies(&self, out: &mut CodePrinter) {
        for child in self.children() {
            child.generate_parser_bodies(out);
        }
        out.print(format!(
            "static bool {}(parse_state_t* parse_state, {}* out)",
            self.parse_fn(),
            self.c_type()
        ));
        out.code_block(|out| match &self.kind {
            Kind::Enum(e) => e.generate_parser_body(&self.name, out),
            Kind::NumericString(i) | Kind::IntegerStringUnion(i) | Kind::Integer(i) => {
                i.generate_parser_body(&self.c_type(), out)
            }
            Kind::String(s) => s.generate_parser_body(out),
            Kind::Float(f) => f.generate_parser_body(&self.c_type(), out),
            Kind::Bool(_) => out.print("return builtin_parse_bool(parse_state, out);"),
            Kind::Object(o) => o.generate_parser_body(&self.name, out),
            Kind::Array(a) => a.generate_parser_body(&self.name, out),
        });
        out.print("");
    }

    /// Call this node's parse routine on `out_pointer`, failing the caller on error.
    pub fn generate_parser_call(&self, out_pointer: &str, out: &mut CodePrinter) {
        out.print(format!("if ({}(parse_state, {out_pointer}))", self.parse_fn()));
        out.code_block(|out| out.print("return true;"));
    }

    pub fn has_default_value(&self) -> bool {
        match &self.kind {
            Kind::Enum(e) => e.default.is_some(),
            Kind::NumericString(i) | Kind::IntegerStringUnion(i) | Kind::Integer(i) => i.default.is_some(),
            Kind::String(s) => s.default.is_some(),
            Kind::Float(f) => f.default.is_some(),
            Kind::Bool(b) => b.default.is_some(),
            Kind::Object(_) | Kind::Array(_) => false,
        }
    }

    /// Assign the declared default to `lvalue`. No-op without a default.
    pub fn generate_set_default_value(&self, lvalue: &str, out: &mut CodePrinter) {
        match &self.kind {
            Kind::Enum(e) => e.generate_set_default_value(lvalue, out),
            Kind::NumericString(i) | Kind::IntegerStringUnion(i) | Kind::Integer(i) => {
                i.generate_set_default_value(lvalue, out)
            }
            Kind::String(s) => s.generate_set_default_value(lvalue, out),
            Kind::Float(f) => f.generate_set_default_value(lvalue, out),
            Kind::Bool(b) => b.generate_set_default_value(lvalue, out),
            Kind::Object(_) | Kind::Array(_) => {}
        }
    }

    /// User-supplied parse functions (`js2cParseFunction`) in the tree,
    /// with their native types, in emission order and without repeats.
    pub fn custom_parse_functions(&self) -> Vec<(String, String)> {
        let mut found: Vec<(String, String)> = Vec::new();
        self.walk(&mut |generator| {
            if let Kind::String(StringGenerator {
                storage: StringStorage::Custom { c_type, parse_function },
                ..
            }) = &generator.kind
            {
                let entry = (parse_function.clone(), c_type.clone());
                if !found.contains(&entry) {
                    found.push(entry);
                }
            }
        });
        found
    }
}

/// `LOG_ERROR(position, message, args...); return true;`
///
/// `message` is a C expression (usually a string literal, possibly
/// concatenated with `PRId64`-style macros).
pub(crate) fn generate_logged_error(out: &mut CodePrinter, position: &str, message: &str, args: &[&str]) {
    let mut call = format!("LOG_ERROR({position}, {message}");
    for arg in args {
        call.push_str(", ");
        call.push_str(arg);
    }
    call.push_str(");");
    out.print(call);
    out.print("return true;");
}

pub(crate) fn reject_unsupported_keywords(node: &SchemaNode) -> Result<(), SchemaError> {
    match UNSUPPORTED_KEYWORDS.iter().find(|k| node.has(k)) {
        Some(keyword) => Err(node.error(format!("Unsupported keyword '{keyword}'"))),
        None => Ok(()),
    }
}

/// User text placed inside a printf format string.
pub(crate) fn printf_text(text: &str) -> String {
    text.replace('%', "%%")
}

/// A key or enum value as `"literal", length` arguments for
/// `builtin_check_current_string`, which compares decoded token text.
pub(crate) fn string_match_args(value: &str) -> String {
    format!("{}, {}", c_string_literal(value), value.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn build(schema: Value) -> Result<Generator, SchemaError> {
        let settings = Settings::new(0);
        Generator::for_schema(&schema, &Context::root("root", &settings))
    }

    fn variant_of(schema: Value) -> Variant {
        build(schema).unwrap().kind.variant()
    }

    #[test]
    fn factory_precedence() {
        assert_eq!(variant_of(json!({"type": "string", "enum": ["a"]})), Variant::Enum);
        assert_eq!(variant_of(json!({"type": "integer", "enum": [1, 2]})), Variant::Enum);
        assert_eq!(
            variant_of(json!({"type": "string", "pattern": "[0-9]+"})),
            Variant::NumericString
        );
        assert_eq!(
            variant_of(json!({"anyOf": [{"type": "integer"}, {"type": "string", "pattern": "[+-]?[0-9]+"}]})),
            Variant::IntegerStringUnion
        );
        assert_eq!(variant_of(json!({"type": "string", "maxLength": 4})), Variant::String);
        assert_eq!(
            variant_of(json!({"type": "string", "pattern": "[0-9]+", "js2cParseFunction": "f", "js2cType": "my_t"})),
            Variant::String
        );
        assert_eq!(variant_of(json!({"type": "integer"})), Variant::Integer);
        assert_eq!(variant_of(json!({"type": "number"})), Variant::Float);
        assert_eq!(variant_of(json!({"type": "boolean"})), Variant::Bool);
        assert_eq!(variant_of(json!({"type": "object", "properties": {"a": {"type": "boolean"}}})), Variant::Object);
        assert_eq!(variant_of(json!({"type": "array", "items": {"type": "boolean"}, "maxItems": 1})), Variant::Array);
    }

    #[test]
    fn malformed_nodes_are_rejected_with_their_path() {
        let err = build(json!([1, 2])).unwrap_err();
        assert_eq!(err.path, "root");
        assert!(err.message.contains("is not a type descriptor"));

        let err = build(json!({"minimum": 3})).unwrap_err();
        assert_eq!(err.message, "Missing field: 'type'");

        let err = build(json!({"type": "null"})).unwrap_err();
        assert_eq!(err.message, "Unsupported type 'null'");

        let err = build(json!({"anyOf": [{"type": "integer"}, {"type": "boolean"}]})).unwrap_err();
        assert!(err.message.starts_with("Unsupported 'anyOf'"));

        let err = build(json!({"type": "object", "properties": {"a": {"$ref": "#/x"}}})).unwrap_err();
        assert_eq!(err.path, "root.properties.a");
        assert_eq!(err.message, "Unsupported keyword '$ref'");

        let err = build(json!({"$ref": "#/definitions/x"})).unwrap_err();
        assert_eq!(err.message, "Unsupported keyword '$ref'");
    }

    #[test]
    fn children_are_named_after_their_parent() {
        let generator = build(json!({
            "type": "object",
            "properties": {
                "ports": {"type": "array", "items": {"type": "integer"}, "maxItems": 2}
            }
        }))
        .unwrap();
        let mut names = Vec::new();
        let mut paths = Vec::new();
        generator.walk(&mut |g| {
            names.push(g.name.clone());
            paths.push(g.path.clone());
        });
        assert_eq!(names, ["root", "root_ports", "root_ports_item"]);
        assert_eq!(paths, ["root", "root.properties.ports", "root.properties.ports.items"]);
    }

    #[test]
    fn declarations_and_bodies_are_bottom_up() {
        let generator = build(json!({
            "type": "object",
            "properties": {
                "inner": {"type": "object", "properties": {"flag": {"type": "boolean"}}}
            }
        }))
        .unwrap();
        let mut out = CodePrinter::new();
        generator.generate_type_declaration(&mut out);
        let decls = out.into_string();
        let flag = decls.find("typedef bool root_inner_flag_t;").unwrap();
        let inner = decls.find("} root_inner_t;").unwrap();
        let root = decls.find("} root_t;").unwrap();
        assert!(flag < inner && inner < root);

        let mut out = CodePrinter::new();
        generator.generate_parser_bodies(&mut out);
        let bodies = out.into_string();
        let flag = bodies.find("static bool parse_root_inner_flag(").unwrap();
        let inner = bodies.find("static bool parse_root_inner(").unwrap();
        let root = bodies.find("static bool parse_root(").unwrap();
        assert!(flag < inner && inner < root);
    }

    #[test]
    fn descriptions_become_comments() {
        let generator = build(json!({"type": "boolean", "description": "Turns it on"})).unwrap();
        let mut out = CodePrinter::new();
        generator.generate_type_declaration(&mut out);
        assert!(out.into_string().starts_with("/* Turns it on */\ntypedef bool root_t;"));
    }

    #[test]
    fn match_arguments_carry_the_decoded_bytes() {
        assert_eq!(string_match_args("abc"), r#""abc", 3"#);
        assert_eq!(string_match_args("a\"b/c"), r#""a\"b/c", 5"#);
        assert_eq!(string_match_args("\u{e9}"), r#""\303\251", 2"#);
    }

    #[test]
    fn custom_parse_functions_are_collected_once() {
        let generator = build(json!({
            "type": "object",
            "properties": {
                "a": {"type": "string", "js2cParseFunction": "parse_ip", "js2cType": "ip_t"},
                "b": {"type": "string", "js2cParseFunction": "parse_ip", "js2cType": "ip_t"}
            }
        }))
        .unwrap();
        assert_eq!(
            generator.custom_parse_functions(),
            [("parse_ip".to_string(), "ip_t".to_string())]
        );
    }
}
