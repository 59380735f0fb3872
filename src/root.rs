//! The root of a compilation: names the tree after `$id`, computes the
//! token budget and renders the header and source artifacts.
use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::codegen::{Context, Generator};
use crate::error::SchemaError;
use crate::ir::c_identifier;
use crate::printer::CodePrinter;
use crate::runtime;
use crate::settings::Settings;

pub const NOTE_FOR_GENERATED_FILES: &str = concat!(
    "/* This file was generated by json-schema-to-c.\n",
    " * Do not edit it by hand; changes are lost on regeneration. */\n",
);

/// Rendered `.h` and `.c` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub header: String,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct RootGenerator {
    generator: Generator,
    settings: Settings,
    max_token_num: u64,
}

impl RootGenerator {
    pub fn new(schema: &Value, settings: Settings) -> Result<Self, SchemaError> {
        let id = match schema.get("$id") {
            Some(Value::String(id)) => id,
            Some(other) => return Err(SchemaError::new("$id", format!("'$id' must be a string, found {other}"))),
            None => return Err(SchemaError::new("$id", "Missing field: '$id' (names the root type)")),
        };
        let name = c_identifier(id);
        let generator = Generator::for_schema(schema, &Context::root(&name, &settings))?;
        check_unique_names(&generator)?;

        let max_token_num = generator
            .max_token_num
            .checked_add(settings.additional_tokens)
            .filter(|total| *total <= i32::MAX as u64)
            .ok_or_else(|| {
                SchemaError::new(
                    &generator.path,
                    format!(
                        "The token budget ({} + {} additional) does not fit a C int",
                        generator.max_token_num, settings.additional_tokens
                    ),
                )
            })?;
        log::info!(
            "{name}: token budget {max_token_num} ({} from the schema, {} additional)",
            generator.max_token_num,
            settings.additional_tokens
        );
        Ok(Self { generator, settings, max_token_num })
    }

    pub fn name(&self) -> &str {
        &self.generator.name
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Size of the token buffer in `parse_state_t`.
    pub fn max_token_num(&self) -> u64 {
        self.max_token_num
    }

    pub fn entry_point(&self) -> String {
        format!("json_parse_{}", self.name())
    }

    fn entry_point_signature(&self) -> String {
        format!(
            "bool {}(const char* json_string, {}* out)",
            self.entry_point(),
            self.generator.c_type()
        )
    }

    /// Both artifacts; `h_file_name` is how the source includes the header.
    pub fn generate(&self, h_file_name: &str) -> Artifacts {
        Artifacts {
            header: self.generate_parser_h(h_file_name),
            source: self.generate_parser_c(h_file_name),
        }
    }

    pub fn generate_parser_h(&self, h_file_name: &str) -> String {
        let guard = header_guard(h_file_name);
        let mut out = CodePrinter::new();
        out.write_raw(NOTE_FOR_GENERATED_FILES);
        out.print("");
        out.print(format!("#ifndef {guard}"));
        out.print(format!("#define {guard}"));
        out.print("");
        out.print("#include <stdint.h>");
        out.print("#include <stdbool.h>");
        out.print("");
        generate_user_text(&mut out, "User-added prefix", self.settings.h_prefix.as_deref());
        out.print_separator("Generated type declarations");
        out.print("");
        self.generator.generate_type_declaration(&mut out);
        out.print(format!("{};", self.entry_point_signature()));
        out.print("");
        generate_user_text(&mut out, "User-added postfix", self.settings.h_postfix.as_deref());
        out.print(format!("#endif /* {guard} */"));
        out.into_string()
    }

    pub fn generate_parser_c(&self, h_file_name: &str) -> String {
        let mut out = CodePrinter::new();
        out.write_raw(NOTE_FOR_GENERATED_FILES);
        out.print("");
        out.print(format!("#include \"{}\"", file_name(h_file_name)));
        out.print("");
        generate_user_text(&mut out, "User-added prefix", self.settings.c_prefix.as_deref());
        runtime::emit(&mut out, self.max_token_num, self.settings.external_runtime.as_deref());

        let custom = self.generator.custom_parse_functions();
        if !custom.is_empty() {
            out.print_separator("User-supplied parsers");
            for (function, c_type) in custom {
                out.print(format!("bool {function}(parse_state_t* parse_state, {c_type}* out);"));
            }
            out.print("");
        }

        out.print_separator("Generated parsers");
        out.print("");
        self.generator.generate_parser_bodies(&mut out);
        self.generate_root_parser(&mut out);
        generate_user_text(&mut out, "User-added postfix", self.settings.c_postfix.as_deref());
        out.into_string()
    }

    fn generate_root_parser(&self, out: &mut CodePrinter) {
        out.print(self.entry_point_signature());
        out.code_block(|out| {
            out.print("parse_state_t parse_state_var;");
            out.print("parse_state_t* parse_state = &parse_state_var;");
            out.print("if (builtin_parse_json_string(parse_state, json_string))");
            out.code_block(|out| out.print("return true;"));
            self.generator.generate_parser_call("out", out);
            out.print("return false;");
        });
        out.print("");
    }
}

fn generate_user_text(out: &mut CodePrinter, title: &str, text: Option<&str>) {
    if let Some(text) = text {
        out.print_separator(title);
        out.write_raw(text);
        out.print("");
    }
}

fn file_name(path: &str) -> &str {
    Path::new(path).file_name().and_then(|name| name.to_str()).unwrap_or(path)
}

/// `my-parser.h` → `MY_PARSER_H`.
pub fn header_guard(h_file_name: &str) -> String {
    c_identifier(file_name(h_file_name)).to_uppercase()
}

/// Sanitized names are concatenated, so two different schema paths can end
/// up with the same C name.
fn check_unique_names(root: &Generator) -> Result<(), SchemaError> {
    let mut paths: HashMap<&str, &str> = HashMap::new();
    let mut clash = None;
    root.walk(&mut |generator| {
        if let Some(previous) = paths.insert(&generator.name, &generator.path) {
            clash.get_or_insert_with(|| {
                SchemaError::new(
                    &generator.path,
                    format!("The C name '{}' is also generated for {previous}", generator.name),
                )
            });
        }
    });
    clash.map_or(Ok(()), Err)
}
