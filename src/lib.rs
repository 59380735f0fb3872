//! Compile a JSON Schema into an allocation-free C parser.
//!
//! The pipeline is schema → [`codegen::Generator`] tree → C text. A
//! compilation is driven by [`root::RootGenerator`], which renders a header
//! with the type declarations and a source file with the parse routines and
//! the tokenizer runtime, sized for the worst-case document the schema
//! admits.
pub mod cli;
pub mod codegen;
pub mod error;
pub mod ir;
pub mod path_de;
pub mod printer;
pub mod root;
pub mod runtime;
pub mod schema;
pub mod settings;

pub use error::{Error, Result, SchemaError};
pub use root::{Artifacts, RootGenerator};
pub use settings::{Settings, SettingsLayer};

/// Parse `schema` under `settings` and render both artifacts.
pub fn compile(
    schema: &serde_json::Value,
    settings: Settings,
    h_file_name: &str,
) -> std::result::Result<Artifacts, SchemaError> {
    Ok(RootGenerator::new(schema, settings)?.generate(h_file_name))
}
