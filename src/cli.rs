//! Command line: schema → (C source, C header) | token budget
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::root::RootGenerator;
use crate::runtime;
use crate::schema::load_schema;
use crate::settings::{Settings, SettingsLayer};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile a JSON Schema into an allocation-free C parser
#[derive(Parser, Debug)]
#[command(name = "json-schema-to-c", version)]
pub struct CommandLineInterface {
    /// debug-level logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate the parser source and header
    Generate(GenerateOut),
    /// print the token buffer size the schema needs
    Budget(BudgetOut),
}

/// Settings flags. Each one overrides the schema's `js2cSettings` entry.
#[derive(Args, Debug, Clone, Default)]
struct SettingsArgs {
    /// extra tokenizer tokens on top of the schema's worst case
    #[arg(long)]
    additional_tokens: Option<u64>,

    /// skip unknown object keys instead of failing
    #[arg(long, default_value_t = false)]
    allow_additional_properties: bool,

    /// text inserted into the header before the declarations
    #[arg(long)]
    h_prefix_file: Option<PathBuf>,

    /// text appended to the header
    #[arg(long)]
    h_postfix_file: Option<PathBuf>,

    /// text inserted into the source before the runtime (e.g. a LOG_ERROR definition)
    #[arg(long)]
    c_prefix_file: Option<PathBuf>,

    /// text appended to the source
    #[arg(long)]
    c_postfix_file: Option<PathBuf>,

    /// `#include` this file instead of embedding the runtime
    #[arg(long)]
    external_runtime: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    /// JSON Schema file
    schema: PathBuf,

    /// output .c file
    c_file: PathBuf,

    /// output .h file
    h_file: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,

    /// also write the external runtime next to the .c file
    #[arg(long, default_value_t = false)]
    write_runtime: bool,
}

#[derive(clap::Parser, Debug)]
struct BudgetOut {
    /// JSON Schema file
    schema: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SettingsArgs {
    fn to_layer(&self) -> Result<SettingsLayer> {
        Ok(SettingsLayer {
            additional_tokens: self.additional_tokens,
            allow_additional_properties: self.allow_additional_properties.then_some(true),
            h_prefix: read_optional(self.h_prefix_file.as_deref())?,
            h_postfix: read_optional(self.h_postfix_file.as_deref())?,
            c_prefix: read_optional(self.c_prefix_file.as_deref())?,
            c_postfix: read_optional(self.c_postfix_file.as_deref())?,
            external_runtime: self.external_runtime.clone(),
        })
    }

    fn compile(&self, schema_path: &Path) -> Result<RootGenerator> {
        let schema = load_schema(schema_path)?;
        let settings = Settings::for_schema(self.to_layer()?, &schema)?;
        let root = RootGenerator::new(&schema, settings)
            .with_context(|| format!("cannot compile {}", schema_path.display()))?;
        Ok(root)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// `RUST_LOG` wins; otherwise warnings, or debug with `--verbose`.
    pub fn init_logging(&self) {
        let level = if self.verbose { "debug" } else { "warn" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .format_timestamp(None)
            .init();
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let root = target.settings.compile(&target.schema)?;
                let h_file_name = target
                    .h_file
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .context("the header path has no file name")?;
                // render everything before touching the filesystem
                let artifacts = root.generate(&h_file_name);
                let runtime_file = match (target.write_runtime, &root.settings().external_runtime) {
                    (false, _) => None,
                    (true, Some(name)) => Some((sibling(&target.c_file, name), runtime::standalone())),
                    (true, None) => bail!("--write-runtime needs an external runtime name (--external-runtime)"),
                };
                write_file(&target.h_file, &artifacts.header)?;
                write_file(&target.c_file, &artifacts.source)?;
                if let Some((path, text)) = runtime_file {
                    write_file(&path, &text)?;
                }
                log::info!(
                    "wrote {} and {}",
                    target.c_file.display(),
                    target.h_file.display()
                );
            }
            Command::Budget(target) => {
                let root = target.settings.compile(&target.schema)?;
                println!("{}", root.max_token_num());
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|path| {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    })
    .transpose()
}

fn sibling(file: &Path, name: &str) -> PathBuf {
    match file.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
