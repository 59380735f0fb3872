//! End-to-end runner for the generated C.
//!
//! Every `tests/c/<case>/` directory holds a `schema.json` and a `test.c`.
//! The schema is compiled to `parser.c`/`parser.h` in a scratch directory,
//! built together with `test.c` by the system C compiler (`$CC`, default
//! `cc`) and executed; a zero exit status passes the case. An optional
//! `postfix.c` is appended to the generated source, for cases that supply
//! their own parse functions.
//!
//! Usage: `cargo run -p dev-test-runner [case-name-filter]`
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use rayon::prelude::*;

use json_schema_to_c::schema::load_schema;
use json_schema_to_c::{RootGenerator, Settings, SettingsLayer};

const HEADER_NAME: &str = "parser.h";

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool> {
    let filter = std::env::args().nth(1);
    let cases = discover(filter.as_deref())?;
    if cases.is_empty() {
        bail!("no test cases found under {}", cases_dir().display());
    }
    let results: Vec<(String, Result<()>)> = cases
        .par_iter()
        .map(|dir| (case_name(dir), run_case(dir)))
        .collect();

    let mut failed = 0;
    for (name, result) in &results {
        match result {
            Ok(()) => eprintln!("{} {name}", "PASS".green().bold()),
            Err(error) => {
                failed += 1;
                eprintln!("{} {name}\n{error:#}", "FAIL".red().bold());
            }
        }
    }
    eprintln!("{} passed, {failed} failed", results.len() - failed);
    Ok(failed == 0)
}

fn cases_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("tests").join("c")
}

fn case_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

fn discover(filter: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = cases_dir().join("*").join("schema.json");
    let mut cases = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        let schema = entry?;
        let Some(dir) = schema.parent() else { continue };
        if filter.is_none_or(|f| case_name(dir).contains(f)) {
            cases.push(dir.to_path_buf());
        }
    }
    cases.sort();
    Ok(cases)
}

fn run_case(dir: &Path) -> Result<()> {
    let schema = load_schema(&dir.join("schema.json"))?;
    let postfix = dir.join("postfix.c");
    let layer = SettingsLayer {
        c_postfix: if postfix.exists() {
            Some(std::fs::read_to_string(&postfix).with_context(|| format!("reading {}", postfix.display()))?)
        } else {
            None
        },
        ..SettingsLayer::default()
    };
    let settings = Settings::for_schema(layer, &schema)?;
    let artifacts = RootGenerator::new(&schema, settings)?.generate(HEADER_NAME);

    let work = tempfile::tempdir()?;
    std::fs::write(work.path().join(HEADER_NAME), &artifacts.header)?;
    std::fs::write(work.path().join("parser.c"), &artifacts.source)?;

    let cc = std::env::var("CC").unwrap_or_else(|_| "cc".to_string());
    let executable = work.path().join("test");
    let build = Command::new(&cc)
        .args(["-std=c99", "-Wall", "-Wextra", "-o"])
        .arg(&executable)
        .arg("-I")
        .arg(work.path())
        .arg(dir.join("test.c"))
        .arg(work.path().join("parser.c"))
        .output()
        .with_context(|| format!("failed to start {cc}"))?;
    if !build.status.success() {
        bail!("{cc} failed:\n{}", String::from_utf8_lossy(&build.stderr));
    }

    let test = Command::new(&executable)
        .output()
        .context("failed to start the test executable")?;
    if !test.status.success() {
        bail!(
            "test executable failed ({}):\n{}{}",
            test.status,
            String::from_utf8_lossy(&test.stdout),
            String::from_utf8_lossy(&test.stderr)
        );
    }
    Ok(())
}
