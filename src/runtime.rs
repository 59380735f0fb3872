//! The hand-written C runtime (tokenizer and primitive parsers) that every
//! generated source artifact carries, either embedded or by `#include`.
use crate::printer::CodePrinter;

pub const BUILTIN_PARSERS: &str = include_str!("../runtime/builtin_parsers.c");

/// Runtime text as a standalone file, for `externalRuntime` setups.
pub fn standalone() -> String {
    let mut out = CodePrinter::new();
    out.write_raw(crate::root::NOTE_FOR_GENERATED_FILES);
    out.write_raw(BUILTIN_PARSERS);
    out.into_string()
}

/// Emit the token buffer size followed by the runtime (or its include).
pub fn emit(out: &mut CodePrinter, max_token_num: u64, external: Option<&str>) {
    out.print("");
    out.print_separator("builtin_parsers.c");
    out.print(format!("#define MAX_TOKEN_NUM {max_token_num}"));
    out.print("");
    match external {
        Some(include) => out.print(format!("#include \"{include}\"")),
        None => out.write_raw(BUILTIN_PARSERS),
    }
    out.print("");
}
