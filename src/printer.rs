//! Indentation-aware line printer for the emitted C.
use crate::ir::comment_text;

const INDENT: usize = 4;
const SEPARATOR_WIDTH: usize = 70;

#[derive(Debug, Default)]
pub struct CodePrinter {
    buf: String,
    indent: usize,
}

impl CodePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print one indented line; an empty line carries no indentation.
    pub fn print(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !line.is_empty() {
            self.buf.extend(std::iter::repeat_n(' ', self.indent));
            self.buf.push_str(line);
        }
        self.buf.push('\n');
    }

    pub fn print_comment(&mut self, comment: Option<&str>) {
        if let Some(comment) = comment {
            self.print(format!("/* {} */", comment_text(comment)));
        }
    }

    /// Print a line with an attached comment above it.
    pub fn print_with_comment(&mut self, line: impl AsRef<str>, comment: Option<&str>) {
        self.print_comment(comment);
        self.print(line);
    }

    pub fn print_separator(&mut self, title: &str) {
        let pad = "=".repeat(SEPARATOR_WIDTH.saturating_sub(title.len()) / 2);
        self.print(format!("/* {pad} {title} {pad} */"));
    }

    /// Raw text, no indentation. A trailing newline is added if missing.
    pub fn write_raw(&mut self, text: &str) {
        self.buf.push_str(text);
        if !text.is_empty() && !text.ends_with('\n') {
            self.buf.push('\n');
        }
    }

    /// `open`, indented body, `close`.
    pub fn scoped(&mut self, open: impl AsRef<str>, close: impl AsRef<str>, body: impl FnOnce(&mut Self)) {
        self.print(open);
        self.indent += INDENT;
        body(self);
        self.indent -= INDENT;
        self.print(close);
    }

    /// A `{ ... }` block.
    pub fn code_block(&mut self, body: impl FnOnce(&mut Self)) {
        self.scoped("{", "}", body);
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}
