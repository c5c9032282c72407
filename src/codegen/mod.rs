//! Interface exposed to code generators: an indent-aware buffered emitter,
//! a multiline argument-list emitter, buffered output routing, and the
//! plug-in traits a target language implements.
//!
//! Contract violations here are programming mistakes in a generator, not
//! user errors, so they are guarded by plain assertions.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::InvalidSpec;
use crate::ir::{Api, DataType};

const DEFAULT_DENT: usize = 4;

// ─── Emitter ─────────────────────────────────────────────────────────

/// Options for a delimited block scope.
pub struct BlockOptions<'a> {
    /// Appended after the closing delimiter, e.g. `;`
    pub after: &'a str,
    pub delim: (&'a str, &'a str),
    pub dent: usize,
}

impl Default for BlockOptions<'_> {
    fn default() -> Self {
        Self {
            after: "",
            delim: ("{", "}"),
            dent: DEFAULT_DENT,
        }
    }
}

/// Options for `emit_wrapped_text`. The current indent and the prefixes
/// both count against `width`.
pub struct WrapOptions<'a> {
    pub width: usize,
    /// Prepended to every line
    pub prefix: &'a str,
    /// After `prefix` on the first line only
    pub initial_prefix: &'a str,
    /// After `prefix` on continuation lines
    pub subsequent_prefix: &'a str,
}

impl Default for WrapOptions<'_> {
    fn default() -> Self {
        Self {
            width: 80,
            prefix: "",
            initial_prefix: "",
            subsequent_prefix: "",
        }
    }
}

/// Options for `generate_multiline_list`.
pub struct ListOptions<'a> {
    /// Text before the opening delimiter, e.g. `def __init__`
    pub before: &'a str,
    /// Text after the closing delimiter, e.g. `:`
    pub after: &'a str,
    pub delim: (&'a str, &'a str),
    /// Compact mode aligns continuation items to the opening delimiter;
    /// non-compact puts each item on its own indented line.
    pub compact: bool,
    /// Non-compact only: omit the trailing separator on the last item
    pub skip_last_sep: bool,
}

impl Default for ListOptions<'_> {
    fn default() -> Self {
        Self {
            before: "",
            after: "",
            delim: ("(", ")"),
            compact: true,
            skip_last_sep: false,
        }
    }
}

/// Indent-aware buffered emitter. Lines are accumulated in memory; callers
/// route the finished buffer through an `Output` scope.
#[derive(Default)]
pub struct Emitter {
    buffer: String,
    indent: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one line at the current indent. Newlines are disallowed: emit
    /// each line separately so indentation stays consistent.
    pub fn emit(&mut self, line: &str) {
        assert!(
            !line.contains('\n'),
            "emit only takes a single line; use emit_raw for preformatted text"
        );
        if line.is_empty() {
            self.buffer.push('\n');
        } else {
            self.buffer.push_str(&" ".repeat(self.indent));
            self.buffer.push_str(line);
            self.buffer.push('\n');
        }
    }

    /// Append preformatted text verbatim, ignoring indentation. For file
    /// headers and license banners.
    pub fn emit_raw(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn emit_blank_line(&mut self) {
        self.buffer.push('\n');
    }

    /// Run `f` one indent level deeper.
    pub fn indent(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent_by(DEFAULT_DENT, f);
    }

    pub fn indent_by(&mut self, dent: usize, f: impl FnOnce(&mut Self)) {
        self.indent += dent;
        f(self);
        self.indent -= dent;
    }

    /// Emit `header {`, run `f` indented, then emit `}`.
    pub fn block(&mut self, header: &str, f: impl FnOnce(&mut Self)) {
        self.block_with(header, BlockOptions::default(), f);
    }

    pub fn block_with(&mut self, header: &str, opts: BlockOptions<'_>, f: impl FnOnce(&mut Self)) {
        if header.is_empty() {
            self.emit(opts.delim.0);
        } else {
            self.emit(&format!("{} {}", header, opts.delim.0));
        }
        self.indent_by(opts.dent, f);
        self.emit(&format!("{}{}", opts.delim.1, opts.after));
    }

    /// Greedy word-wrap of `text` at `opts.width`, with per-line prefixes.
    /// The current indent and the prefixes both count against the width; a
    /// single word that exceeds it gets a line of its own.
    pub fn emit_wrapped_text(&mut self, text: &str, opts: WrapOptions<'_>) {
        let initial = format!("{}{}", opts.prefix, opts.initial_prefix);
        let subsequent = format!("{}{}", opts.prefix, opts.subsequent_prefix);

        let mut line = initial.clone();
        let mut line_has_words = false;
        for word in text.split_whitespace() {
            let candidate_len = if line_has_words {
                self.indent + line.len() + 1 + word.len()
            } else {
                self.indent + line.len() + word.len()
            };
            if line_has_words && candidate_len > opts.width {
                self.emit(&line);
                line = format!("{}{}", subsequent, word);
            } else {
                if line_has_words {
                    line.push(' ');
                }
                line.push_str(word);
            }
            line_has_words = true;
        }
        if line_has_words || !initial.is_empty() {
            self.emit(&line);
        }
    }

    /// Emit a delimited argument list over multiple lines.
    ///
    /// Compact mode keeps the first item on the `before` line and aligns
    /// continuation items under it; non-compact mode gives every item its
    /// own indented line with a trailing separator (unless
    /// `skip_last_sep`). Zero- and one-item lists always render on a single
    /// line.
    pub fn generate_multiline_list(&mut self, items: &[String], opts: ListOptions<'_>) {
        let (open, close) = opts.delim;
        match items {
            [] => self.emit(&format!("{}{}{}{}", opts.before, open, close, opts.after)),
            [only] => self.emit(&format!(
                "{}{}{}{}{}",
                opts.before, open, only, close, opts.after
            )),
            _ if opts.compact => {
                self.emit(&format!("{}{}{},", opts.before, open, items[0]));
                let pad = " ".repeat(opts.before.len() + open.len());
                for (i, item) in items.iter().enumerate().skip(1) {
                    if i + 1 < items.len() {
                        self.emit(&format!("{}{},", pad, item));
                    } else {
                        self.emit(&format!("{}{}{}{}", pad, item, close, opts.after));
                    }
                }
            }
            _ => {
                self.emit(&format!("{}{}", opts.before, open));
                self.indent(|e| {
                    for (i, item) in items.iter().enumerate() {
                        if i + 1 < items.len() || !opts.skip_last_sep {
                            e.emit(&format!("{},", item));
                        } else {
                            e.emit(item);
                        }
                    }
                });
                self.emit(&format!("{}{}", close, opts.after));
            }
        }
    }

    pub fn output(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

// ─── Output routing ──────────────────────────────────────────────────

/// Buffers generated files by relative path and materializes them only when
/// the whole generation run succeeded, so a failed compile writes nothing.
#[derive(Default)]
pub struct Output {
    files: BTreeMap<PathBuf, String>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a buffered scope for the file at `rel_path`. The emitter's
    /// contents are captured when `f` returns.
    pub fn output_to(&mut self, rel_path: impl Into<PathBuf>, f: impl FnOnce(&mut Emitter)) {
        let rel_path = rel_path.into();
        assert!(
            rel_path.is_relative(),
            "output paths are relative to the output directory"
        );
        let mut emitter = Emitter::new();
        f(&mut emitter);
        self.files.insert(rel_path, emitter.into_string());
    }

    pub fn files(&self) -> &BTreeMap<PathBuf, String> {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every buffered file under `dir`, creating parents as needed.
    /// Returns the paths written.
    pub fn write_all(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for (rel, contents) in &self.files {
            let path = dir.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, contents)?;
            written.push(path);
        }
        Ok(written)
    }
}

// ─── Plug-in traits ──────────────────────────────────────────────────

/// Naming, literal formatting, and type mapping for one target language.
pub trait TargetLanguage {
    /// Output file extension including the dot, e.g. `.swift`
    fn file_extension(&self) -> &'static str;

    fn format_variable(&self, name: &str) -> String;
    fn format_class(&self, name: &str) -> String;
    fn format_method(&self, name: &str) -> String;

    /// Render a literal value in the target language. Mapping values have
    /// no target-language representation by contract.
    fn format_obj(&self, value: &serde_json::Value) -> String {
        assert!(
            !value.is_object(),
            "format_obj cannot render a mapping literal"
        );
        match value {
            serde_json::Value::Bool(true) => "true".to_string(),
            serde_json::Value::Bool(false) => "false".to_string(),
            serde_json::Value::Null => "null".to_string(),
            other => other.to_string(),
        }
    }

    fn format_type(&self, api: &Api, data_type: &DataType) -> String;
}

/// A code generator: the runtime hands it the resolved IR and an output
/// router. User-facing failures surface as `InvalidSpec`.
pub trait Generator {
    fn generate(&mut self, api: &Api, output: &mut Output) -> Result<(), InvalidSpec>;
}

/// Split an identifier into lowercase words on underscores, dashes, slashes,
/// and camel-case boundaries.
pub fn split_words(name: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' || c == '/' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        } else {
            if c.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.extend(c.to_lowercase());
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `get_account_info` → `getAccountInfo` / `GetAccountInfo`
pub fn format_camelcase(name: &str, lower_first: bool) -> String {
    let mut out = String::new();
    for (i, word) in split_words(name).into_iter().enumerate() {
        if i == 0 && lower_first {
            out.push_str(&word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

// ─── Generator registry ──────────────────────────────────────────────

/// Built-in generators addressable from the CLI.
pub fn registered_generators() -> &'static [&'static str] {
    &["babel"]
}

pub fn create_generator(name: &str) -> Option<Box<dyn Generator>> {
    match name {
        "babel" => Some(Box::new(crate::pretty::BabelGenerator::default())),
        _ => None,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "codegen_tests.rs"]
mod tests;
