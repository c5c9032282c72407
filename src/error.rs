//! Unified error types for the compiler.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ─── Diagnostics ─────────────────────────────────────────────────────

/// A single user-facing diagnostic tied to a source location.
///
/// Renders as `path:line: message`, the format the CLI prints one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub msg: String,
    pub path: PathBuf,
    pub line: u32,
}

impl Diagnostic {
    pub fn new(msg: impl Into<String>, path: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            msg: msg.into(),
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.line, self.msg)
    }
}

/// Semantic invariant violation raised by the tower at a phase boundary.
///
/// Carries every diagnostic collected within the failing phase, ordered by
/// (path, line).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct InvalidSpec {
    pub diagnostics: Vec<Diagnostic>,
}

impl InvalidSpec {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        debug_assert!(!diagnostics.is_empty());
        Self { diagnostics }
    }

    /// Message of the first diagnostic. Every `InvalidSpec` has at least one.
    pub fn msg(&self) -> &str {
        &self.diagnostics[0].msg
    }
}

impl fmt::Display for InvalidSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diag)?;
        }
        Ok(())
    }
}

// ─── Top-level CLI error ─────────────────────────────────────────────

/// All errors that can surface from a compiler invocation.
#[derive(Error, Debug)]
pub enum CompileError {
    /// I/O error (spec read, output write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Lex, parse, or semantic errors in the spec files
    #[error("{0}")]
    Spec(#[from] InvalidSpec),

    /// Serialization error (JSON summaries)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested generator is not registered
    #[error("Unknown generator '{name}'. Available: {available}")]
    UnknownGenerator { name: String, available: String },

    /// Mutually exclusive flags or other argument validation error
    #[error("{0}")]
    InvalidArgs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new("Symbol 'Blah' is undefined.", "test.babel", 3);
        assert_eq!(d.to_string(), "test.babel:3: Symbol 'Blah' is undefined.");
    }

    #[test]
    fn test_invalid_spec_one_line_per_diagnostic() {
        let err = InvalidSpec::new(vec![
            Diagnostic::new("first", "a.babel", 1),
            Diagnostic::new("second", "b.babel", 9),
        ]);
        assert_eq!(err.to_string(), "a.babel:1: first\nb.babel:9: second");
        assert_eq!(err.msg(), "first");
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such spec");
        let err: CompileError = io_err.into();
        assert!(matches!(err, CompileError::Io(_)));
        assert!(err.to_string().contains("no such spec"));
    }

    #[test]
    fn test_unknown_generator_display() {
        let err = CompileError::UnknownGenerator {
            name: "swift".to_string(),
            available: "babel".to_string(),
        };
        assert!(err.to_string().contains("swift"));
        assert!(err.to_string().contains("babel"));
    }
}
