//! # babel — Interface-Definition Language Compiler
//!
//! Reads `.babel` spec files describing JSON-over-HTTP APIs, validates them
//! as one coherent specification, and hands the resolved intermediate
//! representation to code generators.
//!
//! ## Library usage
//!
//! This crate is primarily a CLI tool, but the whole pipeline is exposed as
//! a library so tests and embedders can drive it without process state:
//!
//! ```
//! use std::path::PathBuf;
//! use babel::tower::Tower;
//!
//! let spec = "namespace files\n\nstruct QuotaInfo\n    quota UInt64\n";
//! let api = Tower::new(vec![(PathBuf::from("files.babel"), spec.to_string())])
//!     .parse()
//!     .unwrap();
//! assert!(api.namespaces["files"].data_type_by_name("QuotaInfo").is_some());
//! ```

use std::io;
use std::path::{Path, PathBuf};

pub mod cli;
pub mod codegen;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod tower;
pub mod wire;

pub use error::{CompileError, Diagnostic, InvalidSpec};
pub use ir::{Api, DataType, Namespace};
pub use tower::Tower;

/// Read every spec file into memory. Sources are small; the lexer works on
/// whole buffers.
pub fn load_spec_files(paths: &[PathBuf]) -> io::Result<Vec<(PathBuf, String)>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let source = std::fs::read_to_string(path)?;
        files.push((path.clone(), source));
    }
    Ok(files)
}

/// Compile spec files with a registered generator, materializing output
/// files under `output_dir` only when the whole run succeeds.
pub fn compile(
    generator_name: &str,
    spec_paths: &[PathBuf],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, CompileError> {
    let mut generator = codegen::create_generator(generator_name).ok_or_else(|| {
        CompileError::UnknownGenerator {
            name: generator_name.to_string(),
            available: codegen::registered_generators().join(", "),
        }
    })?;

    let files = load_spec_files(spec_paths)?;
    let api = Tower::new(files).parse()?;

    let mut output = codegen::Output::new();
    generator.generate(&api, &mut output)?;
    Ok(output.write_all(output_dir)?)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_compile_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let spec_path = tmp.path().join("files.babel");
        std::fs::write(
            &spec_path,
            "namespace files\n\nstruct QuotaInfo\n    quota UInt64\n",
        )
        .unwrap();
        let out_dir = tmp.path().join("out");

        let written = compile("babel", &[spec_path], &out_dir).unwrap();
        assert_eq!(written.len(), 1);
        let regenerated = std::fs::read_to_string(out_dir.join("files.babel")).unwrap();
        assert!(regenerated.contains("struct QuotaInfo"));
        assert!(regenerated.contains("    quota UInt64"));
    }

    #[test]
    fn test_compile_unknown_generator() {
        let tmp = tempfile::tempdir().unwrap();
        let err = compile("swift", &[], tmp.path()).unwrap_err();
        assert!(matches!(err, CompileError::UnknownGenerator { .. }));
    }

    #[test]
    fn test_compile_invalid_spec_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let spec_path = tmp.path().join("bad.babel");
        std::fs::write(&spec_path, "namespace t\n\nstruct S\n    f Missing\n").unwrap();
        let out_dir = tmp.path().join("out");

        let err = compile("babel", &[spec_path], &out_dir).unwrap_err();
        assert!(matches!(err, CompileError::Spec(_)));
        assert!(!out_dir.exists(), "failed compiles must not write output");
    }

    #[test]
    fn test_load_spec_files_missing_file() {
        let err = load_spec_files(&[PathBuf::from("/nonexistent/x.babel")]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
