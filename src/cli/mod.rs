//! CLI layer: argument parsing, command dispatch, and subcommand
//! implementations.

pub mod args;

pub use args::*;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::codegen;
use crate::error::CompileError;
use crate::tower::Tower;

// ─── CLI ─────────────────────────────────────────────────────────────

/// Interface-definition language compiler for .babel API specs
#[derive(Parser, Debug)]
#[command(
    name = "babel",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATETIME"), ")"),
    about,
    after_help = "\
Run 'babel <COMMAND> --help' for detailed options and examples.\n\
Diagnostics print as 'path:line: message', one per line."
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Compile spec files and write generated sources to a directory
    Compile(CompileArgs),

    /// Validate spec files without generating code
    Check(CheckArgs),

    /// List the registered generators
    Generators,
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();

    let log_level = match &cli.command {
        Commands::Compile(args) => args.log_level.as_str(),
        Commands::Check(args) => args.log_level.as_str(),
        Commands::Generators => "warn",
    };
    init_tracing(log_level);

    let result = match cli.command {
        Commands::Compile(args) => cmd_compile(args),
        Commands::Check(args) => cmd_check(args),
        Commands::Generators => {
            for name in codegen::registered_generators() {
                println!("{}", name);
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        match e {
            // One diagnostic per line; scripts grep these.
            CompileError::Spec(spec) => {
                for diag in &spec.diagnostics {
                    eprintln!("{}", diag);
                }
            }
            other => eprintln!("Error: {}", other),
        }
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let log_level = match level {
        "error" => tracing::Level::ERROR,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::WARN,
    };
    // Ignore a second init in tests.
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

// ─── Commands ───────────────────────────────────────────────────────

pub(crate) fn cmd_compile(args: CompileArgs) -> Result<(), CompileError> {
    // The trailing positional is the output directory; everything before
    // it is a spec file. clap guarantees at least two entries.
    let (output_dir, specs) = args
        .files
        .split_last()
        .expect("clap enforces num_args = 2..");
    let spec_paths: Vec<PathBuf> = specs.iter().map(PathBuf::from).collect();
    let output_dir = PathBuf::from(output_dir);

    let written = crate::compile(&args.generator, &spec_paths, &output_dir)?;
    info!(
        generator = %args.generator,
        specs = spec_paths.len(),
        files = written.len(),
        "Compile finished"
    );
    eprintln!(
        "[compile] Wrote {} file(s) to {}",
        written.len(),
        output_dir.display()
    );
    Ok(())
}

pub(crate) fn cmd_check(args: CheckArgs) -> Result<(), CompileError> {
    let spec_paths: Vec<PathBuf> = args.specs.iter().map(PathBuf::from).collect();
    let files = crate::load_spec_files(&spec_paths)?;
    let api = Tower::new(files).parse()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&check_summary(&api))?);
    } else {
        for (name, ns) in &api.namespaces {
            eprintln!(
                "[check] {}: {} data types, {} routes, {} imports",
                name,
                ns.data_types.len(),
                ns.routes.len(),
                ns.imports.len()
            );
        }
        eprintln!("[check] OK ({} spec file(s))", args.specs.len());
    }
    Ok(())
}

/// JSON summary of the resolved model for tooling.
fn check_summary(api: &crate::ir::Api) -> serde_json::Value {
    let namespaces: Vec<serde_json::Value> = api
        .namespaces
        .values()
        .map(|ns| {
            serde_json::json!({
                "name": ns.name,
                "dataTypes": ns.decl_order,
                "aliases": ns.data_types.keys()
                    .filter(|n| !ns.decl_order.contains(*n))
                    .collect::<Vec<_>>(),
                "routes": ns.routes.iter().map(|r| &r.name).collect::<Vec<_>>(),
                "imports": ns.imports,
            })
        })
        .collect();
    serde_json::json!({ "namespaces": namespaces })
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
