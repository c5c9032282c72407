//! CLI argument structs for all subcommands.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(after_long_help = r#"WHAT IT DOES:
  Lexes and parses every spec file, resolves them into one validated model
  (cross-file imports, inheritance, enumerated subtypes, defaults, examples),
  then runs the chosen generator over it. Output files are buffered and only
  written once the whole run succeeds; a failed compile leaves the output
  directory untouched.

  Generators are built in and addressed by name; 'babel' is the reference
  pretty-printer that regenerates canonical spec files.

EXAMPLES:
  Validate + regenerate:  babel compile babel users.babel files.babel out/
  Verbose logging:        babel compile babel users.babel out/ --log-level debug

DIAGNOSTICS:
  Printed one per line as 'path:line: message'; the exit code is nonzero
  when any diagnostic was produced.
"#)]
pub struct CompileArgs {
    /// Registered generator to run (see `babel generators`)
    pub generator: String,

    /// Spec files followed by the output directory
    #[arg(required = true, num_args = 2.., value_name = "SPEC-FILE>... <OUTPUT-DIR")]
    pub files: Vec<String>,

    /// Log level for stderr output (error, warn, info, debug)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Parser, Debug)]
#[command(after_long_help = r#"WHAT IT DOES:
  Runs the frontend and resolver only: every semantic check happens, no
  generator runs and nothing is written.

EXAMPLES:
  Check specs:       babel check users.babel files.babel
  Machine-readable:  babel check users.babel --json
"#)]
pub struct CheckArgs {
    /// Spec files to validate
    #[arg(required = true)]
    pub specs: Vec<String>,

    /// Print a JSON summary of the resolved model to stdout
    #[arg(long)]
    pub json: bool,

    /// Log level for stderr output (error, warn, info, debug)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
