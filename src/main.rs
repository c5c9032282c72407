//! Interface-definition language compiler for `.babel` API specs.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

fn main() {
    babel::cli::run();
}
