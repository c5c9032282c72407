//! Build script — stamps BUILD_DATETIME into the binary for `--version`.

use chrono::Utc;

fn main() {
    println!(
        "cargo:rustc-env=BUILD_DATETIME={}",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );
    // Only re-run if build.rs itself changes (not on every source file change)
    println!("cargo:rerun-if-changed=build.rs");
}
