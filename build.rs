//! Build script for the Batchflow worker
//!
//! Embeds git, toolchain, and target information into the binary for the
//! `version` subcommand.

use std::env;
use std::process::Command;

fn main() {
    // Rerun if git HEAD changes
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    let vars = [
        ("BATCHFLOW_GIT_HASH", git(&["rev-parse", "--short=8", "HEAD"])),
        ("BATCHFLOW_GIT_BRANCH", git(&["rev-parse", "--abbrev-ref", "HEAD"])),
        ("BATCHFLOW_GIT_DIRTY", git_dirty()),
        ("BATCHFLOW_BUILD_TIMESTAMP", Some(timestamp)),
        ("BATCHFLOW_TARGET", env::var("TARGET").ok()),
        ("BATCHFLOW_PROFILE", env::var("PROFILE").ok()),
        ("BATCHFLOW_RUSTC_VERSION", run("rustc", &["--version"])),
        ("BATCHFLOW_HOST", env::var("HOST").ok()),
    ];

    for (key, value) in vars {
        println!(
            "cargo:rustc-env={}={}",
            key,
            value.unwrap_or_else(|| "unknown".to_string())
        );
    }
}

fn git(args: &[&str]) -> Option<String> {
    run("git", args)
}

/// "true" when the working tree has uncommitted changes
fn git_dirty() -> Option<String> {
    Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| (!output.stdout.is_empty()).to_string())
}

/// Run a command and capture its trimmed stdout
fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}
