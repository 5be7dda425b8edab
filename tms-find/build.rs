//! Build script for tms-find
//!
//! Exposes `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` to the binary for
//! its startup banner. `SOURCE_DATE_EPOCH` pins the timestamp for
//! reproducible builds.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    // e.g. "1a2b3c4d" or "1a2b3c4d-dirty"; "unknown" outside a checkout
    let git_hash = git(&["describe", "--always", "--dirty", "--abbrev=8", "--match=NONE"])
        .unwrap_or_else(|| "unknown".to_string());

    let built_at = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(chrono::Utc::now);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        built_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    );
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}
