//! Stamps the server binary with its commit, build time and profile
//!
//! Values are exposed as GIT_HASH, BUILD_TIMESTAMP and BUILD_PROFILE and read
//! back with `env!` by `/api/buildinfo` and the startup log line.

use std::process::Command;

const UNKNOWN: &str = "unknown";

/// Short commit hash, or "unknown" outside a git checkout
fn git_short_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn main() {
    // UTC, matching the timestamps the tracker writes elsewhere
    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());

    for (key, value) in [
        ("GIT_HASH", git_short_hash()),
        ("BUILD_TIMESTAMP", built_at),
        ("BUILD_PROFILE", profile),
    ] {
        println!("cargo:rustc-env={}={}", key, value);
    }

    // Without rerun-if-changed the script runs on every build
}
