//! `GET /api/buildinfo` and the identification line logged at startup

use axum::response::Json;
use serde::Serialize;

/// Compile-time identification stamped by `build.rs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
}

/// Identification of the running binary
pub const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    git_hash: env!("GIT_HASH"),
    build_timestamp: env!("BUILD_TIMESTAMP"),
    build_profile: env!("BUILD_PROFILE"),
};

impl BuildInfo {
    /// One-line summary, e.g. `v0.1.0 [1a2b3c4d] built 2026-01-05T09:00:00Z (release)`
    pub fn summary(&self) -> String {
        format!(
            "v{} [{}] built {} ({})",
            self.version, self.git_hash, self.build_timestamp, self.build_profile
        )
    }
}

pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BUILD_INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_format() {
        let info = BuildInfo {
            version: "0.1.0",
            git_hash: "1a2b3c4d",
            build_timestamp: "2026-01-05T09:00:00Z",
            build_profile: "release",
        };
        assert_eq!(
            info.summary(),
            "v0.1.0 [1a2b3c4d] built 2026-01-05T09:00:00Z (release)"
        );
    }

    #[test]
    fn test_running_binary_is_stamped() {
        assert_eq!(BUILD_INFO.version, env!("CARGO_PKG_VERSION"));
        assert!(!BUILD_INFO.git_hash.is_empty());
        assert!(!BUILD_INFO.build_profile.is_empty());
    }
}
