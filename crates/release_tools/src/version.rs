use std::{fs, path::Path};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ReleaseToolError;

const FALLBACK_VERSION: &str = "0.0.0";
const FALLBACK_COMMIT: &str = "unknown";

/// Contents of the deployed `version.json`, polled by clients to detect a new
/// build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    pub version: String,
    pub build_time: String,
    pub build_number: String,
    pub commit_hash: String,
}

impl VersionDescriptor {
    pub fn from_env(now: DateTime<Utc>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), now)
    }

    /// Empty variables count as unset.
    pub fn from_lookup<F>(lookup: F, now: DateTime<Utc>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .find(|value| !value.trim().is_empty())
        };

        Self {
            version: first(&["APP_VERSION", "npm_package_version"])
                .unwrap_or_else(|| FALLBACK_VERSION.to_string()),
            build_time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            build_number: first(&["BUILD_NUMBER"])
                .unwrap_or_else(|| now.timestamp_millis().to_string()),
            commit_hash: first(&["COMMIT_SHA", "VERCEL_GIT_COMMIT_SHA"])
                .unwrap_or_else(|| FALLBACK_COMMIT.to_string()),
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ReleaseToolError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| ReleaseToolError::io(parent, err))?;
        }
        let body =
            serde_json::to_string_pretty(self).map_err(|err| ReleaseToolError::json(path, err))?;
        fs::write(path, body).map_err(|err| ReleaseToolError::io(path, err))?;
        info!(path = %path.display(), version = %self.version, "version descriptor written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/version_tests.rs"]
mod tests;
