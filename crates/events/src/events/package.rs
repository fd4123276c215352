use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Packaging events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PackageEvent {
    /// Packaging started for a manifest of `files` entries
    Started { package: String, files: usize },

    /// Artifact written
    Created {
        package: String,
        path: PathBuf,
        hash: String,
        size: u64,
        files: usize,
    },

    /// Whole pipeline finished (packaging plus clean)
    BuildFinished {
        package: String,
        path: PathBuf,
        duration_ms: u64,
    },
}
