use pkgdesc_types::LifecyclePhase;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle phase execution events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PhaseEvent {
    /// A phase action is about to run
    Started {
        package: String,
        phase: LifecyclePhase,
        command: String,
        working_dir: PathBuf,
    },

    /// A phase action exited with status 0
    Completed {
        package: String,
        phase: LifecyclePhase,
        duration_ms: u64,
    },

    /// A phase action failed or was refused
    Failed {
        package: String,
        phase: LifecyclePhase,
        exit_code: Option<i32>,
        message: String,
    },

    /// The install record was read after the install phase
    ManifestRecorded { package: String, files: usize },

    /// The build root was removed by the clean phase
    BuildRootRemoved { path: PathBuf, existed: bool },
}
