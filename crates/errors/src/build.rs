//! Build and phase execution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error("missing package metadata: {field}")]
    MissingMetadata { field: String },

    #[error("{phase} phase failed with exit code {}: {output}", display_exit_code(.exit_code))]
    PhaseExecutionFailure {
        phase: String,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("install manifest is empty")]
    ManifestEmpty,

    #[error("invalid manifest path {path}: {reason}")]
    ManifestPathInvalid { path: String, reason: String },

    #[error("cannot run {phase} phase: {required} has not completed")]
    PhaseOutOfOrder { phase: String, required: String },

    #[error("cannot run {phase} phase: sequence halted after {failed} failed")]
    SequenceHalted { phase: String, failed: String },

    #[error("source layout invalid: expected directory {expected}")]
    SourceLayoutInvalid { expected: String },

    #[error("build root unavailable: {path} - {reason}")]
    BuildRootUnavailable { path: String, reason: String },

    #[error("template error in {phase} action: {message}")]
    TemplateError { phase: String, message: String },

    #[error("failed to spawn {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("packaging failed: {message}")]
    PackagingFailed { message: String },
}

#[allow(clippy::ref_option)]
fn display_exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingMetadata { .. } => {
                Some("Fill in every field of the [package] table in the descriptor.")
            }
            Self::PhaseExecutionFailure { .. } => {
                Some("Inspect the captured output above, then run the clean phase before retrying.")
            }
            Self::ManifestEmpty => {
                Some("Make sure the install action records installed files in the manifest file.")
            }
            Self::ManifestPathInvalid { .. } => {
                Some("The install record lists a file that is not present under the build root.")
            }
            Self::PhaseOutOfOrder { .. } => {
                Some("Run the lifecycle phases in order: prepare, build, install.")
            }
            Self::SequenceHalted { .. } => {
                Some("Run the clean phase to reset the build environment.")
            }
            Self::SourceLayoutInvalid { .. } => {
                Some("The source archive must unpack into a single <name>-<version> directory.")
            }
            Self::BuildRootUnavailable { .. } => {
                Some("Point the build-root environment variable at a writable directory.")
            }
            Self::TemplateError { .. } => {
                Some("Correct the phase action in the descriptor before retrying the build.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingMetadata { .. } => "build.missing_metadata",
            Self::PhaseExecutionFailure { .. } => "build.phase_execution_failure",
            Self::ManifestEmpty => "build.manifest_empty",
            Self::ManifestPathInvalid { .. } => "build.manifest_path_invalid",
            Self::PhaseOutOfOrder { .. } => "build.phase_out_of_order",
            Self::SequenceHalted { .. } => "build.sequence_halted",
            Self::SourceLayoutInvalid { .. } => "build.source_layout_invalid",
            Self::BuildRootUnavailable { .. } => "build.build_root_unavailable",
            Self::TemplateError { .. } => "build.template_error",
            Self::SpawnFailed { .. } => "build.spawn_failed",
            Self::PackagingFailed { .. } => "build.packaging_failed",
        };
        Some(code)
    }
}
