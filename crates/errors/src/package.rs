//! Package descriptor and manifest error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PackageError {
    #[error("invalid descriptor: {message}")]
    InvalidDescriptor { message: String },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("unknown lifecycle phase: {name}")]
    UnknownPhase { name: String },
}

impl UserFacingError for PackageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidDescriptor { .. } => {
                Some("Check the descriptor TOML for typos and missing tables.")
            }
            Self::UnknownPhase { .. } => Some("Valid phases are: prepare, build, install, clean."),
            Self::InvalidManifest { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidDescriptor { .. } => "package.invalid_descriptor",
            Self::InvalidManifest { .. } => "package.invalid_manifest",
            Self::UnknownPhase { .. } => "package.unknown_phase",
        };
        Some(code)
    }
}
