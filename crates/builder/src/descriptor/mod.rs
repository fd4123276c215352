//! Package descriptors
//!
//! A [`PackageDescriptor`] couples static package metadata with the shell
//! actions that implement each lifecycle phase. Descriptors are usually
//! loaded from a TOML file:
//!
//! ```toml
//! [package]
//! name = "NagAconda"
//! version = "0.1.4"
//! release = "1"
//! # vendor, url, license, summary, description ...
//!
//! [phases]
//! build = "python3 setup.py build"
//!
//! [manifest]
//! file = "INSTALLED_FILES"
//!
//! [variables]
//! PYTHON = "python3"
//! ```

mod actions;

pub use actions::PhaseActions;

use pkgdesc_errors::{Error, PackageError};
use pkgdesc_manifest::DEFAULT_MANIFEST_FILE;
use pkgdesc_types::PackageMetadata;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Static package metadata plus per-phase actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub(crate) metadata: PackageMetadata,
    pub(crate) actions: PhaseActions,
    /// Install record path, relative to the unpacked source tree
    pub(crate) manifest_file: String,
    pub(crate) variables: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DescriptorFile {
    package: PackageMetadata,
    #[serde(default)]
    phases: PhaseActions,
    #[serde(default)]
    manifest: ManifestSection,
    #[serde(default)]
    variables: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestSection {
    #[serde(default = "default_manifest_file")]
    file: String,
}

impl Default for ManifestSection {
    fn default() -> Self {
        Self {
            file: default_manifest_file(),
        }
    }
}

fn default_manifest_file() -> String {
    DEFAULT_MANIFEST_FILE.to_string()
}

impl PackageDescriptor {
    /// Create a descriptor
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingMetadata` if a required field is empty.
    pub fn new(metadata: PackageMetadata, actions: PhaseActions) -> Result<Self, Error> {
        metadata.validate()?;
        Ok(Self {
            metadata,
            actions,
            manifest_file: default_manifest_file(),
            variables: BTreeMap::new(),
        })
    }

    /// Parse a descriptor from TOML
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidDescriptor` if the document is malformed
    /// and `BuildError::MissingMetadata` if a required field is empty.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let file: DescriptorFile =
            toml::from_str(content).map_err(|e| PackageError::InvalidDescriptor {
                message: e.to_string(),
            })?;

        if file.manifest.file.trim().is_empty() {
            return Err(PackageError::InvalidDescriptor {
                message: "manifest.file must not be empty".to_string(),
            }
            .into());
        }

        let mut descriptor = Self::new(file.package, file.phases)?;
        descriptor.manifest_file = file.manifest.file;
        descriptor.variables = file.variables;
        Ok(descriptor)
    }

    /// Load a descriptor file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid descriptor.
    pub async fn from_file(path: &Path) -> Result<Self, Error> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        Self::from_toml(&content)
    }

    /// Set the install record file name
    #[must_use]
    pub fn with_manifest_file(mut self, file: impl Into<String>) -> Self {
        self.manifest_file = file.into();
        self
    }

    /// Add a variable exported to every phase action
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Static package metadata, exactly as supplied
    #[must_use]
    pub fn describe(&self) -> &PackageMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn actions(&self) -> &PhaseActions {
        &self.actions
    }

    #[must_use]
    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }

    #[must_use]
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }
}
