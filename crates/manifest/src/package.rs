use pkgdesc_errors::{Error, PackageError};
use pkgdesc_types::PackageMetadata;
use serde::{Deserialize, Serialize};

/// Archive entry name of the embedded manifest
pub const MANIFEST_ENTRY_NAME: &str = "manifest.toml";

/// Format version written into new artifacts
pub const PACKAGE_FORMAT_VERSION: u32 = 1;

/// Package manifest (`manifest.toml` contents)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package format version for compatibility checking
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub package: PackageMetadata,
    /// Installed paths in archive order
    #[serde(default)]
    pub files: Vec<String>,
}

fn default_format_version() -> u32 {
    PACKAGE_FORMAT_VERSION
}

impl PackageManifest {
    /// Create a new manifest
    #[must_use]
    pub fn new(package: PackageMetadata, files: Vec<String>) -> Self {
        Self {
            format_version: PACKAGE_FORMAT_VERSION,
            package,
            files,
        }
    }

    /// Serialize to TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be serialized to TOML format.
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(|e| {
            PackageError::InvalidManifest {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Validate manifest fields
    ///
    /// # Errors
    ///
    /// Returns an error if the format version is unsupported, metadata is
    /// incomplete, or no files are listed.
    pub fn validate(&self) -> Result<(), Error> {
        if self.format_version != PACKAGE_FORMAT_VERSION {
            return Err(PackageError::InvalidManifest {
                message: format!("unsupported format version {}", self.format_version),
            }
            .into());
        }
        self.package.validate()?;
        if self.files.is_empty() {
            return Err(PackageError::InvalidManifest {
                message: "package lists no files".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
