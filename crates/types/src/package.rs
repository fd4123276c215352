//! Package metadata definitions

use pkgdesc_errors::BuildError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Architecture tag used for packages without compiled code
pub const NOARCH: &str = "noarch";

/// Identity metadata of a package.
///
/// Every field is plain text; `version` is deliberately not parsed so
/// non-numeric schemes such as `0.1.4b2` survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub release: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(default = "default_arch")]
    pub arch: String,
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_requires: Vec<String>,
}

fn default_arch() -> String {
    NOARCH.to_string()
}

fn default_platforms() -> Vec<String> {
    vec!["any".to_string()]
}

impl PackageMetadata {
    /// Names of the fields that must be non-empty
    pub const REQUIRED_FIELDS: [&'static str; 8] = [
        "name",
        "version",
        "release",
        "vendor",
        "url",
        "license",
        "summary",
        "description",
    ];

    /// Create metadata with the identity triple set and everything else empty
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            release: release.into(),
            vendor: String::new(),
            url: String::new(),
            license: String::new(),
            summary: String::new(),
            description: String::new(),
            author: None,
            author_email: None,
            arch: default_arch(),
            platforms: default_platforms(),
            classifiers: Vec::new(),
            requires: Vec::new(),
            build_requires: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Look up a field by the name used in action templates
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "name" => &self.name,
            "version" => &self.version,
            "release" => &self.release,
            "vendor" => &self.vendor,
            "url" => &self.url,
            "license" => &self.license,
            "summary" => &self.summary,
            "description" => &self.description,
            "arch" => &self.arch,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Check that every required field is populated
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingMetadata` naming the first empty required field.
    pub fn validate(&self) -> Result<(), BuildError> {
        for field in Self::REQUIRED_FIELDS {
            let empty = self.field(field).is_none_or(|v| v.trim().is_empty());
            if empty {
                return Err(BuildError::MissingMetadata {
                    field: field.to_string(),
                });
            }
        }
        if self.arch.trim().is_empty() {
            return Err(BuildError::MissingMetadata {
                field: "arch".to_string(),
            });
        }
        Ok(())
    }

    /// Name of the top-level directory inside the source archive
    #[must_use]
    pub fn source_dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// File stem of the produced package, e.g. `NagAconda-0.1.4-1.noarch`
    #[must_use]
    pub fn artifact_stem(&self) -> String {
        format!("{}-{}-{}.{}", self.name, self.version, self.release, self.arch)
    }
}

impl fmt::Display for PackageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.name, self.version, self.release)
    }
}
