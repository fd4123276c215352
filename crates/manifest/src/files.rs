use pkgdesc_errors::{BuildError, Error};
use std::path::{Path, PathBuf};

/// File name the install action records installed paths into
pub const DEFAULT_MANIFEST_FILE: &str = "INSTALLED_FILES";

/// Ordered list of installed file paths.
///
/// Paths are kept exactly as the install record lists them, usually
/// absolute paths as seen from inside the build root. Order of first
/// appearance is preserved and duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileManifest {
    paths: Vec<PathBuf>,
}

impl FileManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest from any sequence of paths
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut manifest = Self::new();
        for path in paths {
            manifest.push(path);
        }
        manifest
    }

    /// Parse the install-record format: one path per line, blank lines skipped
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self::from_paths(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    /// Read an install record from disk
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ManifestPathInvalid` if the record cannot be read.
    pub async fn from_file(path: &Path) -> Result<Self, Error> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BuildError::ManifestPathInvalid {
                path: path.display().to_string(),
                reason: format!("cannot read install record: {e}"),
            })?;
        Ok(Self::parse(&content))
    }

    /// Append a path unless it is already listed
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

}

impl IntoIterator for FileManifest {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}
