//! Package artifact creation
//!
//! Packaging turns the install manifest into a single `.tar.zst` artifact:
//! `manifest.toml` first, then every recorded path in manifest order, with
//! normalized tar headers so identical inputs give identical bytes.

pub mod archive;
pub mod compression;

use self::archive::{create_package_tar, get_deterministic_timestamp, ArchiveEntry};
use self::compression::compress_with_zstd;
use crate::descriptor::PackageDescriptor;
use crate::environment::BuildEnv;
use pkgdesc_errors::{BuildError, Error};
use pkgdesc_events::{AppEvent, EventEmitter, PackageEvent};
use pkgdesc_hash::Hash;
use pkgdesc_manifest::{FileManifest, PackageManifest, MANIFEST_ENTRY_NAME};
use pkgdesc_types::LifecyclePhase;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Artifact file extension
pub const ARTIFACT_EXTENSION: &str = "tar.zst";

/// A produced package file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArtifact {
    pub path: PathBuf,
    /// BLAKE3 of the compressed artifact
    pub hash: Hash,
    /// Compressed size in bytes
    pub size: u64,
    /// Number of manifest entries packaged
    pub file_count: usize,
}

impl PackageDescriptor {
    /// Package every path listed in `manifest` from the build root
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the manifest is empty (`ManifestEmpty`)
    /// - the install phase has not completed (`PhaseOutOfOrder`)
    /// - an entry escapes or is missing from the build root (`ManifestPathInvalid`)
    /// - writing, compressing or hashing the artifact fails
    pub async fn package_with_manifest(
        &self,
        manifest: &FileManifest,
        env: &BuildEnv,
    ) -> Result<PackageArtifact, Error> {
        if manifest.is_empty() {
            return Err(BuildError::ManifestEmpty.into());
        }
        if !env.has_completed(LifecyclePhase::Install) {
            return Err(BuildError::PhaseOutOfOrder {
                phase: "package".to_string(),
                required: LifecyclePhase::Install.to_string(),
            }
            .into());
        }

        let package = self.metadata.to_string();
        env.emit(AppEvent::Package(PackageEvent::Started {
            package: package.clone(),
            files: manifest.len(),
        }));

        let entries = resolve_entries(env.build_root(), manifest).await?;
        let files = entries
            .iter()
            .map(|entry| entry.archive_path.display().to_string())
            .collect();
        let package_manifest = PackageManifest::new(self.metadata.clone(), files);
        package_manifest.validate()?;
        let manifest_toml = package_manifest.to_toml()?;

        let output_dir = env.output_dir();
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::io_with_path(&e, output_dir))?;

        // Uncompressed tar lives next to the artifact and is dropped on return
        let tar_file = tempfile::Builder::new()
            .prefix(".pkgdesc-")
            .suffix(".tar")
            .tempfile_in(output_dir)
            .map_err(|e| Error::io_with_path(&e, output_dir))?;

        create_package_tar(
            MANIFEST_ENTRY_NAME,
            &manifest_toml,
            &entries,
            tar_file.path(),
            get_deterministic_timestamp(),
        )
        .await?;

        let path = output_dir.join(format!(
            "{}.{ARTIFACT_EXTENSION}",
            self.metadata.artifact_stem()
        ));
        compress_with_zstd(env.zstd_level(), tar_file.path(), &path).await?;

        let hash = Hash::hash_file(&path).await?;
        let size = tokio::fs::metadata(&path)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?
            .len();

        env.emit(AppEvent::Package(PackageEvent::Created {
            package,
            path: path.clone(),
            hash: hash.to_hex(),
            size,
            files: entries.len(),
        }));

        Ok(PackageArtifact {
            path,
            hash,
            size,
            file_count: entries.len(),
        })
    }
}

/// Map manifest paths onto the build root, rejecting anything outside it.
///
/// Entries naming the same archive path after normalization are packaged
/// once, at their first position.
async fn resolve_entries(
    build_root: &Path,
    manifest: &FileManifest,
) -> Result<Vec<ArchiveEntry>, Error> {
    let canonical_root = tokio::fs::canonicalize(build_root).await.map_err(|e| {
        BuildError::BuildRootUnavailable {
            path: build_root.display().to_string(),
            reason: e.to_string(),
        }
    })?;

    let mut seen = HashSet::with_capacity(manifest.len());
    let mut entries = Vec::with_capacity(manifest.len());

    for path in manifest.iter() {
        let invalid = |reason: &str| -> Error {
            BuildError::ManifestPathInvalid {
                path: path.display().to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        let mut relative = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::ParentDir => return Err(invalid("escapes the build root")),
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        if relative.as_os_str().is_empty() {
            return Err(invalid("does not name a file"));
        }
        if !seen.insert(relative.clone()) {
            continue;
        }

        let source = build_root.join(&relative);
        if tokio::fs::symlink_metadata(&source).await.is_err() {
            return Err(invalid("not present under the build root"));
        }

        // The entry itself may be a symlink and is archived as one, but the
        // directories leading to it must resolve inside the build root
        if let Some(parent) = source.parent() {
            let resolved = tokio::fs::canonicalize(parent)
                .await
                .map_err(|_| invalid("not present under the build root"))?;
            if !resolved.starts_with(&canonical_root) {
                return Err(invalid("resolves outside the build root"));
            }
        }

        entries.push(ArchiveEntry {
            archive_path: relative,
            source,
        });
    }

    Ok(entries)
}
