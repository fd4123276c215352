//! Deterministic TAR archive creation for reproducible packages

use pkgdesc_errors::{BuildError, Error};
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Default deterministic timestamp (Unix epoch) for reproducible builds
const DETERMINISTIC_TIMESTAMP: u64 = 0;

/// Environment variable for `SOURCE_DATE_EPOCH` (standard for reproducible builds)
const SOURCE_DATE_EPOCH_VAR: &str = "SOURCE_DATE_EPOCH";

/// One file system object to place in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive, relative
    pub archive_path: PathBuf,
    /// Location on disk, under the build root
    pub source: PathBuf,
}

/// Write a tar archive holding `manifest_toml` as its first entry followed
/// by `entries` in the given order
///
/// # Errors
///
/// Returns an error if file I/O operations fail or tar creation fails.
pub async fn create_package_tar(
    manifest_name: &str,
    manifest_toml: &str,
    entries: &[ArchiveEntry],
    tar_path: &Path,
    timestamp: u64,
) -> Result<(), Error> {
    use tar::Builder;

    let file = File::create(tar_path)
        .await
        .map_err(|e| Error::io_with_path(&e, tar_path))?;
    let file = file.into_std().await;
    let manifest_name = manifest_name.to_string();
    let manifest_bytes = manifest_toml.as_bytes().to_vec();
    let entries = entries.to_vec();

    tokio::task::spawn_blocking(move || -> Result<(), Error> {
        let mut tar_builder = Builder::new(file);
        tar_builder.follow_symlinks(false);

        let mut header = normalized_header(
            tar::EntryType::Regular,
            manifest_bytes.len() as u64,
            0o644,
            timestamp,
        )?;
        tar_builder.append_data(&mut header, &manifest_name, manifest_bytes.as_slice())?;

        for entry in &entries {
            append_entry(&mut tar_builder, entry, timestamp)?;
        }

        tar_builder.finish()?;
        Ok(())
    })
    .await
    .map_err(|e| BuildError::PackagingFailed {
        message: format!("tar creation task failed: {e}"),
    })??;

    Ok(())
}

/// Add a single manifest entry without descending into directories
fn append_entry(
    tar_builder: &mut tar::Builder<std::fs::File>,
    entry: &ArchiveEntry,
    timestamp: u64,
) -> Result<(), Error> {
    let metadata = std::fs::symlink_metadata(&entry.source)
        .map_err(|e| Error::io_with_path(&e, &entry.source))?;

    if metadata.is_dir() {
        let mut header = normalized_header(tar::EntryType::Directory, 0, 0o755, timestamp)?;
        let dir_path = format!("{}/", entry.archive_path.display());
        tar_builder.append_data(&mut header, &dir_path, std::io::empty())?;
    } else if metadata.is_file() {
        let mut file = std::fs::File::open(&entry.source)
            .map_err(|e| Error::io_with_path(&e, &entry.source))?;
        let mut header = normalized_header(
            tar::EntryType::Regular,
            metadata.len(),
            normalize_file_permissions(&metadata),
            timestamp,
        )?;
        tar_builder.append_data(&mut header, &entry.archive_path, &mut file)?;
    } else if metadata.is_symlink() {
        let target = std::fs::read_link(&entry.source)?;
        let mut header = normalized_header(tar::EntryType::Symlink, 0, 0o777, timestamp)?;
        tar_builder.append_link(&mut header, &entry.archive_path, &target)?;
    } else {
        return Err(BuildError::ManifestPathInvalid {
            path: entry.archive_path.display().to_string(),
            reason: "not a regular file, directory or symlink".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Header with normalized ownership, timestamp and device numbers
fn normalized_header(
    entry_type: tar::EntryType,
    size: u64,
    mode: u32,
    timestamp: u64,
) -> Result<tar::Header, Error> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_size(size);
    header.set_mode(mode);
    header.set_mtime(timestamp);
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("root")?;
    header.set_groupname("root")?;
    header.set_device_major(0)?;
    header.set_device_minor(0)?;
    header.set_cksum();
    Ok(header)
}

/// Get deterministic timestamp for reproducible builds
/// Uses `SOURCE_DATE_EPOCH` if set, otherwise uses epoch (0)
#[must_use]
pub fn get_deterministic_timestamp() -> u64 {
    std::env::var(SOURCE_DATE_EPOCH_VAR)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DETERMINISTIC_TIMESTAMP)
}

/// Executable files keep an execute bit, everything else is 0644
fn normalize_file_permissions(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    if metadata.permissions().mode() & 0o111 != 0 {
        0o755
    } else {
        0o644
    }
}
