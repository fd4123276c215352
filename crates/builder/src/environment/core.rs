//! Core `BuildEnv` struct and construction

use crate::runner::{ProcessRunner, ShellRunner};
use pkgdesc_errors::{ConfigError, Error};
use pkgdesc_events::{EventEmitter, EventSender};
use pkgdesc_manifest::FileManifest;
use pkgdesc_types::{LifecyclePhase, PackageMetadata};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default zstd level for package artifacts
const DEFAULT_ZSTD_LEVEL: i32 = 9;

/// Build environment for a single package build
#[derive(Clone)]
pub struct BuildEnv {
    /// Scratch install root, removed by the clean phase
    pub(crate) build_root: PathBuf,
    /// Directory the source archive is unpacked into
    pub(crate) work_dir: PathBuf,
    pub(crate) source_archive: Option<PathBuf>,
    /// Where package artifacts are written
    pub(crate) output_dir: PathBuf,
    /// User variables exported to every phase action
    pub(crate) vars: BTreeMap<String, String>,
    pub(crate) completed: BTreeSet<LifecyclePhase>,
    pub(crate) failed: Option<LifecyclePhase>,
    pub(crate) manifest: FileManifest,
    pub(crate) runner: Arc<dyn ProcessRunner>,
    pub(crate) event_sender: Option<EventSender>,
    pub(crate) zstd_level: i32,
}

/// Absolute form of `path`, or `path` itself if the current directory is unavailable
fn anchored(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        std::path::absolute(&path).unwrap_or(path)
    }
}

impl BuildEnv {
    /// Create a build environment running actions through `/bin/sh`.
    ///
    /// Artifacts go to `work_dir` until an output directory is set. Relative
    /// paths are anchored at the current directory, since actions run from
    /// the unpacked source tree.
    pub fn new(build_root: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = anchored(work_dir.into());
        Self {
            build_root: anchored(build_root.into()),
            output_dir: work_dir.clone(),
            work_dir,
            source_archive: None,
            vars: BTreeMap::new(),
            completed: BTreeSet::new(),
            failed: None,
            manifest: FileManifest::new(),
            runner: Arc::new(ShellRunner::default()),
            event_sender: None,
            zstd_level: DEFAULT_ZSTD_LEVEL,
        }
    }

    /// Create a build environment whose build root comes from the process
    /// environment variable `var`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EnvVarNotFound` if `var` is unset or empty.
    pub fn from_env(var: &str, work_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        match std::env::var_os(var) {
            Some(value) if !value.is_empty() => Ok(Self::new(PathBuf::from(value), work_dir)),
            _ => Err(ConfigError::EnvVarNotFound {
                var: var.to_string(),
            }
            .into()),
        }
    }

    #[must_use]
    pub fn with_source_archive(mut self, archive: impl Into<PathBuf>) -> Self {
        self.source_archive = Some(anchored(archive.into()));
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = anchored(output_dir.into());
        self
    }

    /// Replace the process runner used for phase actions
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Export an extra variable to every phase action
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_zstd_level(mut self, level: i32) -> Self {
        self.zstd_level = level;
        self
    }

    #[must_use]
    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    #[must_use]
    pub fn source_archive(&self) -> Option<&Path> {
        self.source_archive.as_deref()
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    #[must_use]
    pub fn zstd_level(&self) -> i32 {
        self.zstd_level
    }

    /// Unpacked source tree: `<work_dir>/<name>-<version>`
    #[must_use]
    pub fn source_dir(&self, metadata: &PackageMetadata) -> PathBuf {
        self.work_dir.join(metadata.source_dir_name())
    }

    #[must_use]
    pub fn has_completed(&self, phase: LifecyclePhase) -> bool {
        self.completed.contains(&phase)
    }

    /// Phases completed since the last clean, in execution order
    pub fn completed_phases(&self) -> impl Iterator<Item = LifecyclePhase> + '_ {
        self.completed.iter().copied()
    }

    /// The phase that halted the sequence, if any
    #[must_use]
    pub fn failed_phase(&self) -> Option<LifecyclePhase> {
        self.failed
    }

    /// Install manifest recorded by the last successful install phase
    #[must_use]
    pub fn manifest(&self) -> &FileManifest {
        &self.manifest
    }

    /// Move the install manifest out, leaving an empty one behind
    pub fn take_manifest(&mut self) -> FileManifest {
        std::mem::take(&mut self.manifest)
    }

    pub(crate) fn set_manifest(&mut self, manifest: FileManifest) {
        self.manifest = manifest;
    }

    pub(crate) fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    /// Record `phase` as completed.
    ///
    /// Phases after it are invalidated, so re-running `prepare` requires
    /// `build` and `install` to run again.
    pub(crate) fn mark_completed(&mut self, phase: LifecyclePhase) {
        self.completed.retain(|done| *done < phase);
        self.completed.insert(phase);
        if phase < LifecyclePhase::Install {
            self.manifest = FileManifest::new();
        }
    }

    pub(crate) fn mark_failed(&mut self, phase: LifecyclePhase) {
        self.failed = Some(phase);
    }

    /// Forget all phase progress and the install manifest
    pub(crate) fn reset(&mut self) {
        self.completed.clear();
        self.failed = None;
        self.manifest = FileManifest::new();
    }
}

impl fmt::Debug for BuildEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildEnv")
            .field("build_root", &self.build_root)
            .field("work_dir", &self.work_dir)
            .field("source_archive", &self.source_archive)
            .field("output_dir", &self.output_dir)
            .field("vars", &self.vars)
            .field("completed", &self.completed)
            .field("failed", &self.failed)
            .field("manifest", &self.manifest.len())
            .field("zstd_level", &self.zstd_level)
            .finish_non_exhaustive()
    }
}

impl EventEmitter for BuildEnv {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
