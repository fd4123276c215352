#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]
//! Package descriptors and lifecycle phase execution for pkgdesc
//!
//! This crate runs the prepare, build, install and clean actions of a
//! [`PackageDescriptor`] against an explicit [`BuildEnv`], and packages the
//! files recorded by the install phase into a deterministic `.tar.zst`.

mod core;
mod descriptor;
mod environment;
mod packaging;
mod phases;
mod runner;
mod template;

pub use crate::core::builder::{BuildResult, Builder};
pub use crate::core::config::BuildConfig;
pub use descriptor::{PackageDescriptor, PhaseActions};
pub use environment::{
    BuildEnv, BUILD_ROOT_VAR, MANIFEST_FILE_VAR, NAME_VAR, RELEASE_VAR, RPM_BUILD_ROOT_VAR,
    SOURCE_ARCHIVE_VAR, SOURCE_DIR_VAR, VERSION_VAR, WORK_DIR_VAR,
};
pub use packaging::archive::get_deterministic_timestamp;
pub use packaging::{PackageArtifact, ARTIFACT_EXTENSION};
pub use runner::{CommandInvocation, ProcessOutput, ProcessRunner, ShellRunner};
pub use template::render;

// Re-exported so callers need only this crate for the common types
pub use pkgdesc_manifest::FileManifest;
pub use pkgdesc_types::{LifecyclePhase, PackageMetadata};
