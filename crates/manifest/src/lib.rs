#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Manifest handling for pkgdesc
//!
//! Two manifests live here:
//! - [`FileManifest`], the install record written by the install phase
//!   (plain text, one installed path per line)
//! - [`PackageManifest`], the `manifest.toml` embedded at the top of every
//!   produced package artifact

mod files;
mod package;

pub use files::{FileManifest, DEFAULT_MANIFEST_FILE};
pub use package::{PackageManifest, MANIFEST_ENTRY_NAME, PACKAGE_FORMAT_VERSION};
