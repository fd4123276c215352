//! Build environment management
//!
//! A [`BuildEnv`] is the explicit context every phase runs against. It owns
//! the scratch build root, the unpack directory, the variables exported to
//! phase actions, the phase ledger and the install manifest.

mod core;
mod variables;

pub use self::core::BuildEnv;
pub use variables::{
    BUILD_ROOT_VAR, MANIFEST_FILE_VAR, NAME_VAR, RELEASE_VAR, RPM_BUILD_ROOT_VAR,
    SOURCE_ARCHIVE_VAR, SOURCE_DIR_VAR, VERSION_VAR, WORK_DIR_VAR,
};
