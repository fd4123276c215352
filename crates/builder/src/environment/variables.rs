//! Variables exported to phase actions

use super::BuildEnv;
use pkgdesc_types::PackageMetadata;
use std::collections::BTreeMap;

pub const BUILD_ROOT_VAR: &str = "BUILD_ROOT";
/// Alias of `BUILD_ROOT` kept for actions written against rpm conventions
pub const RPM_BUILD_ROOT_VAR: &str = "RPM_BUILD_ROOT";
pub const WORK_DIR_VAR: &str = "WORK_DIR";
pub const SOURCE_DIR_VAR: &str = "SOURCE_DIR";
pub const SOURCE_ARCHIVE_VAR: &str = "SOURCE_ARCHIVE";
pub const MANIFEST_FILE_VAR: &str = "MANIFEST_FILE";
pub const NAME_VAR: &str = "NAME";
pub const VERSION_VAR: &str = "VERSION";
pub const RELEASE_VAR: &str = "RELEASE";

impl BuildEnv {
    /// Compute the variable map for one phase invocation.
    ///
    /// Layering, lowest precedence first: descriptor variables, variables set
    /// on the environment, built-in variables.
    #[must_use]
    pub fn invocation_vars(
        &self,
        metadata: &PackageMetadata,
        manifest_file: &str,
        descriptor_vars: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut vars = descriptor_vars.clone();
        vars.extend(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())));

        let source_dir = self.source_dir(metadata);
        let build_root = self.build_root.display().to_string();

        vars.insert(BUILD_ROOT_VAR.to_string(), build_root.clone());
        vars.insert(RPM_BUILD_ROOT_VAR.to_string(), build_root);
        vars.insert(
            WORK_DIR_VAR.to_string(),
            self.work_dir.display().to_string(),
        );
        vars.insert(
            SOURCE_DIR_VAR.to_string(),
            source_dir.display().to_string(),
        );
        vars.insert(
            MANIFEST_FILE_VAR.to_string(),
            source_dir.join(manifest_file).display().to_string(),
        );
        if let Some(archive) = &self.source_archive {
            vars.insert(
                SOURCE_ARCHIVE_VAR.to_string(),
                archive.display().to_string(),
            );
        }
        vars.insert(NAME_VAR.to_string(), metadata.name.clone());
        vars.insert(VERSION_VAR.to_string(), metadata.version.clone());
        vars.insert(RELEASE_VAR.to_string(), metadata.release.clone());
        vars
    }
}
