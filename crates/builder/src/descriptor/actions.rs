//! Shell actions bound to lifecycle phases

use pkgdesc_types::LifecyclePhase;
use serde::{Deserialize, Serialize};

/// One shell action template per lifecycle phase.
///
/// Missing entries in a descriptor file fall back to the setuptools
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseActions {
    #[serde(alias = "prep")]
    pub prepare: String,
    pub build: String,
    pub install: String,
    pub clean: String,
}

impl PhaseActions {
    /// Actions for a Python distutils/setuptools source package
    #[must_use]
    pub fn setuptools() -> Self {
        Self {
            prepare: r#"tar -xzf "${SOURCE_ARCHIVE}" -C "${WORK_DIR}""#.to_string(),
            build: "python setup.py build".to_string(),
            install: concat!(
                "python setup.py install --single-version-externally-managed -O1 ",
                r#"--root="${BUILD_ROOT}" --record="${MANIFEST_FILE}""#
            )
            .to_string(),
            clean: r#"rm -rf "${BUILD_ROOT}""#.to_string(),
        }
    }

    /// Action template for `phase`
    #[must_use]
    pub fn action(&self, phase: LifecyclePhase) -> &str {
        match phase {
            LifecyclePhase::Prepare => &self.prepare,
            LifecyclePhase::Build => &self.build,
            LifecyclePhase::Install => &self.install,
            LifecyclePhase::Clean => &self.clean,
        }
    }

    #[must_use]
    pub fn with_action(mut self, phase: LifecyclePhase, action: impl Into<String>) -> Self {
        let slot = match phase {
            LifecyclePhase::Prepare => &mut self.prepare,
            LifecyclePhase::Build => &mut self.build,
            LifecyclePhase::Install => &mut self.install,
            LifecyclePhase::Clean => &mut self.clean,
        };
        *slot = action.into();
        self
    }
}

impl Default for PhaseActions {
    fn default() -> Self {
        Self::setuptools()
    }
}
