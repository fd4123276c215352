//! Build configuration for package building

use crate::environment::BuildEnv;
use crate::runner::ShellRunner;
use pkgdesc_errors::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Package builder configuration
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Skip the clean phase after a build
    pub keep_build_root: bool,
    /// Zstandard level for artifacts (1-22)
    pub compression_level: i32,
    /// Shell used to run phase actions
    pub shell: String,
    /// Artifact directory; `None` writes into the work directory
    pub output_dir: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            keep_build_root: false,
            compression_level: 9,
            shell: "/bin/sh".to_string(),
            output_dir: None,
        }
    }
}

impl BuildConfig {
    /// Derive builder settings from the application configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured compression level is invalid.
    pub fn from_config(config: &pkgdesc_config::Config) -> Result<Self, Error> {
        Ok(Self {
            keep_build_root: config.build.keep_build_root,
            compression_level: config.build.zstd_level()?,
            shell: config.build.shell.clone(),
            output_dir: config.build.output_dir.clone(),
        })
    }

    #[must_use]
    pub fn with_keep_build_root(mut self, keep: bool) -> Self {
        self.keep_build_root = keep;
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    /// Build environment wired to this configuration's shell, output
    /// directory and compression level
    #[must_use]
    pub fn environment(&self, build_root: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> BuildEnv {
        let mut env = BuildEnv::new(build_root, work_dir)
            .with_runner(Arc::new(ShellRunner::new(self.shell.clone())))
            .with_zstd_level(self.compression_level);
        if let Some(output_dir) = &self.output_dir {
            env = env.with_output_dir(output_dir.clone());
        }
        env
    }
}
