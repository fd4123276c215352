//! High-level build orchestration

use super::config::BuildConfig;
use crate::descriptor::PackageDescriptor;
use crate::environment::BuildEnv;
use crate::packaging::PackageArtifact;
use pkgdesc_errors::Error;
use pkgdesc_events::{AppEvent, EventEmitter, PackageEvent};
use pkgdesc_types::LifecyclePhase;
use std::time::{Duration, Instant};

/// Outcome of a full build
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub artifact: PackageArtifact,
    /// Wall time from prepare to the end of clean
    pub duration: Duration,
}

/// Package builder
#[derive(Clone, Debug, Default)]
pub struct Builder {
    /// Build configuration
    config: BuildConfig,
}

impl Builder {
    /// Create new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create builder with configuration
    #[must_use]
    pub fn with_config(config: BuildConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run prepare, build and install, package the recorded files, then clean
    ///
    /// Clean runs whether or not the earlier steps succeeded, unless the
    /// configuration keeps the build root.
    ///
    /// # Errors
    ///
    /// Returns the first phase or packaging error. If those succeed but the
    /// clean phase fails, the clean error is returned.
    pub async fn build(
        &self,
        descriptor: &PackageDescriptor,
        env: &mut BuildEnv,
    ) -> Result<BuildResult, Error> {
        let started = Instant::now();
        let package = descriptor.describe().to_string();
        let operation = format!("Building {package}");
        env.emit_operation_started(&operation);

        let outcome = Self::run_sequence(descriptor, env).await;

        let outcome = if self.config.keep_build_root {
            env.emit_debug(format!(
                "keeping build root {}",
                env.build_root().display()
            ));
            outcome
        } else {
            let cleaned = descriptor.clean(env).await;
            match (outcome, cleaned) {
                (Ok(artifact), Ok(())) => Ok(artifact),
                (Ok(_), Err(clean_err)) => Err(clean_err),
                (Err(e), Ok(())) => Err(e),
                (Err(e), Err(clean_err)) => {
                    env.emit_warning(format!("clean after failed build also failed: {clean_err}"));
                    Err(e)
                }
            }
        };

        match outcome {
            Ok(artifact) => {
                let duration = started.elapsed();
                env.emit(AppEvent::Package(PackageEvent::BuildFinished {
                    package,
                    path: artifact.path.clone(),
                    duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                }));
                env.emit_operation_completed(&operation, true);
                Ok(BuildResult { artifact, duration })
            }
            Err(e) => {
                env.emit_operation_failed(&operation, e.to_string());
                Err(e)
            }
        }
    }

    async fn run_sequence(
        descriptor: &PackageDescriptor,
        env: &mut BuildEnv,
    ) -> Result<PackageArtifact, Error> {
        for phase in LifecyclePhase::SEQUENCE {
            descriptor.run_phase(phase, env).await?;
        }
        let manifest = env.take_manifest();
        descriptor.package_with_manifest(&manifest, env).await
    }
}
