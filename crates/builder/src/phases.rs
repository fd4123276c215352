//! Lifecycle phase execution

use crate::descriptor::PackageDescriptor;
use crate::environment::BuildEnv;
use crate::runner::{CommandInvocation, ProcessOutput};
use crate::template;
use pkgdesc_errors::{BuildError, Error};
use pkgdesc_events::{AppEvent, EventEmitter, PhaseEvent};
use pkgdesc_manifest::FileManifest;
use pkgdesc_types::LifecyclePhase;
use std::path::{Path, PathBuf};
use std::time::Instant;

impl PackageDescriptor {
    /// Run the action bound to `phase` against `env`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the sequence was halted by an earlier failure (`SequenceHalted`)
    /// - the preceding phase has not completed (`PhaseOutOfOrder`)
    /// - the action template is invalid or the process cannot be spawned
    /// - the action exits non-zero (`PhaseExecutionFailure`)
    /// - the phase post-condition does not hold
    pub async fn run_phase(&self, phase: LifecyclePhase, env: &mut BuildEnv) -> Result<(), Error> {
        if phase == LifecyclePhase::Clean {
            return self.clean(env).await;
        }

        if let Err(e) = check_sequence(phase, env) {
            self.emit_failed(env, phase, &e);
            return Err(e);
        }

        let started = Instant::now();
        match self.execute(phase, env).await {
            Ok(()) => {
                env.mark_completed(phase);
                env.emit(AppEvent::Phase(PhaseEvent::Completed {
                    package: self.metadata.to_string(),
                    phase,
                    duration_ms: elapsed_ms(started),
                }));
                Ok(())
            }
            Err(e) => {
                env.mark_failed(phase);
                self.emit_failed(env, phase, &e);
                Err(e)
            }
        }
    }

    /// Run the clean action, then remove the build root and reset `env`.
    ///
    /// The build root is removed even when the action fails. Cleaning an
    /// environment that is already clean succeeds.
    ///
    /// # Errors
    ///
    /// Returns the action failure, or an error if the build root cannot be
    /// removed.
    pub async fn clean(&self, env: &mut BuildEnv) -> Result<(), Error> {
        let phase = LifecyclePhase::Clean;
        let started = Instant::now();

        let working_dir = clean_working_dir(&env.source_dir(&self.metadata), env.work_dir()).await;
        let action = self.spawn(phase, working_dir, env).await.map(|_| ());
        let removal = remove_build_root(env).await;
        env.reset();

        match action.and(removal) {
            Ok(()) => {
                env.emit(AppEvent::Phase(PhaseEvent::Completed {
                    package: self.metadata.to_string(),
                    phase,
                    duration_ms: elapsed_ms(started),
                }));
                Ok(())
            }
            Err(e) => {
                self.emit_failed(env, phase, &e);
                Err(e)
            }
        }
    }

    async fn execute(&self, phase: LifecyclePhase, env: &mut BuildEnv) -> Result<(), Error> {
        let source_dir = env.source_dir(&self.metadata);

        let working_dir = match phase {
            LifecyclePhase::Prepare => {
                create_dir(env.build_root()).await?;
                create_dir(env.work_dir()).await?;
                env.work_dir().to_path_buf()
            }
            LifecyclePhase::Build => {
                check_build_root(env.build_root()).await?;
                source_dir.clone()
            }
            LifecyclePhase::Install | LifecyclePhase::Clean => source_dir.clone(),
        };

        self.spawn(phase, working_dir, env).await?;

        match phase {
            LifecyclePhase::Prepare => {
                if !is_dir(&source_dir).await {
                    return Err(BuildError::SourceLayoutInvalid {
                        expected: source_dir.display().to_string(),
                    }
                    .into());
                }
            }
            LifecyclePhase::Install => {
                let record = source_dir.join(&self.manifest_file);
                let manifest = FileManifest::from_file(&record).await?;
                env.emit(AppEvent::Phase(PhaseEvent::ManifestRecorded {
                    package: self.metadata.to_string(),
                    files: manifest.len(),
                }));
                env.set_manifest(manifest);
            }
            LifecyclePhase::Build | LifecyclePhase::Clean => {}
        }

        Ok(())
    }

    /// Render and run the action for `phase`, failing on a non-zero exit
    async fn spawn(
        &self,
        phase: LifecyclePhase,
        working_dir: PathBuf,
        env: &BuildEnv,
    ) -> Result<ProcessOutput, Error> {
        let vars = env.invocation_vars(&self.metadata, &self.manifest_file, &self.variables);
        let script = template::render(phase, self.actions.action(phase), &self.metadata, &vars)?;

        // An empty action is a no-op
        if script.trim().is_empty() {
            return Ok(ProcessOutput::with_code(0));
        }

        env.emit(AppEvent::Phase(PhaseEvent::Started {
            package: self.metadata.to_string(),
            phase,
            command: script.clone(),
            working_dir: working_dir.clone(),
        }));

        let invocation = CommandInvocation {
            phase,
            script,
            working_dir,
            env: vars,
        };
        let output = env.runner().run(&invocation).await?;

        let combined = output.combined();
        if !combined.is_empty() {
            env.emit_debug(format!("{phase} output:\n{combined}"));
        }

        if !output.success() {
            return Err(BuildError::PhaseExecutionFailure {
                phase: phase.to_string(),
                exit_code: output.exit_code,
                output: combined,
            }
            .into());
        }

        Ok(output)
    }

    fn emit_failed(&self, env: &BuildEnv, phase: LifecyclePhase, error: &Error) {
        let exit_code = match error.as_build() {
            Some(BuildError::PhaseExecutionFailure { exit_code, .. }) => *exit_code,
            _ => None,
        };
        env.emit(AppEvent::Phase(PhaseEvent::Failed {
            package: self.metadata.to_string(),
            phase,
            exit_code,
            message: error.to_string(),
        }));
    }
}

/// Refuse phases that would break the prepare, build, install ordering
fn check_sequence(phase: LifecyclePhase, env: &BuildEnv) -> Result<(), Error> {
    if let Some(failed) = env.failed_phase() {
        return Err(BuildError::SequenceHalted {
            phase: phase.to_string(),
            failed: failed.to_string(),
        }
        .into());
    }

    if let Some(required) = phase.predecessor() {
        if !env.has_completed(required) {
            return Err(BuildError::PhaseOutOfOrder {
                phase: phase.to_string(),
                required: required.to_string(),
            }
            .into());
        }
    }

    Ok(())
}

async fn create_dir(path: &Path) -> Result<(), Error> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|m| m.is_dir())
}

/// The build root must be an existing, writable directory
async fn check_build_root(path: &Path) -> Result<(), Error> {
    let unavailable = |reason: String| -> Error {
        BuildError::BuildRootUnavailable {
            path: path.display().to_string(),
            reason,
        }
        .into()
    };

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| unavailable(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(unavailable("not a directory".to_string()));
    }
    if metadata.permissions().readonly() {
        return Err(unavailable("directory is read-only".to_string()));
    }
    Ok(())
}

async fn clean_working_dir(source_dir: &Path, work_dir: &Path) -> PathBuf {
    for candidate in [source_dir, work_dir] {
        if is_dir(candidate).await {
            return candidate.to_path_buf();
        }
    }
    std::env::temp_dir()
}

async fn remove_build_root(env: &BuildEnv) -> Result<(), Error> {
    let path = env.build_root();
    let existed = match tokio::fs::remove_dir_all(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(Error::io_with_path(&e, path)),
    };
    env.emit(AppEvent::Phase(PhaseEvent::BuildRootRemoved {
        path: path.to_path_buf(),
        existed,
    }));
    Ok(())
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
