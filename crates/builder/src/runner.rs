//! Process execution for phase actions
//!
//! Phases never spawn processes directly; they hand a [`CommandInvocation`]
//! to a [`ProcessRunner`]. [`ShellRunner`] is the production implementation.

use async_trait::async_trait;
use pkgdesc_errors::{BuildError, Error};
use pkgdesc_types::LifecyclePhase;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::process::Command;

/// A fully rendered phase action ready to run
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub phase: LifecyclePhase,
    /// Rendered shell script
    pub script: String,
    pub working_dir: PathBuf,
    /// Variables exported to the child process
    pub env: BTreeMap<String, String>,
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Output for a process that exited with `code` and printed nothing
    #[must_use]
    pub fn with_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr, trimmed
    #[must_use]
    pub fn combined(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{out}\n{err}"),
        }
    }
}

/// Capability to run a phase action
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the invocation to completion and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process could not be run at all. A
    /// non-zero exit is reported through `ProcessOutput::exit_code`.
    async fn run(&self, invocation: &CommandInvocation) -> Result<ProcessOutput, Error>;
}

/// Runs actions with `<shell> -c <script>`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    #[must_use]
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("/bin/sh")
    }
}

#[async_trait]
impl ProcessRunner for ShellRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<ProcessOutput, Error> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&invocation.script)
            .current_dir(&invocation.working_dir)
            .envs(&invocation.env)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BuildError::SpawnFailed {
                program: self.shell.clone(),
                message: format!("{} (in {})", e, invocation.working_dir.display()),
            })?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
