//! Test doubles and fixtures

use async_trait::async_trait;
use pkgdesc_builder::{
    BuildEnv, CommandInvocation, LifecyclePhase, PackageDescriptor, PackageMetadata, PhaseActions,
    ProcessOutput, ProcessRunner, BUILD_ROOT_VAR, MANIFEST_FILE_VAR, SOURCE_DIR_VAR,
};
use pkgdesc_errors::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// In-memory runner that imitates what real phase actions do on disk.
///
/// - prepare creates the unpacked source directory
/// - install creates `installed` under the build root and records them
/// - clean does nothing; the phase runner removes the build root itself
#[derive(Debug, Default)]
pub struct FakeRunner {
    pub calls: Mutex<Vec<LifecyclePhase>>,
    pub scripts: Mutex<Vec<String>>,
    pub fail_on: Option<LifecyclePhase>,
    pub installed: Vec<String>,
    pub skip_unpack: bool,
    pub skip_record: bool,
}

impl FakeRunner {
    pub fn installing(paths: &[&str]) -> Self {
        Self {
            installed: paths.iter().map(|p| (*p).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, phase: LifecyclePhase) -> Self {
        self.fail_on = Some(phase);
        self
    }

    pub fn calls(&self) -> Vec<LifecyclePhase> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<ProcessOutput, Error> {
        self.calls.lock().unwrap().push(invocation.phase);
        self.scripts.lock().unwrap().push(invocation.script.clone());

        if self.fail_on == Some(invocation.phase) {
            return Ok(ProcessOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: format!("{} exploded", invocation.phase),
            });
        }

        match invocation.phase {
            LifecyclePhase::Prepare if !self.skip_unpack => {
                std::fs::create_dir_all(&invocation.env[SOURCE_DIR_VAR])?;
            }
            LifecyclePhase::Install => {
                let root = PathBuf::from(&invocation.env[BUILD_ROOT_VAR]);
                for path in &self.installed {
                    let target = root.join(path.trim_start_matches('/'));
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&target, format!("contents of {path}\n"))?;
                }
                if !self.skip_record {
                    let record = self.installed.join("\n");
                    std::fs::write(&invocation.env[MANIFEST_FILE_VAR], record)?;
                }
            }
            _ => {}
        }

        Ok(ProcessOutput::with_code(0))
    }
}

/// Fully populated metadata for the NagAconda package
pub fn nagaconda_metadata() -> PackageMetadata {
    PackageMetadata::new("NagAconda", "0.1.4", "1")
        .with_vendor("Shaun Thomas")
        .with_url("http://www.bonesmoses.org/NagAconda")
        .with_license("BSD")
        .with_summary("Python Nagios plugin library")
        .with_description("NagAconda is a Python Nagios wrapper.")
}

pub fn nagaconda() -> PackageDescriptor {
    PackageDescriptor::new(nagaconda_metadata(), PhaseActions::setuptools()).unwrap()
}

pub const THREE_FILES: [&str; 3] = [
    "/usr/lib/python3/site-packages/NagAconda/__init__.py",
    "/usr/lib/python3/site-packages/NagAconda/plugin.py",
    "/usr/share/doc/NagAconda/README",
];

/// Scratch directories for one build
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    pub fn build_root(&self) -> PathBuf {
        self.temp.path().join("buildroot")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.temp.path().join("out")
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn env_with(&self, runner: Arc<FakeRunner>) -> BuildEnv {
        BuildEnv::new(self.build_root(), self.work_dir())
            .with_output_dir(self.output_dir())
            .with_source_archive(self.path().join("NagAconda-0.1.4.tar.gz"))
            .with_runner(runner)
    }
}
