//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use pkgdesc_types::{ColorChoice, LifecyclePhase};
use std::path::PathBuf;

/// pkgdesc - build packages from declarative descriptors
#[derive(Parser)]
#[command(name = "pkgdesc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build packages from declarative descriptors")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable JSON debug logging to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Descriptor and directories shared by the phase-running commands
#[derive(Args)]
pub struct TargetArgs {
    /// Path to the package descriptor (.toml)
    pub descriptor: PathBuf,

    /// Directory the source archive is unpacked into
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the package metadata of a descriptor
    Describe {
        /// Path to the package descriptor (.toml)
        descriptor: PathBuf,
    },

    /// Run the lifecycle through one phase (clean runs on its own)
    Run {
        #[command(flatten)]
        target: TargetArgs,

        /// Last phase to run
        #[arg(value_enum)]
        phase: LifecyclePhase,

        /// Source archive consumed by the prepare phase
        #[arg(short, long, value_name = "ARCHIVE")]
        source: Option<PathBuf>,
    },

    /// Run prepare, build and install, package the result, then clean
    Build {
        #[command(flatten)]
        target: TargetArgs,

        /// Source archive consumed by the prepare phase
        #[arg(short, long, value_name = "ARCHIVE")]
        source: Option<PathBuf>,

        /// Output directory for the package artifact
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Leave the build root in place after the build
        #[arg(long)]
        keep_build_root: bool,
    },

    /// Run the clean action and remove the build root
    Clean {
        #[command(flatten)]
        target: TargetArgs,
    },
}

impl Commands {
    /// Short command name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Describe { .. } => "describe",
            Self::Run { .. } => "run",
            Self::Build { .. } => "build",
            Self::Clean { .. } => "clean",
        }
    }
}
