//! pkgdesc - build packages from declarative descriptors
//!
//! Loads a package descriptor, runs its lifecycle phases against a build
//! root taken from the environment and writes a `.tar.zst` package.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs, TargetArgs};
use crate::display::{BuildReport, CommandOutcome, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use pkgdesc_builder::{BuildConfig, BuildEnv, Builder, LifecyclePhase, PackageDescriptor};
use pkgdesc_config::Config;
use pkgdesc_events::{EventReceiver, EventSender};
use pkgdesc_types::{ColorChoice, OutputFormat};
use std::path::{Path, PathBuf};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration precedence: file (or defaults), environment, CLI flags
    let config = match load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let json_mode = cli.global.json || config.general.default_output == OutputFormat::Json;
    init_tracing(json_mode, cli.global.debug, &config.log_dir());

    if let Err(e) = run(cli, config, json_mode).await {
        error!(code = ?e.code(), "Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);
    config.validate()?;
    Ok(config)
}

/// Main application logic
async fn run(cli: Cli, config: Config, json_mode: bool) -> Result<(), CliError> {
    info!(command = cli.command.name(), "Starting pkgdesc v{}", env!("CARGO_PKG_VERSION"));

    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
    };

    let (event_sender, event_receiver) = pkgdesc_events::channel();
    let mut event_handler = EventHandler::new(colors_enabled, !json_mode, cli.global.debug);

    let result = execute_command_with_events(
        cli.command,
        config,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    OutputRenderer::new(json_mode, colors_enabled).render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    config: Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandOutcome, CliError> {
    let mut command_future = Box::pin(execute_command(command, config, event_sender));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    config: Config,
    event_sender: EventSender,
) -> Result<CommandOutcome, CliError> {
    match command {
        Commands::Describe { descriptor } => {
            let descriptor = PackageDescriptor::from_file(&descriptor).await?;
            Ok(CommandOutcome::Described {
                package: descriptor.describe().clone(),
            })
        }

        Commands::Run {
            target,
            phase,
            source,
        } => {
            let descriptor = PackageDescriptor::from_file(&target.descriptor).await?;
            let mut env = build_env(&config, &target, source.as_deref(), event_sender)?;

            let phases: Vec<LifecyclePhase> = if phase == LifecyclePhase::Clean {
                vec![LifecyclePhase::Clean]
            } else {
                LifecyclePhase::SEQUENCE
                    .into_iter()
                    .take_while(|p| *p <= phase)
                    .collect()
            };
            for phase in &phases {
                descriptor.run_phase(*phase, &mut env).await?;
            }

            Ok(CommandOutcome::PhasesRun {
                package: descriptor.describe().to_string(),
                phases,
                build_root: env.build_root().to_path_buf(),
                installed_files: env.manifest().len(),
            })
        }

        Commands::Build { target, source, .. } => {
            let descriptor = PackageDescriptor::from_file(&target.descriptor).await?;
            let mut env = build_env(&config, &target, source.as_deref(), event_sender)?;

            let builder = Builder::with_config(BuildConfig::from_config(&config)?);
            let result = builder.build(&descriptor, &mut env).await?;

            Ok(CommandOutcome::Built(BuildReport {
                package: descriptor.describe().to_string(),
                path: result.artifact.path,
                hash: result.artifact.hash.to_hex(),
                size: result.artifact.size,
                file_count: result.artifact.file_count,
                duration_ms: u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
            }))
        }

        Commands::Clean { target } => {
            let descriptor = PackageDescriptor::from_file(&target.descriptor).await?;
            let mut env = build_env(&config, &target, None, event_sender)?;
            descriptor.clean(&mut env).await?;

            Ok(CommandOutcome::Cleaned {
                package: descriptor.describe().to_string(),
                build_root: env.build_root().to_path_buf(),
            })
        }
    }
}

/// Assemble the build environment from configuration and command arguments
fn build_env(
    config: &Config,
    target: &TargetArgs,
    source: Option<&Path>,
    event_sender: EventSender,
) -> Result<BuildEnv, CliError> {
    let build_root = absolute(config.build_root()?)?;
    let work_dir = match (&target.work_dir, &config.paths.work_dir) {
        (Some(dir), _) | (None, Some(dir)) => dir.clone(),
        (None, None) => std::env::current_dir()?,
    };

    let build_config = BuildConfig::from_config(config)?.with_output_dir(config.output_dir());
    let mut env = build_config
        .environment(build_root, absolute(work_dir)?)
        .with_event_sender(event_sender);

    if let Some(source) = source {
        if !source.is_file() {
            return Err(CliError::InvalidArguments(format!(
                "source archive not found: {}",
                source.display()
            )));
        }
        env = env.with_source_archive(absolute(source.to_path_buf())?);
    }

    Ok(env)
}

/// Phase actions run in other directories, so relative paths are anchored here
fn absolute(path: PathBuf) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "pkgdesc-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| {
                                tracing_subscriber::EnvFilter::new(
                                    "info,pkgdesc=debug,pkgdesc_builder=debug",
                                )
                            },
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // Keep stdout clean for the JSON document
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    if let Commands::Build {
        output_dir,
        keep_build_root,
        ..
    } = command
    {
        if let Some(dir) = output_dir {
            config.build.output_dir = Some(dir.clone());
        }
        if *keep_build_root {
            config.build.keep_build_root = true;
        }
    }
}
