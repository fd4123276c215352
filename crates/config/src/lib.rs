#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for pkgdesc
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/pkgdesc/config.toml)
//! - Environment variables
//! - CLI flags

use pkgdesc_errors::{ConfigError, Error};
use pkgdesc_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Environment variable that names the build root unless overridden
pub const DEFAULT_BUILD_ROOT_VAR: &str = "PKGDESC_BUILD_ROOT";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Name of the environment variable holding the build root path
    #[serde(default = "default_build_root_var")]
    pub build_root_var: String,
    /// Build root used when the variable is not set
    #[serde(default)]
    pub default_build_root: Option<PathBuf>,
    /// Shell used to run phase actions
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Where artifacts are written; the current directory when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// `fast`, `balanced`, `maximum` or a zstd level between 1 and 22
    #[serde(default = "default_compression_level")]
    pub compression_level: String,
    /// Skip the clean phase after a pipeline run, whether it succeeded or failed
    #[serde(default)]
    pub keep_build_root: bool,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub log_dir: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            build_root_var: default_build_root_var(),
            default_build_root: None,
            shell: default_shell(),
            output_dir: None,
            compression_level: default_compression_level(),
            keep_build_root: false,
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_build_root_var() -> String {
    DEFAULT_BUILD_ROOT_VAR.to_string()
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}

fn default_compression_level() -> String {
    "balanced".to_string()
}

impl BuildConfig {
    /// Resolve the configured compression level to a zstd level
    ///
    /// # Errors
    ///
    /// Returns an error if the level is neither a known name nor a number in 1..=22.
    pub fn zstd_level(&self) -> Result<i32, ConfigError> {
        match self.compression_level.as_str() {
            "fast" => Ok(1),
            "balanced" => Ok(9),
            "maximum" => Ok(19),
            other => match other.parse::<i32>() {
                Ok(level) if (1..=22).contains(&level) => Ok(level),
                _ => Err(ConfigError::InvalidValue {
                    field: "build.compression_level".to_string(),
                    value: other.to_string(),
                }),
            },
        }
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("pkgdesc").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = match Self::default_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Using default configuration: {}", e);
                return Ok(Self::default());
            }
        };

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range.
    pub fn validate(&self) -> Result<(), Error> {
        self.build.zstd_level()?;
        if self.build.build_root_var.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "build.build_root_var".to_string(),
                value: self.build.build_root_var.clone(),
            }
            .into());
        }
        if self.build.shell.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "build.shell".to_string(),
                value: self.build.shell.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // PKGDESC_OUTPUT
        if let Ok(output) = std::env::var("PKGDESC_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PKGDESC_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // PKGDESC_COLOR
        if let Ok(color) = std::env::var("PKGDESC_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PKGDESC_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // PKGDESC_SHELL
        if let Ok(shell) = std::env::var("PKGDESC_SHELL") {
            self.build.shell = shell;
        }

        // PKGDESC_OUTPUT_DIR
        if let Ok(dir) = std::env::var("PKGDESC_OUTPUT_DIR") {
            self.build.output_dir = Some(PathBuf::from(dir));
        }

        // PKGDESC_COMPRESSION_LEVEL
        if let Ok(level) = std::env::var("PKGDESC_COMPRESSION_LEVEL") {
            self.build.compression_level = level;
            self.build.zstd_level()?;
        }

        // PKGDESC_KEEP_BUILD_ROOT
        if let Ok(keep) = std::env::var("PKGDESC_KEEP_BUILD_ROOT") {
            self.build.keep_build_root = match keep.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PKGDESC_KEEP_BUILD_ROOT".to_string(),
                        value: keep,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Resolve the build root from the configured environment variable,
    /// falling back to `build.default_build_root`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EnvVarNotFound` when neither is available.
    pub fn build_root(&self) -> Result<PathBuf, Error> {
        match std::env::var_os(&self.build.build_root_var) {
            Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
            _ => self.build.default_build_root.clone().ok_or_else(|| {
                ConfigError::EnvVarNotFound {
                    var: self.build.build_root_var.clone(),
                }
                .into()
            }),
        }
    }

    /// Get the artifact output directory (with default)
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.build
            .output_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Get the log directory (with default)
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.paths.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("pkgdesc")
                .join("logs")
        })
    }
}
