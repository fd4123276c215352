//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::style;
use pkgdesc_types::{LifecyclePhase, PackageMetadata};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Summary of a finished build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub package: String,
    pub path: PathBuf,
    pub hash: String,
    pub size: u64,
    pub file_count: usize,
    pub duration_ms: u64,
}

/// Result of a CLI command
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Described {
        package: PackageMetadata,
    },
    PhasesRun {
        package: String,
        phases: Vec<LifecyclePhase>,
        build_root: PathBuf,
        installed_files: usize,
    },
    Built(BuildReport),
    Cleaned {
        package: String,
        build_root: PathBuf,
    },
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    colors_enabled: bool,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
        }
    }

    /// Render command result
    pub fn render_result(&self, result: &CommandOutcome) -> io::Result<()> {
        if self.json_output {
            Self::render_json(result)
        } else {
            self.render_text(result)
        }
    }

    /// `describe` prints the bare metadata object, everything else the tagged outcome
    fn render_json(result: &CommandOutcome) -> io::Result<()> {
        let json = match result {
            CommandOutcome::Described { package } => serde_json::to_string_pretty(package),
            other => serde_json::to_string_pretty(other),
        }
        .map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    fn render_text(&self, result: &CommandOutcome) -> io::Result<()> {
        match result {
            CommandOutcome::Described { package } => self.render_metadata(package),
            CommandOutcome::PhasesRun {
                package,
                phases,
                build_root,
                installed_files,
            } => {
                let phases: Vec<&str> = phases.iter().map(|p| p.as_str()).collect();
                println!("{}: ran {}", self.bold(package), phases.join(", "));
                println!("  build root: {}", build_root.display());
                if *installed_files > 0 {
                    println!("  installed paths: {installed_files}");
                }
            }
            CommandOutcome::Built(report) => self.render_build_report(report),
            CommandOutcome::Cleaned {
                package,
                build_root,
            } => {
                println!(
                    "{}: cleaned {}",
                    self.bold(package),
                    build_root.display()
                );
            }
        }
        Ok(())
    }

    fn render_metadata(&self, package: &PackageMetadata) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Field").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let mut rows: Vec<(&str, String)> = vec![
            ("name", package.name.clone()),
            ("version", package.version.clone()),
            ("release", package.release.clone()),
            ("arch", package.arch.clone()),
            ("vendor", package.vendor.clone()),
            ("url", package.url.clone()),
            ("license", package.license.clone()),
            ("summary", package.summary.clone()),
        ];
        if let Some(author) = &package.author {
            let author = match &package.author_email {
                Some(email) => format!("{author} <{email}>"),
                None => author.clone(),
            };
            rows.push(("author", author));
        }
        rows.push(("platforms", package.platforms.join(", ")));
        if !package.requires.is_empty() {
            rows.push(("requires", package.requires.join(", ")));
        }
        if !package.build_requires.is_empty() {
            rows.push(("build requires", package.build_requires.join(", ")));
        }
        if !package.classifiers.is_empty() {
            rows.push(("classifiers", package.classifiers.join("\n")));
        }
        rows.push(("description", package.description.clone()));

        for (field, value) in rows {
            table.add_row(vec![Cell::new(field), Cell::new(value)]);
        }

        println!("{table}");
    }

    fn render_build_report(&self, report: &BuildReport) {
        println!("{} built {}", self.green("✓"), self.bold(&report.package));
        println!("  artifact: {}", report.path.display());
        println!("  blake3:   {}", report.hash);
        println!(
            "  size:     {} ({} paths)",
            format_size(report.size),
            report.file_count
        );
        println!("  time:     {:.1}s", report.duration_ms as f64 / 1000.0);
    }

    fn bold(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).green().to_string()
        } else {
            text.to_string()
        }
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
