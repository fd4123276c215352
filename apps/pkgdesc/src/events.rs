//! Event handling and terminal status output

use crate::logging::log_event_with_tracing;
use console::{style, Term};
use pkgdesc_events::{AppEvent, EventMessage, GeneralEvent, PackageEvent, PhaseEvent};

/// Turns events into log records and, outside JSON mode, status lines on stderr
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    /// Print status lines; off in JSON mode so stdout stays machine readable
    show_status: bool,
    debug_enabled: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, show_status: bool, debug_enabled: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            show_status,
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);

        if !self.show_status {
            return;
        }

        match message.event {
            AppEvent::Phase(PhaseEvent::Started { package, phase, .. }) => {
                self.status("==>", &format!("{phase} {package}"));
            }
            AppEvent::Phase(PhaseEvent::Completed {
                phase, duration_ms, ..
            }) => {
                self.success(&format!("{phase} finished in {}", format_ms(duration_ms)));
            }
            // Full error text is printed once the command returns
            AppEvent::Phase(PhaseEvent::Failed {
                phase, exit_code, ..
            }) => match exit_code {
                Some(code) => self.failure(&format!("{phase} exited with status {code}")),
                None => self.failure(&format!("{phase} failed")),
            },
            AppEvent::Phase(PhaseEvent::ManifestRecorded { files, .. }) => {
                self.status("   ", &format!("{files} installed paths recorded"));
            }
            AppEvent::Phase(PhaseEvent::BuildRootRemoved { path, existed }) => {
                if existed {
                    self.status("   ", &format!("removed {}", path.display()));
                }
            }
            AppEvent::Package(PackageEvent::Started { package, files }) => {
                self.status("==>", &format!("packaging {package} ({files} paths)"));
            }
            AppEvent::Package(PackageEvent::Created { path, .. }) => {
                self.success(&format!("wrote {}", path.display()));
            }
            AppEvent::Package(PackageEvent::BuildFinished { .. }) => {}
            AppEvent::General(GeneralEvent::Warning { message, .. }) => {
                self.warning(&message);
            }
            AppEvent::General(GeneralEvent::Error { message, details }) => match details {
                Some(details) => self.failure(&format!("{message}: {details}")),
                None => self.failure(&message),
            },
            AppEvent::General(GeneralEvent::DebugLog { message, .. }) => {
                if self.debug_enabled {
                    self.status("   ", &message);
                }
            }
            AppEvent::General(
                GeneralEvent::OperationStarted { .. }
                | GeneralEvent::OperationCompleted { .. }
                | GeneralEvent::OperationFailed { .. },
            ) => {}
        }
    }

    fn status(&self, marker: &str, text: &str) {
        let marker = if self.colors_enabled {
            style(marker).blue().bold().to_string()
        } else {
            marker.to_string()
        };
        let _ = self.term.write_line(&format!("{marker} {text}"));
    }

    fn success(&self, text: &str) {
        let marker = if self.colors_enabled {
            style("ok").green().to_string()
        } else {
            "ok".to_string()
        };
        let _ = self.term.write_line(&format!("    {marker} {text}"));
    }

    fn warning(&self, text: &str) {
        let marker = if self.colors_enabled {
            style("warning:").yellow().bold().to_string()
        } else {
            "warning:".to_string()
        };
        let _ = self.term.write_line(&format!("{marker} {text}"));
    }

    fn failure(&self, text: &str) {
        let marker = if self.colors_enabled {
            style("error:").red().bold().to_string()
        } else {
            "error:".to_string()
        };
        let _ = self.term.write_line(&format!("{marker} {text}"));
    }
}

fn format_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}
