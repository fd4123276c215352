//! Structured logging integration for events
//!
//! Converts domain events into `tracing` records with structured fields so
//! the JSON debug log carries the same information the terminal shows.

use pkgdesc_events::{AppEvent, EventMessage, GeneralEvent, PackageEvent, PhaseEvent};
use tracing::{debug, error, info, warn};

/// Log an event using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();
    let correlation = meta.correlation_id.as_deref().unwrap_or("-");

    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, context } => {
                warn!(source, correlation, context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                error!(source, correlation, details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(source, correlation, context = ?context, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                info!(source, correlation, operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(
                    source,
                    correlation,
                    operation = %operation,
                    success = success,
                    "Operation completed"
                );
            }
            GeneralEvent::OperationFailed { operation, error } => {
                error!(
                    source,
                    correlation,
                    operation = %operation,
                    error = %error,
                    "Operation failed"
                );
            }
        },

        AppEvent::Phase(event) => match event {
            PhaseEvent::Started {
                package,
                phase,
                command,
                working_dir,
            } => {
                info!(
                    source,
                    package = %package,
                    phase = %phase,
                    working_dir = %working_dir.display(),
                    "Phase started"
                );
                debug!(source, package = %package, phase = %phase, command = %command, "Phase command");
            }
            PhaseEvent::Completed {
                package,
                phase,
                duration_ms,
            } => {
                info!(
                    source,
                    package = %package,
                    phase = %phase,
                    duration_ms = duration_ms,
                    "Phase completed"
                );
            }
            PhaseEvent::Failed {
                package,
                phase,
                exit_code,
                message,
            } => {
                error!(
                    source,
                    package = %package,
                    phase = %phase,
                    exit_code = ?exit_code,
                    message = %message,
                    "Phase failed"
                );
            }
            PhaseEvent::ManifestRecorded { package, files } => {
                info!(source, package = %package, files = files, "Install manifest recorded");
            }
            PhaseEvent::BuildRootRemoved { path, existed } => {
                debug!(
                    source,
                    path = %path.display(),
                    existed = existed,
                    "Build root removed"
                );
            }
        },

        AppEvent::Package(event) => match event {
            PackageEvent::Started { package, files } => {
                info!(source, package = %package, files = files, "Packaging started");
            }
            PackageEvent::Created {
                package,
                path,
                hash,
                size,
                files,
            } => {
                info!(
                    source,
                    package = %package,
                    path = %path.display(),
                    hash = %hash,
                    size = size,
                    files = files,
                    "Package created"
                );
            }
            PackageEvent::BuildFinished {
                package,
                path,
                duration_ms,
            } => {
                info!(
                    source,
                    package = %package,
                    path = %path.display(),
                    duration_ms = duration_ms,
                    "Build finished"
                );
            }
        },
    }
}
