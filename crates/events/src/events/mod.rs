use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};

// Declare all domain modules
pub mod general;
pub mod package;
pub mod phase;

pub use general::GeneralEvent;
pub use package::PackageEvent;
pub use phase::PhaseEvent;

/// Top-level event grouped by domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum AppEvent {
    General(GeneralEvent),
    Phase(PhaseEvent),
    Package(PackageEvent),
}

impl AppEvent {
    /// Default severity for this event
    #[must_use]
    pub fn log_level(&self) -> EventLevel {
        match self {
            AppEvent::General(GeneralEvent::DebugLog { .. }) => EventLevel::Debug,
            AppEvent::General(GeneralEvent::Warning { .. }) => EventLevel::Warn,
            AppEvent::General(
                GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. },
            )
            | AppEvent::Phase(PhaseEvent::Failed { .. }) => EventLevel::Error,
            AppEvent::Phase(
                PhaseEvent::ManifestRecorded { .. } | PhaseEvent::BuildRootRemoved { .. },
            ) => EventLevel::Debug,
            _ => EventLevel::Info,
        }
    }

    /// Subsystem the event belongs to
    #[must_use]
    pub fn source(&self) -> EventSource {
        match self {
            AppEvent::General(_) => EventSource::GENERAL,
            AppEvent::Phase(_) => EventSource::PHASE,
            AppEvent::Package(_) => EventSource::PACKAGE,
        }
    }

    /// Package the event refers to, if any
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        match self {
            AppEvent::Phase(
                PhaseEvent::Started { package, .. }
                | PhaseEvent::Completed { package, .. }
                | PhaseEvent::Failed { package, .. }
                | PhaseEvent::ManifestRecorded { package, .. },
            )
            | AppEvent::Package(
                PackageEvent::Started { package, .. }
                | PackageEvent::Created { package, .. }
                | PackageEvent::BuildFinished { package, .. },
            ) => Some(package),
            _ => None,
        }
    }
}
