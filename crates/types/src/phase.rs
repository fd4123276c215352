//! Lifecycle phases of a package build

use pkgdesc_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One discrete step of the build sequence.
///
/// Variant order is execution order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    Prepare,
    Build,
    Install,
    Clean,
}

impl LifecyclePhase {
    /// Every phase in declaration order
    pub const ALL: [LifecyclePhase; 4] = [Self::Prepare, Self::Build, Self::Install, Self::Clean];

    /// The phases that must run, in order, before packaging
    pub const SEQUENCE: [LifecyclePhase; 3] = [Self::Prepare, Self::Build, Self::Install];

    /// Lowercase name used in descriptors and on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Build => "build",
            Self::Install => "install",
            Self::Clean => "clean",
        }
    }

    /// The phase that must have completed before this one may run.
    ///
    /// `Prepare` has none and `Clean` may run at any time.
    #[must_use]
    pub fn predecessor(self) -> Option<LifecyclePhase> {
        match self {
            Self::Prepare | Self::Clean => None,
            Self::Build => Some(Self::Prepare),
            Self::Install => Some(Self::Build),
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecyclePhase {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prepare" | "prep" => Ok(Self::Prepare),
            "build" => Ok(Self::Build),
            "install" => Ok(Self::Install),
            "clean" => Ok(Self::Clean),
            _ => Err(PackageError::UnknownPhase {
                name: s.to_string(),
            }),
        }
    }
}

impl clap::ValueEnum for LifecyclePhase {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}
