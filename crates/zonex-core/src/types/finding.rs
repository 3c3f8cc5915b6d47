use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational (interesting names, inventory)
    Info,
    /// Worth investigating (cache residency, missing mail policy)
    Medium,
    /// Likely exposure (private address leakage)
    High,
    /// Confirmed exploitable condition (dangling cloud resource)
    Critical,
}

impl Severity {
    /// Returns true for HIGH and CRITICAL findings
    #[must_use]
    pub const fn is_severe(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Something a probe or analyzer wants the operator to know
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    /// How serious the finding is
    pub severity: Severity,

    /// Human-readable description
    pub message: String,
}

impl Finding {
    /// Create a finding
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Shorthand for an INFO finding
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Shorthand for a MEDIUM finding
    #[must_use]
    pub fn medium(message: impl Into<String>) -> Self {
        Self::new(Severity::Medium, message)
    }

    /// Shorthand for a HIGH finding
    #[must_use]
    pub fn high(message: impl Into<String>) -> Self {
        Self::new(Severity::High, message)
    }

    /// Shorthand for a CRITICAL finding
    #[must_use]
    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }
}
