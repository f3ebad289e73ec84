// ── Run report ──
//
// Aggregated outcome of one run. Every entry from the device list lands
// in exactly one bucket: succeeded, failed (with a reason), or invalid
// (never attempted). The report is what the CLI renders and what exit
// handling is based on.

use std::fmt;

use indexmap::IndexMap;

use crate::error::ConnectFailure;
use crate::stage::StageName;

/// Broad classification of why a device failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The device could not be reached at all.
    Connect,
    /// The device rejected the login password.
    Authentication,
    /// Login worked but `enable` escalation failed.
    Privilege,
    /// A configuration stage was rejected or the session died during it.
    Stage(StageName),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => f.write_str("connect"),
            Self::Authentication => f.write_str("authentication"),
            Self::Privilege => f.write_str("privilege"),
            Self::Stage(name) => write!(f, "stage {name}"),
        }
    }
}

/// Why one device failed, with the device's own words where available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub kind: FailureKind,
    /// Error text: the connect error, or the device output that carried
    /// the failure marker.
    pub detail: String,
}

impl FailureReason {
    pub fn stage(name: StageName, detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Stage(name),
            detail: detail.into(),
        }
    }
}

impl From<ConnectFailure> for FailureReason {
    fn from(failure: ConnectFailure) -> Self {
        match failure {
            ConnectFailure::Unreachable { message } => Self {
                kind: FailureKind::Connect,
                detail: message,
            },
            ConnectFailure::Authentication { message } => Self {
                kind: FailureKind::Authentication,
                detail: message,
            },
            ConnectFailure::Privilege { message } => Self {
                kind: FailureKind::Privilege,
                detail: message,
            },
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// Terminal state of one device's provisioning sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOutcome {
    Success,
    Failed(FailureReason),
}

impl DeviceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Every device's fate after a run.
///
/// `failures` keys on the address string; when the same address appears
/// twice in the input and fails twice, the later reason wins.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    succeeded: Vec<String>,
    failures: IndexMap<String, FailureReason>,
    invalid: Vec<String>,
}

impl RunReport {
    /// Start a report with the invalid entries already known from parsing.
    pub fn with_invalid(invalid: Vec<String>) -> Self {
        Self {
            invalid,
            ..Self::default()
        }
    }

    /// Record one device's outcome.
    pub fn record(&mut self, address: String, outcome: DeviceOutcome) {
        match outcome {
            DeviceOutcome::Success => self.succeeded.push(address),
            DeviceOutcome::Failed(reason) => {
                self.failures.insert(address, reason);
            }
        }
    }

    pub fn succeeded(&self) -> &[String] {
        &self.succeeded
    }

    pub fn failures(&self) -> &IndexMap<String, FailureReason> {
        &self.failures
    }

    pub fn invalid(&self) -> &[String] {
        &self.invalid
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    /// Total entries across all three buckets.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failures.len() + self.invalid.len()
    }

    /// True when at least one reachable device failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
