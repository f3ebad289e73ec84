// ── Engine error types ──
//
// User-facing errors from licpush-core. Per-device failures are NOT
// errors here -- those are recorded in the run report and never abort a
// run. What remains is the handful of conditions that stop a run before
// it starts, plus the failure types the connector boundary speaks.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run before any device is touched.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The device list file could not be read at all.
    #[error("Cannot read device list {path}: {source}")]
    DeviceListUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A run setting would render an unusable stage plan.
    #[error("Invalid run settings: {field}: {reason}")]
    InvalidSettings {
        field: &'static str,
        reason: String,
    },
}

/// Why a device session could not be established.
///
/// `Authentication` and `Privilege` are kept apart from the generic
/// `Unreachable` so reports can tell a credential problem from a dead
/// host.
#[derive(Debug, Error)]
pub enum ConnectFailure {
    #[error("Cannot reach device: {message}")]
    Unreachable { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Privilege escalation failed: {message}")]
    Privilege { message: String },
}

/// A session died mid-exchange (after connecting successfully).
#[derive(Debug, Error)]
#[error("Session failure: {message}")]
pub struct ChannelError {
    pub message: String,
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<licpush_ssh::Error> for ConnectFailure {
    fn from(err: licpush_ssh::Error) -> Self {
        match err {
            licpush_ssh::Error::Authentication { message } => {
                ConnectFailure::Authentication { message }
            }
            licpush_ssh::Error::Privilege { message } => ConnectFailure::Privilege { message },
            licpush_ssh::Error::Timeout { timeout_secs } => ConnectFailure::Unreachable {
                message: format!("no response within {timeout_secs}s"),
            },
            other => ConnectFailure::Unreachable {
                message: other.to_string(),
            },
        }
    }
}

impl From<licpush_ssh::Error> for ChannelError {
    fn from(err: licpush_ssh::Error) -> Self {
        ChannelError {
            message: err.to_string(),
        }
    }
}
