use thiserror::Error;

/// Top-level error type for the `licpush-ssh` crate.
///
/// Covers every failure mode of a device session: transport setup,
/// authentication, privilege escalation, and mid-session channel faults.
/// `licpush-core` maps these into per-device failure records.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// TCP or SSH transport setup failed (refused, unreachable, handshake).
    #[error("Connection failed: {message}")]
    Connect { message: String },

    /// The server never produced a usable shell prompt.
    #[error("No command prompt received: {message}")]
    NoPrompt { message: String },

    // ── Authentication ──────────────────────────────────────────────
    /// Password authentication was rejected by the device.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// `enable` escalation failed (wrong secret, or the device refused).
    #[error("Privilege escalation failed: {message}")]
    Privilege { message: String },

    // ── Session ─────────────────────────────────────────────────────
    /// No data from the device within the read deadline.
    #[error("Operation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The channel closed or faulted mid-exchange.
    #[error("Channel failure: {message}")]
    Channel { message: String },

    /// Low-level SSH protocol error.
    #[error("SSH protocol error: {0}")]
    Ssh(#[from] russh::Error),
}

impl Error {
    /// Returns `true` if this error means the device rejected the login.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this error means `enable` escalation failed.
    pub fn is_privilege(&self) -> bool {
        matches!(self, Self::Privilege { .. })
    }

    /// Returns `true` if the session never got past transport setup.
    pub fn is_connect(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::NoPrompt { .. } | Self::Timeout { .. }
        )
    }
}
