// Shared session configuration for building russh client configs.
//
// Session setup, algorithm negotiation, and deadline settings live here so
// `session.rs` stays focused on the interactive exchange itself.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use russh::{Preferred, cipher, client, kex};

/// Output substrings that mark a rejected command on IOS-style CLIs.
///
/// The device echoes one of these instead of raising a protocol-level error,
/// so command results have to be scanned for them.
pub const FAILURE_MARKERS: [&str; 4] = [
    "% Ambiguous command",
    "% Incomplete command",
    "% Invalid input detected",
    "% Unknown command",
];

/// Commands sent right after login to make output machine-readable.
pub const SETUP_COMMANDS: [&str; 2] = ["terminal length 0", "terminal width 512"];

/// Connection and exchange settings for a device session.
#[derive(Debug, Clone)]
pub struct SshOptions {
    /// TCP port the SSH server listens on.
    pub port: u16,
    /// Deadline for transport setup, authentication, and the first prompt.
    pub connect_timeout: Duration,
    /// Deadline for each read while waiting on command output.
    pub command_timeout: Duration,
    /// Offer `diffie-hellman-group-exchange-sha1` and `aes256-cbc` in
    /// addition to the modern defaults. Older IOS images negotiate nothing
    /// else, so this is on by default.
    pub legacy_algorithms: bool,
    /// Substrings that mark a rejected command in device output.
    pub failure_markers: Vec<String>,
    /// Commands issued after login, before any caller traffic.
    pub setup_commands: Vec<String>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            port: 22,
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(30),
            legacy_algorithms: true,
            failure_markers: FAILURE_MARKERS.iter().map(ToString::to_string).collect(),
            setup_commands: SETUP_COMMANDS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl SshOptions {
    /// Build the russh client config for these options.
    ///
    /// Host keys are accepted without verification; provisioning targets are
    /// factory-fresh devices whose keys are not known yet.
    pub(crate) fn client_config(&self) -> Arc<client::Config> {
        let config = client::Config {
            preferred: self.preferred_algorithms(),
            inactivity_timeout: None,
            keepalive_interval: Some(Duration::from_secs(15)),
            ..client::Config::default()
        };
        Arc::new(config)
    }

    /// Algorithm preference list, optionally widened for legacy devices.
    fn preferred_algorithms(&self) -> Preferred {
        let mut preferred = Preferred::default();
        if self.legacy_algorithms {
            let mut kex_algos = preferred.kex.to_vec();
            if !kex_algos.contains(&kex::DH_GEX_SHA1) {
                kex_algos.push(kex::DH_GEX_SHA1);
            }
            preferred.kex = Cow::Owned(kex_algos);

            let mut ciphers = preferred.cipher.to_vec();
            if !ciphers.contains(&cipher::AES_256_CBC) {
                ciphers.push(cipher::AES_256_CBC);
            }
            preferred.cipher = Cow::Owned(ciphers);
        }
        preferred
    }

    /// Seconds in the command deadline, for error messages.
    pub(crate) fn command_timeout_secs(&self) -> u64 {
        self.command_timeout.as_secs()
    }

    /// Seconds in the connect deadline, for error messages.
    pub(crate) fn connect_timeout_secs(&self) -> u64 {
        self.connect_timeout.as_secs()
    }
}
