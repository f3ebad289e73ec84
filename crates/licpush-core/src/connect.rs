// ── Connector port ──
//
// The runner talks to devices through these traits, never through
// `licpush-ssh` directly. Production wires in `SshConnector`; tests
// substitute scripted fakes and exercise the whole engine offline.

use std::net::IpAddr;

use licpush_ssh::{DeviceSession, SshOptions};

pub use licpush_ssh::CommandOutput;

use crate::error::{ChannelError, ConnectFailure};
use crate::settings::Credentials;

/// Opens sessions to devices.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Session: DeviceChannel;

    /// Establish an authenticated, escalated session with one device.
    async fn connect(
        &self,
        address: IpAddr,
        credentials: &Credentials,
    ) -> Result<Self::Session, ConnectFailure>;
}

/// An open session the runner can push stages through.
#[allow(async_fn_in_trait)]
pub trait DeviceChannel {
    /// Apply configuration lines as one batch.
    ///
    /// `Ok` with `failed = true` means the device rejected a line;
    /// `Err` means the session itself broke.
    async fn apply_config(&mut self, lines: &[String]) -> Result<CommandOutput, ChannelError>;

    /// Run a single operational command.
    async fn run_command(&mut self, command: &str) -> Result<CommandOutput, ChannelError>;

    /// Tear the session down. Must be safe to call on a broken session.
    async fn close(&mut self);
}

/// Production connector backed by `licpush-ssh`.
#[derive(Debug, Clone)]
pub struct SshConnector {
    options: SshOptions,
}

impl SshConnector {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }
}

impl Connector for SshConnector {
    type Session = DeviceSession;

    async fn connect(
        &self,
        address: IpAddr,
        credentials: &Credentials,
    ) -> Result<Self::Session, ConnectFailure> {
        DeviceSession::open(
            address,
            &credentials.username,
            &credentials.password,
            credentials.enable_secret.as_ref(),
            &self.options,
        )
        .await
        .map_err(ConnectFailure::from)
    }
}

impl DeviceChannel for DeviceSession {
    async fn apply_config(&mut self, lines: &[String]) -> Result<CommandOutput, ChannelError> {
        self.send_configs(lines).await.map_err(ChannelError::from)
    }

    async fn run_command(&mut self, command: &str) -> Result<CommandOutput, ChannelError> {
        self.send_command(command).await.map_err(ChannelError::from)
    }

    async fn close(&mut self) {
        DeviceSession::close(self).await;
    }
}
