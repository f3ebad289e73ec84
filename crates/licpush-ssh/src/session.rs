// Interactive SSH session against a single network device.
//
// Drives a PTY + shell channel the way an operator would: send a line,
// collect output until the prompt comes back, scan for IOS rejection
// markers. Authentication and `enable` escalation happen inside `open`;
// a session handed to the caller is ready for config traffic.

use std::net::IpAddr;
use std::time::Duration;

use russh::client::{self, AuthResult, Msg};
use russh::keys::PublicKey;
use russh::{Channel, ChannelMsg, Disconnect};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::detect::{self, PromptLevel, PromptMatcher};
use crate::error::Error;
use crate::options::SshOptions;

/// Result of a single command or config-batch exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// True when the device echoed a failure marker anywhere in the exchange.
    pub failed: bool,
    /// Cleaned response text, echo and prompts removed.
    pub output: String,
}

/// Accepts any host key, mirroring `StrictHostKeyChecking=no`.
///
/// Provisioning targets are factory-fresh devices whose keys nobody has
/// recorded yet, so there is nothing to verify against.
struct AcceptAnyHostKey;

impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _key: &PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// What a read loop terminated on.
enum ReadEvent {
    /// The device printed its prompt; the session is synchronized.
    Prompt(PromptLevel),
    /// The device printed a `Password:` challenge instead of a prompt.
    PasswordChallenge,
}

/// An authenticated, prompt-synchronized session with one device.
///
/// `open` performs the whole login sequence: transport, password auth,
/// PTY + shell, optional `enable` escalation, then pagination setup.
/// Every failure before that point tears the transport down again, so
/// callers only ever `close` sessions that opened successfully.
pub struct DeviceSession {
    handle: client::Handle<AcceptAnyHostKey>,
    channel: Channel<Msg>,
    matcher: PromptMatcher,
    options: SshOptions,
    host: IpAddr,
    closed: bool,
}

impl DeviceSession {
    /// Open a session to `host` and bring it to a usable prompt.
    pub async fn open(
        host: IpAddr,
        username: &str,
        password: &SecretString,
        enable_secret: Option<&SecretString>,
        options: &SshOptions,
    ) -> Result<Self, Error> {
        let config = options.client_config();
        let connecting = client::connect(config, (host, options.port), AcceptAnyHostKey);
        let mut handle = tokio::time::timeout(options.connect_timeout, connecting)
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: options.connect_timeout_secs(),
            })?
            .map_err(|err| Error::Connect {
                message: err.to_string(),
            })?;
        debug!(host = %host, port = options.port, "transport established");

        let auth = handle
            .authenticate_password(username, password.expose_secret())
            .await?;
        match auth {
            AuthResult::Success => {}
            AuthResult::Failure { .. } => {
                return Err(Error::Authentication {
                    message: format!("device rejected the password for {username}"),
                });
            }
        }
        debug!(host = %host, "password accepted");

        let channel = handle.channel_open_session().await?;
        channel.request_pty(false, "vt100", 512, 24, 0, 0, &[]).await?;
        channel.request_shell(false).await?;

        let mut session = Self {
            handle,
            channel,
            matcher: PromptMatcher::new(),
            options: options.clone(),
            host,
            closed: false,
        };
        if let Err(err) = session.prepare(enable_secret).await {
            session.close().await;
            return Err(err);
        }
        debug!(host = %host, "session ready");
        Ok(session)
    }

    /// The device this session is attached to.
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Push configuration lines as one batch.
    ///
    /// Wraps the lines in `configure terminal` … `end` and sends every
    /// line even after a rejection, the way a pasted config behaves. The
    /// returned output carries the combined responses; `failed` is set if
    /// any line drew a failure marker.
    pub async fn send_configs(&mut self, lines: &[String]) -> Result<CommandOutput, Error> {
        let sequence = config_sequence(lines);
        let mut transcript: Vec<String> = Vec::new();
        let mut failed = false;
        for command in &sequence {
            let output = self.exchange(command).await?;
            if let Some(marker) =
                detect::first_failure_marker(&output, &self.options.failure_markers)
            {
                failed = true;
                debug!(host = %self.host, marker, "config line rejected");
            }
            if !output.is_empty() {
                transcript.push(output);
            }
        }
        Ok(CommandOutput {
            failed,
            output: transcript.join("\n"),
        })
    }

    /// Run a single operational (EXEC mode) command.
    pub async fn send_command(&mut self, command: &str) -> Result<CommandOutput, Error> {
        let output = self.exchange(command).await?;
        let failed = detect::first_failure_marker(&output, &self.options.failure_markers).is_some();
        if failed {
            debug!(host = %self.host, "operational command rejected");
        }
        Ok(CommandOutput { failed, output })
    }

    /// Tear the session down. Safe to call more than once; never fails.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.channel.eof().await {
            debug!(host = %self.host, error = %err, "channel eof failed during close");
        }
        if let Err(err) = self
            .handle
            .disconnect(Disconnect::ByApplication, "session closed", "en")
            .await
        {
            debug!(host = %self.host, error = %err, "disconnect failed during close");
        } else {
            debug!(host = %self.host, "session closed");
        }
    }

    // ── Login sequence ───────────────────────────────────────────────

    /// Wait for the first prompt, escalate if needed, disable pagination.
    async fn prepare(&mut self, enable_secret: Option<&SecretString>) -> Result<(), Error> {
        let (event, _) = self.read_until(self.options.connect_timeout).await?;
        match event {
            ReadEvent::Prompt(PromptLevel::UserExec) => {
                if let Some(secret) = enable_secret {
                    self.escalate(secret).await?;
                } else {
                    debug!(host = %self.host, "no enable secret, staying in user EXEC");
                }
            }
            ReadEvent::Prompt(_) => {}
            ReadEvent::PasswordChallenge => {
                return Err(Error::NoPrompt {
                    message: "device kept asking for a password after login".into(),
                });
            }
        }

        let setup = self.options.setup_commands.clone();
        for command in &setup {
            self.exchange(command).await?;
        }
        Ok(())
    }

    /// Enter privileged EXEC via `enable`.
    async fn escalate(&mut self, secret: &SecretString) -> Result<(), Error> {
        self.write_line("enable").await?;
        let (event, _) = self.read_until(self.options.command_timeout).await?;
        match event {
            ReadEvent::PasswordChallenge => {
                self.write_line(secret.expose_secret()).await?;
                let (event, _) = self.read_until(self.options.command_timeout).await?;
                match event {
                    ReadEvent::Prompt(PromptLevel::PrivilegedExec | PromptLevel::ConfigMode) => {
                        debug!(host = %self.host, "entered privileged EXEC");
                        Ok(())
                    }
                    ReadEvent::PasswordChallenge => Err(Error::Privilege {
                        message: "device rejected the enable secret".into(),
                    }),
                    ReadEvent::Prompt(PromptLevel::UserExec) => Err(Error::Privilege {
                        message: "device dropped back to user EXEC".into(),
                    }),
                }
            }
            // `enable` without a configured secret lands straight on `#`.
            ReadEvent::Prompt(PromptLevel::PrivilegedExec | PromptLevel::ConfigMode) => Ok(()),
            ReadEvent::Prompt(PromptLevel::UserExec) => Err(Error::Privilege {
                message: "device refused to leave user EXEC".into(),
            }),
        }
    }

    // ── Channel plumbing ─────────────────────────────────────────────

    /// Send a line and collect the cleaned response.
    async fn exchange(&mut self, command: &str) -> Result<String, Error> {
        self.write_line(command).await?;
        let (event, raw) = self.read_until(self.options.command_timeout).await?;
        match event {
            ReadEvent::Prompt(_) => Ok(self.matcher.clean_output(&raw, command)),
            ReadEvent::PasswordChallenge => Err(Error::Channel {
                message: "unexpected password challenge mid-session".into(),
            }),
        }
    }

    /// Accumulate channel data until a prompt or password challenge.
    async fn read_until(&mut self, deadline: Duration) -> Result<(ReadEvent, String), Error> {
        let mut collected = String::new();
        loop {
            let msg = tokio::time::timeout(deadline, self.channel.wait())
                .await
                .map_err(|_| Error::Timeout {
                    timeout_secs: deadline.as_secs(),
                })?;
            let Some(msg) = msg else {
                return Err(Error::Channel {
                    message: "channel closed before the prompt returned".into(),
                });
            };
            match msg {
                ChannelMsg::Data { ref data } => {
                    collected.push_str(&String::from_utf8_lossy(data));
                }
                ChannelMsg::ExtendedData { ref data, .. } => {
                    collected.push_str(&String::from_utf8_lossy(data));
                }
                ChannelMsg::Eof | ChannelMsg::Close => {
                    return Err(Error::Channel {
                        message: "channel closed before the prompt returned".into(),
                    });
                }
                _ => continue,
            }
            if let Some(level) = self.matcher.classify(&collected) {
                return Ok((ReadEvent::Prompt(level), collected));
            }
            if self.matcher.is_password_challenge(&collected) {
                return Ok((ReadEvent::PasswordChallenge, collected));
            }
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<(), Error> {
        let payload = format!("{line}\n");
        self.channel.data(payload.as_bytes()).await?;
        Ok(())
    }
}

/// Wrap config lines in the enter/exit commands for global config mode.
fn config_sequence(lines: &[String]) -> Vec<String> {
    let mut sequence = Vec::with_capacity(lines.len() + 2);
    sequence.push("configure terminal".to_string());
    sequence.extend(lines.iter().cloned());
    sequence.push("end".to_string());
    sequence
}
