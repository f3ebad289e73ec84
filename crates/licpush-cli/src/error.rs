//! CLI error types with miette diagnostics.
//!
//! Maps `EngineError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use licpush_core::EngineError;

/// Exit codes returned by `main` when a command fails.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Device list ──────────────────────────────────────────────────

    #[error("Could not read device list at {path}")]
    #[diagnostic(
        code(licpush::device_list_unreadable),
        help("Check the path and permissions, then try: licpush check {path}")
    )]
    DeviceListUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No device list configured")]
    #[diagnostic(
        code(licpush::no_device_list),
        help(
            "Pass one with --device-list (-d), set LICPUSH_DEVICE_LIST,\n\
             or add device_list to profile '{profile}'."
        )
    )]
    NoDeviceList { profile: String },

    // ── Credentials ──────────────────────────────────────────────────

    #[error("No credentials available for profile '{profile}'")]
    #[diagnostic(
        code(licpush::no_credentials),
        help(
            "Run: licpush config set-password --profile {profile}\n\
             Or set LICPUSH_USERNAME and LICPUSH_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("No registration token available for profile '{profile}'")]
    #[diagnostic(
        code(licpush::no_token),
        help(
            "Pass one with --token, set LICPUSH_TOKEN, or store it with:\n\
             licpush config set-password --profile {profile} --kind token"
        )
    )]
    NoToken { profile: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(licpush::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: licpush config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(licpush::no_config),
        help(
            "Create one with: licpush config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Profile '{profile}' is missing required setting '{field}'")]
    #[diagnostic(
        code(licpush::missing_setting),
        help("Set it with: licpush config set {field} <value>")
    )]
    MissingSetting {
        field: &'static str,
        profile: String,
    },

    #[error(transparent)]
    #[diagnostic(code(licpush::config))]
    Config(Box<figment::Error>),

    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(licpush::config_serialize))]
    Serialize(#[from] toml::ser::Error),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(licpush::validation))]
    Validation { field: String, reason: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials { .. } | Self::NoToken { .. } => exit_code::AUTH,
            Self::DeviceListUnreadable { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::NOT_FOUND,
            Self::NoDeviceList { .. } | Self::MissingSetting { .. } | Self::Validation { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── EngineError → CliError mapping ───────────────────────────────────

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::DeviceListUnreadable { path, source } => Self::DeviceListUnreadable {
                path: path.display().to_string(),
                source,
            },

            EngineError::InvalidSettings { field, reason } => Self::Validation {
                field: field.into(),
                reason,
            },
        }
    }
}
