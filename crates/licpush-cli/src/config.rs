//! CLI configuration: TOML profiles and credential resolution.
//!
//! Profiles name everything a run needs -- device list, call-home profile,
//! SSM destination, credentials. Secrets resolve through a chain of
//! env var, system keyring, then plaintext config, with CLI flags on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use licpush_core::{DEFAULT_CALL_HOME_PROFILE, RunSettings};
use licpush_ssh::SshOptions;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "licpush";

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named provisioning profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            color: default_color(),
            timeout: default_timeout(),
            port: default_port(),
        }
    }
}

fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_port() -> u16 {
    22
}

/// A named provisioning profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Device list file, one IP address per line.
    pub device_list: Option<PathBuf>,

    /// Name of the call-home profile to create on each device.
    pub profile_name: Option<String>,

    /// Smart Software Manager destination URL.
    pub ssm_url: Option<String>,

    /// Registration token (plaintext -- prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the registration token.
    pub token_env: Option<String>,

    /// SSH username.
    pub username: Option<String>,

    /// SSH password (plaintext -- prefer keyring).
    pub password: Option<String>,

    /// Privileged-exec secret (plaintext -- prefer keyring).
    pub enable_secret: Option<String>,

    /// Remove the factory call-home profile before applying the new one.
    #[serde(default = "default_remove_profile")]
    pub remove_default_profile: bool,

    /// Name of the factory call-home profile to remove.
    #[serde(default = "default_factory_profile")]
    pub default_profile_name: String,

    /// SSH port override.
    pub port: Option<u16>,

    /// Per-command timeout override, in seconds.
    pub timeout: Option<u64>,

    /// Offer legacy key-exchange and cipher algorithms.
    #[serde(default = "default_legacy_algorithms")]
    pub legacy_algorithms: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            device_list: None,
            profile_name: None,
            ssm_url: None,
            token: None,
            token_env: None,
            username: None,
            password: None,
            enable_secret: None,
            remove_default_profile: default_remove_profile(),
            default_profile_name: default_factory_profile(),
            port: None,
            timeout: None,
            legacy_algorithms: default_legacy_algorithms(),
        }
    }
}

fn default_remove_profile() -> bool {
    true
}
fn default_factory_profile() -> String {
    DEFAULT_CALL_HOME_PROFILE.into()
}
fn default_legacy_algorithms() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "licpush", "licpush").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("licpush");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("LICPUSH_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Load config for commands that need an existing profile.
///
/// A missing file is an error here: profiles only live in the config
/// file, so `run` and `plan` cannot proceed on bare defaults.
pub fn load_config_required() -> Result<Config, CliError> {
    let path = config_path();
    if !path.is_file() {
        return Err(CliError::NoConfig {
            path: path.display().to_string(),
        });
    }
    load_config()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), CliError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up the active profile, with a listing of alternatives on failure.
pub fn require_profile<'a>(
    config: &'a Config,
    profile_name: &str,
) -> Result<&'a Profile, CliError> {
    config
        .profiles
        .get(profile_name)
        .ok_or_else(|| CliError::ProfileNotFound {
            name: profile_name.into(),
            available: available_profiles(config),
        })
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        let mut names: Vec<_> = config.profiles.keys().cloned().collect();
        names.sort();
        names.join(", ")
    }
}

// ── Run settings resolution ─────────────────────────────────────────

/// Translate a `Profile` + global flags into `RunSettings`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_settings(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<RunSettings, CliError> {
    let call_home_profile =
        profile
            .profile_name
            .clone()
            .ok_or_else(|| CliError::MissingSetting {
                field: "profile_name",
                profile: profile_name.into(),
            })?;

    let ssm_url = profile.ssm_url.clone().ok_or_else(|| CliError::MissingSetting {
        field: "ssm_url",
        profile: profile_name.into(),
    })?;

    let token = resolve_token_with_flag(profile, profile_name, global)?;

    Ok(RunSettings {
        remove_default_profile: profile.remove_default_profile,
        default_profile_name: profile.default_profile_name.clone(),
        profile_name: call_home_profile,
        ssm_url,
        token,
    })
}

/// Resolve the device list path (flag > env > profile).
pub fn resolve_device_list_path(global: &GlobalOpts, profile: &Profile) -> Option<PathBuf> {
    global
        .device_list
        .clone()
        .or_else(|| profile.device_list.clone())
}

/// Build `SshOptions` from defaults, profile, and flag overrides.
pub fn resolve_ssh_options(
    global: &GlobalOpts,
    profile: &Profile,
    defaults: &Defaults,
) -> SshOptions {
    let port = global.port.or(profile.port).unwrap_or(defaults.port);
    let timeout = global.timeout.or(profile.timeout).unwrap_or(defaults.timeout);

    SshOptions {
        port,
        connect_timeout: Duration::from_secs(timeout),
        command_timeout: Duration::from_secs(timeout),
        legacy_algorithms: profile.legacy_algorithms,
        ..SshOptions::default()
    }
}

// ── Secret resolution ───────────────────────────────────────────────

/// Resolve the registration token with CLI flag override first.
fn resolve_token_with_flag(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    // CLI flag / LICPUSH_TOKEN takes priority (clap reads the env var)
    if let Some(ref token) = global.token {
        return Ok(SecretString::from(token.clone()));
    }

    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Some(secret) = keyring_secret(profile_name, "token") {
        return Ok(secret);
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(CliError::NoToken {
        profile: profile_name.into(),
    })
}

/// Resolve a stored SSH password (env > keyring > plaintext config).
///
/// Returns `None` when nothing is stored; the caller decides whether to
/// prompt interactively.
pub fn stored_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Ok(pw) = std::env::var("LICPUSH_PASSWORD") {
        return Some(SecretString::from(pw));
    }

    if let Some(secret) = keyring_secret(profile_name, "password") {
        return Some(secret);
    }

    profile
        .password
        .as_ref()
        .map(|pw| SecretString::from(pw.clone()))
}

/// Resolve a stored enable secret (env > keyring > plaintext config).
pub fn stored_enable_secret(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Ok(secret) = std::env::var("LICPUSH_ENABLE_SECRET") {
        return Some(SecretString::from(secret));
    }

    if let Some(secret) = keyring_secret(profile_name, "enable") {
        return Some(secret);
    }

    profile
        .enable_secret
        .as_ref()
        .map(|s| SecretString::from(s.clone()))
}

/// Look up `{profile}/{kind}` in the system keyring.
fn keyring_secret(profile_name: &str, kind: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{kind}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}
