//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SecretKind};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "port = {}", cfg.defaults.port);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref list) = p.device_list {
            let _ = writeln!(out, "device_list = \"{}\"", list.display());
        }
        if let Some(ref profile_name) = p.profile_name {
            let _ = writeln!(out, "profile_name = \"{profile_name}\"");
        }
        if let Some(ref url) = p.ssm_url {
            let _ = writeln!(out, "ssm_url = \"{url}\"");
        }
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref user) = p.username {
            let _ = writeln!(out, "username = \"{user}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if p.enable_secret.is_some() {
            let _ = writeln!(out, "enable_secret = \"****\"");
        }
        let _ = writeln!(out, "remove_default_profile = {}", p.remove_default_profile);
        let _ = writeln!(out, "default_profile_name = \"{}\"", p.default_profile_name);
        if let Some(port) = p.port {
            let _ = writeln!(out, "port = {port}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        let _ = writeln!(out, "legacy_algorithms = {}", p.legacy_algorithms);
    }

    out
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: &str,
    keyring_key: &str,
    prompt: &str,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(prompt)
        .items(choices)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;

    if selection == 0 {
        store_keyring_secret(keyring_key, secret, label)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

/// Write one secret into the system keyring.
fn store_keyring_secret(key: &str, secret: &str, label: &str) -> Result<(), CliError> {
    let entry =
        keyring::Entry::new(config::KEYRING_SERVICE, key).map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to access keyring: {e}"),
        })?;
    entry
        .set_password(secret)
        .map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to store {label} in keyring: {e}"),
        })?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("✨ licpush configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(util::prompt_err)?;

            // 2. Run inputs
            let device_list: String = Input::new()
                .with_prompt("Device list file (one IP address per line)")
                .interact_text()
                .map_err(util::prompt_err)?;

            let call_home: String = Input::new()
                .with_prompt("Call-home profile name to configure")
                .interact_text()
                .map_err(util::prompt_err)?;

            let ssm_url: String = Input::new()
                .with_prompt("Smart Software Manager URL")
                .interact_text()
                .map_err(util::prompt_err)?;

            // 3. Registration token
            let token_value =
                rpassword::prompt_password("Registration token: ").map_err(util::prompt_err)?;
            if token_value.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "registration token cannot be empty".into(),
                });
            }
            let token = prompt_keyring_storage(
                &token_value,
                &format!("{profile_name}/token"),
                "Where to store the registration token?",
                "Token",
            )?;

            // 4. Device credentials (optional -- `run` prompts when missing)
            let (username, password) = if util::confirm("Store device credentials now?", false)? {
                let user: String = Input::new()
                    .with_prompt("Username")
                    .interact_text()
                    .map_err(util::prompt_err)?;
                let pass = rpassword::prompt_password("Password: ").map_err(util::prompt_err)?;
                if user.is_empty() || pass.is_empty() {
                    return Err(CliError::Validation {
                        field: "credentials".into(),
                        reason: "username and password cannot be empty".into(),
                    });
                }
                let password_field = prompt_keyring_storage(
                    &pass,
                    &format!("{profile_name}/password"),
                    "Where to store the password?",
                    "Password",
                )?;
                (Some(user), password_field)
            } else {
                (None, None)
            };

            let enable_secret = if util::confirm("Store an enable password?", false)? {
                let secret =
                    rpassword::prompt_password("Enable Password: ").map_err(util::prompt_err)?;
                prompt_keyring_storage(
                    &secret,
                    &format!("{profile_name}/enable"),
                    "Where to store the enable password?",
                    "Enable password",
                )?
            } else {
                None
            };

            // 5. Build profile and config
            let profile = Profile {
                device_list: Some(device_list.into()),
                profile_name: Some(call_home),
                ssm_url: Some(ssm_url),
                token,
                username,
                password,
                enable_secret,
                ..Profile::default()
            };

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles,
            };

            // 6. Write config
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Check it: licpush plan");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            output::print_output(&format_config_redacted(&cfg), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "device_list" | "device-list" => profile.device_list = Some(value.into()),
                "profile_name" | "profile-name" => profile.profile_name = Some(value),
                "ssm_url" | "ssm-url" => profile.ssm_url = Some(value),
                "token" => profile.token = Some(value),
                "token_env" | "token-env" => profile.token_env = Some(value),
                "username" => profile.username = Some(value),
                "remove_default_profile" | "remove-default-profile" => {
                    profile.remove_default_profile =
                        value.parse().map_err(|_| CliError::Validation {
                            field: "remove_default_profile".into(),
                            reason: "must be 'true' or 'false'".into(),
                        })?;
                }
                "default_profile_name" | "default-profile-name" => {
                    profile.default_profile_name = value;
                }
                "port" => {
                    profile.port = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "port".into(),
                        reason: "must be a port number".into(),
                    })?);
                }
                "timeout" => {
                    profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "timeout".into(),
                        reason: "must be a number (seconds)".into(),
                    })?);
                }
                "legacy_algorithms" | "legacy-algorithms" => {
                    profile.legacy_algorithms =
                        value.parse().map_err(|_| CliError::Validation {
                            field: "legacy_algorithms".into(),
                            reason: "must be 'true' or 'false'".into(),
                        })?;
                }
                "password" | "enable_secret" | "enable-secret" => {
                    return Err(CliError::Validation {
                        field: key,
                        reason: "store secrets with: licpush config set-password".into(),
                    });
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: device_list, \
                             profile_name, ssm_url, token, token_env, username, \
                             remove_default_profile, default_profile_name, port, \
                             timeout, legacy_algorithms"
                        ),
                    });
                }
            }

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: licpush config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { kind } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            config::require_profile(&cfg, &profile_name)?;

            let (suffix, label) = match kind {
                SecretKind::Password => ("password", "Password: "),
                SecretKind::Enable => ("enable", "Enable Password: "),
                SecretKind::Token => ("token", "Registration token: "),
            };

            let secret = rpassword::prompt_password(label).map_err(util::prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            store_keyring_secret(&format!("{profile_name}/{suffix}"), &secret, suffix)?;
            eprintln!("✓ Secret stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
