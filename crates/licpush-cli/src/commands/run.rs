//! The `run` command: apply licensing configuration to a device fleet.

use std::io::IsTerminal;

use dialoguer::Input;
use secrecy::SecretString;

use licpush_core::{Credentials, DeviceList, ProvisionRunner, SshConnector, StagePlan};

use crate::cli::{GlobalOpts, RunArgs};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;
use crate::progress::ConsoleProgress;

use super::util;

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_required()?;
    let profile_name = config::active_profile_name(global, &cfg);
    let profile = config::require_profile(&cfg, &profile_name)?;
    tracing::debug!(profile = %profile_name, "using profile");

    let settings = config::resolve_settings(profile, &profile_name, global)?;
    let plan = StagePlan::from_settings(&settings)?;

    let list_path = config::resolve_device_list_path(global, profile).ok_or_else(|| {
        CliError::NoDeviceList {
            profile: profile_name.clone(),
        }
    })?;

    if !global.quiet {
        println!("Loading device list...");
    }
    let devices = DeviceList::load(&list_path)?;
    if !global.quiet {
        println!(
            "Devices loaded: {} valid IP addresses & {} invalid.",
            devices.valid().len(),
            devices.invalid().len()
        );
    }

    let credentials = collect_credentials(profile, &profile_name, global)?;
    let options = config::resolve_ssh_options(global, profile, &cfg.defaults);
    let color = output::should_color(&global.color);

    let runner = ProvisionRunner::new(SshConnector::new(options), plan);
    let mut sink =
        ConsoleProgress::new(settings.default_profile_name.clone(), color, global.quiet);
    let report = runner.run(&devices, &credentials, &mut sink).await;

    let summary = output::render_summary(&report, color);
    output::print_output(&summary, global.quiet);

    // A completed run exits 0 even when some devices failed -- the report
    // is the product, and partial success is still a result.
    if should_print_details(&args, global)? {
        let table = output::render_report_table(&report, color);
        output::print_output(&format!("\n{table}"), global.quiet);
    }

    Ok(())
}

/// Decide whether to print the per-device table, prompting when allowed.
fn should_print_details(args: &RunArgs, global: &GlobalOpts) -> Result<bool, CliError> {
    if args.details {
        return Ok(true);
    }
    if args.no_details || global.quiet {
        return Ok(false);
    }
    if global.yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }

    eprintln!();
    util::confirm("Print details?", false)
}

/// Assemble SSH credentials from flags, stored secrets, and prompts.
///
/// Prompting only happens on a terminal; in a pipeline a missing username
/// or password is an error rather than a hang.
fn collect_credentials(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<Credentials, CliError> {
    let stored_username = global.username.clone().or_else(|| profile.username.clone());
    let stored_password = config::stored_password(profile, profile_name);
    let stored_enable = config::stored_enable_secret(profile, profile_name);

    let (stored_username, stored_password) = match (stored_username, stored_password) {
        (Some(username), Some(password)) => {
            return Ok(Credentials {
                username,
                password,
                enable_secret: stored_enable,
            });
        }
        partial => partial,
    };

    if !std::io::stdin().is_terminal() {
        return Err(CliError::NoCredentials {
            profile: profile_name.into(),
        });
    }

    eprintln!("Please provide device credentials:");

    let username = match stored_username {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(util::prompt_err)?,
    };

    let password = match stored_password {
        Some(secret) => secret,
        None => SecretString::from(
            rpassword::prompt_password("Password: ").map_err(util::prompt_err)?,
        ),
    };

    let enable_secret = match stored_enable {
        Some(secret) => Some(secret),
        None => {
            if util::confirm("Provide enable password?", false)? {
                Some(SecretString::from(
                    rpassword::prompt_password("Enable Password: ").map_err(util::prompt_err)?,
                ))
            } else {
                None
            }
        }
    };

    Ok(Credentials {
        username,
        password,
        enable_secret,
    })
}
