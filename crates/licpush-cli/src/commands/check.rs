//! The `check` command: parse a device list without connecting to anything.

use licpush_core::DeviceList;

use crate::cli::{CheckArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub fn handle(args: CheckArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Positional file > --device-list / env > profile setting
    let path = match args.file.or_else(|| global.device_list.clone()) {
        Some(path) => path,
        None => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = config::require_profile(&cfg, &profile_name)?;
            profile
                .device_list
                .clone()
                .ok_or_else(|| CliError::NoDeviceList {
                    profile: profile_name,
                })?
        }
    };

    let devices = DeviceList::load(&path)?;

    if !global.quiet {
        println!(
            "Devices loaded: {} valid IP addresses & {} invalid.",
            devices.valid().len(),
            devices.invalid().len()
        );
        for address in devices.invalid() {
            println!("  invalid: {address}");
        }
    }

    Ok(())
}
