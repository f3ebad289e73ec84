//! The `plan` command: print the configuration a run would send.
//!
//! Uses the redacted stage plan, so the registration token never
//! reaches the terminal.

use licpush_core::{StageAction, StagePlan};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_required()?;
    let profile_name = config::active_profile_name(global, &cfg);
    let profile = config::require_profile(&cfg, &profile_name)?;
    let settings = config::resolve_settings(profile, &profile_name, global)?;

    let plan = StagePlan::preview(&settings)?;

    use std::fmt::Write;
    let mut out = String::new();
    for stage in plan.stages() {
        let _ = writeln!(out, "{}:", stage.name);
        match &stage.action {
            StageAction::ConfigBatch(lines) => {
                for line in lines {
                    let _ = writeln!(out, "  {line}");
                }
            }
            StageAction::Command(command) => {
                let _ = writeln!(out, "  {command}");
            }
        }
        let _ = writeln!(out);
    }

    output::print_output(out.trim_end(), global.quiet);
    Ok(())
}
