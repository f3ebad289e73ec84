//! Console progress: run narration driven by engine events.
//!
//! Renders a device-by-device transcript over an indicatif bar: a bold
//! header per device, one line per stage, green/red outcome lines. All
//! text goes through `ProgressBar::println` so it never collides with
//! the bar itself.

use indicatif::{ProgressBar, ProgressStyle};

use licpush_core::{DeviceOutcome, FailureKind, ProgressEvent, ProgressSink, StageName};

use crate::output;

pub struct ConsoleProgress {
    bar: ProgressBar,
    default_profile_name: String,
    color: bool,
    quiet: bool,
}

impl ConsoleProgress {
    pub fn new(default_profile_name: String, color: bool, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let style = ProgressStyle::with_template("{msg} {bar:40} {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            ProgressBar::new(0)
                .with_style(style)
                .with_message("Working...")
        };

        Self {
            bar,
            default_profile_name,
            color,
            quiet,
        }
    }

    fn say(&self, line: &str) {
        if !self.quiet {
            self.bar.println(line);
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_event(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { total } => {
                self.bar.set_length(total as u64);
            }

            ProgressEvent::DeviceStarted { address, .. } => {
                self.say("");
                self.say(&output::bold(&format!("> Working on {address}"), self.color));
            }

            ProgressEvent::Connecting { .. } => self.say("Connecting to device..."),

            ProgressEvent::Connected { .. } => self.say(&output::green("Connected", self.color)),

            ProgressEvent::StageStarted { stage, .. } => match stage {
                StageName::RemoveDefaultProfile => self.say(&format!(
                    "Removing default call-home profile {}",
                    self.default_profile_name
                )),
                StageName::ApplyProfile => self.say("Sending new config..."),
                StageName::RegisterLicense => self.say("Requesting license registration..."),
            },

            ProgressEvent::StageCompleted { stage, .. } => {
                let line = match stage {
                    StageName::RemoveDefaultProfile => "Default profile removed",
                    StageName::ApplyProfile => "Configuration applied",
                    StageName::RegisterLicense => "Request succeeded",
                };
                self.say(&output::green(line, self.color));
            }

            ProgressEvent::DeviceCompleted { outcome, .. } => {
                match outcome {
                    DeviceOutcome::Success => self.say("Done!"),
                    DeviceOutcome::Failed(reason) => {
                        let line = match reason.kind {
                            FailureKind::Connect
                            | FailureKind::Authentication
                            | FailureKind::Privilege => "Failed to connect.",
                            FailureKind::Stage(StageName::RemoveDefaultProfile) => {
                                "Config removal failed"
                            }
                            FailureKind::Stage(StageName::ApplyProfile) => "Config failed",
                            FailureKind::Stage(StageName::RegisterLicense) => {
                                "Failed to register license"
                            }
                        };
                        self.say(&output::red(line, self.color));
                    }
                }
                self.bar.inc(1);
            }

            ProgressEvent::RunFinished { .. } => self.bar.finish(),
        }
    }
}
