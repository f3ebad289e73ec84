// ── Stage plan ──
//
// The fixed, ordered set of changes every device receives. Stages are
// built once per run from `RunSettings` and then applied verbatim to
// each device; there is no per-device templating.

use std::fmt;

use secrecy::ExposeSecret;

use crate::error::EngineError;
use crate::settings::RunSettings;

/// Placeholder used instead of the registration token in previews.
pub const REDACTED_TOKEN: &str = "********";

/// Identifies a stage in reports, events, and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    /// Strip the factory call-home profile.
    RemoveDefaultProfile,
    /// Configure the call-home profile pointing at the SSM satellite.
    ApplyProfile,
    /// Ask the device to register with its ID token.
    RegisterLicense,
}

impl StageName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RemoveDefaultProfile => "remove-default-profile",
            Self::ApplyProfile => "apply-profile",
            Self::RegisterLicense => "register-license",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a stage actually sends down the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    /// Configuration lines applied as one batch inside config mode.
    ConfigBatch(Vec<String>),
    /// A single operational command run at the EXEC prompt.
    Command(String),
}

/// One step of the per-device sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: StageName,
    pub action: StageAction,
}

/// The ordered stages applied to every device in a run.
///
/// A device must pass each stage before the next is attempted; the
/// first failure ends that device's sequence. The plan itself never
/// changes mid-run.
#[derive(Debug, Clone)]
pub struct StagePlan {
    stages: Vec<Stage>,
}

impl StagePlan {
    /// Build the executable plan, with the real token in place.
    pub fn from_settings(settings: &RunSettings) -> Result<Self, EngineError> {
        validate(settings)?;
        Ok(Self::build(settings, settings.token.expose_secret()))
    }

    /// Build a display copy of the plan with the token redacted.
    ///
    /// Safe to print; used by `licpush plan`.
    pub fn preview(settings: &RunSettings) -> Result<Self, EngineError> {
        validate(settings)?;
        Ok(Self::build(settings, REDACTED_TOKEN))
    }

    fn build(settings: &RunSettings, token: &str) -> Self {
        let mut stages = Vec::with_capacity(3);

        if settings.remove_default_profile {
            stages.push(Stage {
                name: StageName::RemoveDefaultProfile,
                action: StageAction::ConfigBatch(vec![
                    "call-home".to_string(),
                    format!("no profile {}", settings.default_profile_name),
                ]),
            });
        }

        stages.push(Stage {
            name: StageName::ApplyProfile,
            action: StageAction::ConfigBatch(vec![
                "call-home".to_string(),
                "no http secure server-identity-check".to_string(),
                format!("profile {}", settings.profile_name),
                "reporting smart-licensing-data".to_string(),
                "destination transport-method http".to_string(),
                format!("destination address http {}", settings.ssm_url),
                "destination preferred-msg-format xml".to_string(),
                "active".to_string(),
                "exit".to_string(),
            ]),
        });

        stages.push(Stage {
            name: StageName::RegisterLicense,
            action: StageAction::Command(format!("license smart register idtoken {token}")),
        });

        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Reject settings that would render a plan no device can accept.
fn validate(settings: &RunSettings) -> Result<(), EngineError> {
    if settings.profile_name.trim().is_empty() {
        return Err(EngineError::InvalidSettings {
            field: "profile_name",
            reason: "a call-home profile name is required".to_string(),
        });
    }
    if settings.ssm_url.trim().is_empty() {
        return Err(EngineError::InvalidSettings {
            field: "ssm_url",
            reason: "the SSM satellite URL is required".to_string(),
        });
    }
    if settings.token.expose_secret().trim().is_empty() {
        return Err(EngineError::InvalidSettings {
            field: "token",
            reason: "a registration ID token is required".to_string(),
        });
    }
    if settings.remove_default_profile && settings.default_profile_name.trim().is_empty() {
        return Err(EngineError::InvalidSettings {
            field: "default_profile_name",
            reason: "removal is enabled but no profile name is set".to_string(),
        });
    }
    Ok(())
}
