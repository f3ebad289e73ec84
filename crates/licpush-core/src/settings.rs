// ── Run inputs ──
//
// These types describe *what* to push and *as whom*. They carry
// credential data and the licensing constants, but never touch disk.
// The CLI resolves config files and prompts, then hands these in.

use secrecy::SecretString;

/// Name of the call-home profile Cisco ships enabled from the factory.
pub const DEFAULT_CALL_HOME_PROFILE: &str = "CiscoTAC-1";

/// Login material for every device in a run.
///
/// One credential set covers the whole batch; the devices being
/// provisioned share a deployment image and therefore a local account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    /// Secret for `enable` escalation. `None` means the account either
    /// lands in privileged EXEC directly or the run stays in user EXEC
    /// (and configuration stages will fail on their own).
    pub enable_secret: Option<SecretString>,
}

/// Licensing constants that parameterize the stage plan.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Remove the factory call-home profile before applying ours.
    pub remove_default_profile: bool,
    /// Name of the factory profile to remove.
    pub default_profile_name: String,
    /// Name of the call-home profile to create.
    pub profile_name: String,
    /// HTTP address of the Smart Software Manager satellite.
    pub ssm_url: String,
    /// Registration ID token issued by the satellite.
    pub token: SecretString,
}

impl RunSettings {
    /// Convenience constructor with the factory defaults filled in.
    pub fn new(profile_name: impl Into<String>, ssm_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            remove_default_profile: true,
            default_profile_name: DEFAULT_CALL_HOME_PROFILE.to_string(),
            profile_name: profile_name.into(),
            ssm_url: ssm_url.into(),
            token,
        }
    }
}
