// licpush-core: Provisioning engine between licpush-ssh and the CLI.

pub mod connect;
pub mod device_list;
pub mod error;
pub mod progress;
pub mod report;
pub mod runner;
pub mod settings;
pub mod stage;

// ── Primary re-exports ──────────────────────────────────────────────
pub use connect::{CommandOutput, Connector, DeviceChannel, SshConnector};
pub use device_list::DeviceList;
pub use error::{ChannelError, ConnectFailure, EngineError};
pub use progress::{NullSink, ProgressEvent, ProgressSink};
pub use report::{DeviceOutcome, FailureKind, FailureReason, RunReport};
pub use runner::ProvisionRunner;
pub use settings::{Credentials, DEFAULT_CALL_HOME_PROFILE, RunSettings};
pub use stage::{REDACTED_TOKEN, Stage, StageAction, StageName, StagePlan};
