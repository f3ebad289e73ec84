// licpush-ssh: Async SSH session driver for Cisco IOS-style device CLIs

pub mod detect;
pub mod error;
pub mod options;
pub mod session;

pub use error::Error;
pub use options::SshOptions;
pub use session::{CommandOutput, DeviceSession};
