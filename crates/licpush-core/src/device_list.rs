// Device list parsing: one address per line, validated up front.
//
// Validation happens before any network traffic so a typo in the list
// shows up in the report instead of as a confusing connect error. Order
// and duplicates are preserved exactly as written; the list is the
// operator's statement of what to touch.

use std::net::IpAddr;
use std::path::Path;

use tracing::debug;

use crate::error::EngineError;

/// A parsed device list: addresses that will be provisioned, and raw
/// entries that never will because they are not IP addresses.
#[derive(Debug, Clone, Default)]
pub struct DeviceList {
    valid: Vec<IpAddr>,
    invalid: Vec<String>,
}

impl DeviceList {
    /// Parse newline-separated addresses.
    ///
    /// Entries are trimmed; blank lines are skipped. Anything that does
    /// not parse as an IPv4 or IPv6 address lands in the invalid bucket
    /// verbatim. Input order is preserved in both buckets.
    pub fn parse(input: &str) -> Self {
        let mut list = Self::default();
        for line in input.lines() {
            let entry = line.trim();
            if entry.is_empty() {
                continue;
            }
            match entry.parse::<IpAddr>() {
                Ok(address) => list.valid.push(address),
                Err(_) => list.invalid.push(entry.to_string()),
            }
        }
        debug!(
            valid = list.valid.len(),
            invalid = list.invalid.len(),
            "device list parsed"
        );
        list
    }

    /// Read and parse a device list file.
    ///
    /// An unreadable file is the one fatal input error in the engine;
    /// there is nothing to provision without it.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let input =
            std::fs::read_to_string(path).map_err(|source| EngineError::DeviceListUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::parse(&input))
    }

    /// Addresses that will be provisioned, in input order.
    pub fn valid(&self) -> &[IpAddr] {
        &self.valid
    }

    /// Entries rejected during validation, in input order.
    pub fn invalid(&self) -> &[String] {
        &self.invalid
    }

    /// True when the file contained no usable addresses at all.
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }
}
