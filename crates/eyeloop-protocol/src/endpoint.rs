// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Device endpoint addressing
//!
//! Every device is identified by a host and a base port. The channel
//! mapping is fixed:
//!
//! | Port | Role | Direction |
//! |---|---|---|
//! | `base` | configuration | outbound (PUSH) |
//! | `base + 1` | keepalive | outbound (PUSH) |
//! | `base + 2` | error | inbound (SUB) |
//! | `base + 3` | data | inbound (SUB) |

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest base port whose data channel (`base + 3`) still fits in a u16
pub const MAX_BASE_PORT: u16 = u16::MAX - 3;

/// One of the four logical channels a device exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelRole {
    Config,
    Keepalive,
    Error,
    Data,
}

impl ChannelRole {
    /// Port offset from the device base port
    pub fn offset(self) -> u16 {
        match self {
            ChannelRole::Config => 0,
            ChannelRole::Keepalive => 1,
            ChannelRole::Error => 2,
            ChannelRole::Data => 3,
        }
    }

    /// True for channels this controller writes to
    pub fn is_outbound(self) -> bool {
        matches!(self, ChannelRole::Config | ChannelRole::Keepalive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelRole::Config => "config",
            ChannelRole::Keepalive => "keepalive",
            ChannelRole::Error => "error",
            ChannelRole::Data => "data",
        }
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved device identity. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceEndpoint {
    host: String,
    base_port: u16,
}

impl DeviceEndpoint {
    /// Resolve a device identity into its channel addresses.
    ///
    /// The base port is taken as a wide integer so raw values from
    /// configuration files and environment variables can be rejected here
    /// instead of silently wrapping.
    ///
    /// # Errors
    /// `InvalidEndpoint` if the host is empty, the base port is not
    /// positive, or `base_port + 3` leaves the valid port range.
    pub fn resolve(host: impl Into<String>, base_port: i64) -> ProtocolResult<Self> {
        let host = host.into();
        let trimmed = host.trim();
        if trimmed.is_empty() {
            return Err(ProtocolError::InvalidEndpoint(
                "host cannot be empty".to_string(),
            ));
        }
        if base_port <= 0 {
            return Err(ProtocolError::InvalidEndpoint(format!(
                "base port must be positive, got {}",
                base_port
            )));
        }
        if base_port > i64::from(MAX_BASE_PORT) {
            return Err(ProtocolError::InvalidEndpoint(format!(
                "base port {} leaves no room for its data channel (max {})",
                base_port, MAX_BASE_PORT
            )));
        }

        Ok(Self {
            host: trimmed.to_string(),
            base_port: base_port as u16,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_port(&self) -> u16 {
        self.base_port
    }

    /// Port for a channel role
    pub fn port(&self, role: ChannelRole) -> u16 {
        // resolve() guarantees base_port + 3 <= u16::MAX
        self.base_port + role.offset()
    }

    /// ZMQ address (`tcp://host:port`) for a channel role
    pub fn address(&self, role: ChannelRole) -> String {
        format!("tcp://{}:{}", self.host, self.port(role))
    }

    pub fn config_address(&self) -> String {
        self.address(ChannelRole::Config)
    }

    pub fn keepalive_address(&self) -> String {
        self.address(ChannelRole::Keepalive)
    }

    pub fn error_address(&self) -> String {
        self.address(ChannelRole::Error)
    }

    pub fn data_address(&self) -> String {
        self.address(ChannelRole::Data)
    }

    /// Inclusive port range occupied by this device's channels
    pub fn port_range(&self) -> std::ops::RangeInclusive<u16> {
        self.base_port..=self.port(ChannelRole::Data)
    }
}

impl fmt::Display for DeviceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.base_port)
    }
}
