// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Common configuration types for transports

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client socket configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Address to connect to
    pub address: String,

    /// Upper bound for establishing the connection (None = wait indefinitely)
    pub connect_timeout: Option<Duration>,

    /// Upper bound for a single send (None = wait indefinitely)
    pub send_timeout: Option<Duration>,

    /// Maximum outbound message size (None = unlimited)
    pub max_message_size: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:22013".to_string(),
            connect_timeout: Some(Duration::from_millis(5000)),
            send_timeout: Some(Duration::from_millis(1000)),
            max_message_size: Some(1024 * 1024),
        }
    }
}

impl TransportConfig {
    /// Create a new config with the given address
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = Some(size);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.address.trim().is_empty() {
            return Err("Address cannot be empty".to_string());
        }

        if self.connect_timeout.is_some_and(|t| t.is_zero()) {
            return Err("Connect timeout must be greater than 0".to_string());
        }

        if self.send_timeout.is_some_and(|t| t.is_zero()) {
            return Err("Send timeout must be greater than 0".to_string());
        }

        if let Some(max_size) = self.max_message_size {
            if max_size == 0 {
                return Err("Maximum message size must be greater than 0".to_string());
            }
        }

        Ok(())
    }

    /// Reject payloads above `max_message_size`
    pub(crate) fn check_size(&self, len: usize) -> crate::TransportResult<()> {
        match self.max_message_size {
            Some(max_size) if len > max_size => Err(crate::TransportError::MessageTooLarge {
                size: len,
                max_size,
            }),
            _ => Ok(()),
        }
    }
}
