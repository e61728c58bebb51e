// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the device session

use eyeloop_config::ConfigError;
use eyeloop_protocol::ProtocolError;
use eyeloop_transports::TransportError;
use std::fmt;

/// Result type alias using AgentError
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that end (or prevent) a session
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Session already running")]
    AlreadyRunning,
}

/// A fire-and-forget send that did not go out
///
/// Logged and counted by callers, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendFailure {
    pub channel: String,
    pub reason: String,
}

impl SendFailure {
    pub fn new(channel: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            channel: channel.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for SendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Send on {} failed: {}", self.channel, self.reason)
    }
}

impl std::error::Error for SendFailure {}
