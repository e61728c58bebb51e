// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Common error types for all transports

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport-agnostic error type
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to connect client socket
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    /// Failed to send message
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Failed to receive message
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// Bounded operation did not complete in time
    #[error("Operation timed out")]
    Timeout,

    /// Peer side of the channel is gone
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Transport is not running")]
    NotRunning,

    #[error("Transport is already running")]
    AlreadyRunning,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Message too large: {size} bytes (max: {max_size})")]
    MessageTooLarge { size: usize, max_size: usize },

    /// Transport-specific error
    #[cfg(feature = "zmq-client")]
    #[error("ZMQ error: {0}")]
    Zmq(#[from] zeromq::ZmqError),
}

impl TransportError {
    /// True when retrying the same operation later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectFailed(_) | Self::SendFailed(_) | Self::Timeout => true,
            #[cfg(feature = "zmq-client")]
            Self::Zmq(_) => true,
            _ => false,
        }
    }
}
