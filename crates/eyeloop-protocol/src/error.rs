// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the protocol layer

/// Result type alias using ProtocolError
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while resolving endpoints or moving messages across the wire
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// Channel addresses cannot be derived from the device identity
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// An inbound detection payload could not be decoded
    #[error("Malformed detection payload: {0}")]
    MalformedDetection(String),

    /// An inbound configuration payload could not be decoded
    #[error("Malformed configuration payload: {0}")]
    MalformedConfig(String),

    /// LED frame does not match the device's LED count
    #[error("Invalid LED frame: expected {expected} entries, got {actual}")]
    InvalidFrame { expected: usize, actual: usize },

    /// Outbound message could not be serialized
    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl From<prost::DecodeError> for ProtocolError {
    fn from(err: prost::DecodeError) -> Self {
        ProtocolError::MalformedDetection(err.to_string())
    }
}
