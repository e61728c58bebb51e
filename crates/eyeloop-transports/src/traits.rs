// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transport trait definitions
//!
//! These traits define the common interface for all transport implementations.
//! Only the client roles a device controller needs are modeled.

use crate::common::TransportResult;
use async_trait::async_trait;

/// Base transport trait - implemented by all transports
#[async_trait]
pub trait Transport: Send {
    /// Connect the transport
    async fn start(&mut self) -> TransportResult<()>;

    /// Disconnect the transport
    async fn stop(&mut self) -> TransportResult<()>;

    /// Check if transport is running
    fn is_running(&self) -> bool;

    /// Get transport name/type
    fn transport_type(&self) -> &str;
}

/// Push side of a one-way channel
///
/// Fire-and-forget: `Ok` means the message was handed to the transport, not
/// that the peer received it.
#[async_trait]
pub trait Push: Transport {
    async fn push(&mut self, data: &[u8]) -> TransportResult<()>;
}

/// Subscriber side of a one-way broadcast channel
#[async_trait]
pub trait Subscriber: Transport {
    /// Add a topic prefix filter; `""` accepts everything
    async fn subscribe(&mut self, topic: &str) -> TransportResult<()>;

    /// Wait for the next message and return its payload
    ///
    /// Multipart messages yield their last frame.
    ///
    /// # Errors
    /// `ConnectionClosed` once the channel can never deliver again.
    async fn receive(&mut self) -> TransportResult<Vec<u8>>;
}
