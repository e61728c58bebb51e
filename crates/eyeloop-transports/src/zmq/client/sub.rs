// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ZMQ SUB pattern (client-side publish-subscribe)
//!
//! SUB sockets carry the inbound device roles. Publishers may send either a
//! single frame or `[topic, data]`; the last frame is always the payload.

use crate::common::{TransportConfig, TransportError, TransportResult};
use crate::traits::{Subscriber, Transport};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info, trace};
use zeromq::{Socket, SocketRecv, SubSocket};

/// ZMQ SUB socket implementation (subscriber)
pub struct ZmqSub {
    config: TransportConfig,
    socket: Option<SubSocket>,
}

impl ZmqSub {
    /// Create a new SUB socket
    pub fn new(config: TransportConfig) -> TransportResult<Self> {
        config.validate().map_err(TransportError::InvalidConfig)?;

        Ok(Self {
            config,
            socket: None,
        })
    }

    /// Create with default options
    pub fn with_address(address: impl Into<String>) -> TransportResult<Self> {
        Self::new(TransportConfig::new(address))
    }
}

#[async_trait]
impl Transport for ZmqSub {
    async fn start(&mut self) -> TransportResult<()> {
        if self.socket.is_some() {
            return Err(TransportError::AlreadyRunning);
        }

        let mut socket = SubSocket::new();
        let connect = socket.connect(&self.config.address);
        let result = match self.config.connect_timeout {
            Some(limit) => timeout(limit, connect)
                .await
                .map_err(|_| TransportError::Timeout)?,
            None => connect.await,
        };
        result.map_err(|e| {
            TransportError::ConnectFailed(format!("{}: {}", self.config.address, e))
        })?;

        self.socket = Some(socket);

        info!("[ZMQ-SUB] Connected to {}", self.config.address);

        Ok(())
    }

    async fn stop(&mut self) -> TransportResult<()> {
        if let Some(socket) = self.socket.take() {
            for err in socket.close().await {
                debug!("[ZMQ-SUB] Close error on {}: {}", self.config.address, err);
            }
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.socket.is_some()
    }

    fn transport_type(&self) -> &str {
        "zmq-sub"
    }
}

#[async_trait]
impl Subscriber for ZmqSub {
    async fn subscribe(&mut self, topic: &str) -> TransportResult<()> {
        let socket = self.socket.as_mut().ok_or(TransportError::NotRunning)?;
        socket.subscribe(topic).await?;
        debug!(
            "[ZMQ-SUB] Subscribed to '{}' on {}",
            topic, self.config.address
        );
        Ok(())
    }

    async fn receive(&mut self) -> TransportResult<Vec<u8>> {
        let socket = self.socket.as_mut().ok_or(TransportError::NotRunning)?;

        let message = socket
            .recv()
            .await
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;

        let mut frames = message.into_vec();
        let payload = frames
            .pop()
            .ok_or_else(|| TransportError::ReceiveFailed("message has no frames".to_string()))?;

        trace!(
            "[ZMQ-SUB] Received {} bytes ({} frames) from {}",
            payload.len(),
            frames.len() + 1,
            self.config.address
        );

        Ok(payload.to_vec())
    }
}
