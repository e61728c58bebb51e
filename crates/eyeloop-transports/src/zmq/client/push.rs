// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ZMQ PUSH pattern (client-side push-pull)
//!
//! PUSH sockets carry the outbound device roles. A PUSH send waits for a
//! connected peer, so every send is bounded by the configured send timeout.

use crate::common::{TransportConfig, TransportError, TransportResult};
use crate::traits::{Push, Transport};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info, trace};
use zeromq::{PushSocket, Socket, SocketSend, ZmqMessage};

/// ZMQ PUSH socket implementation (sender)
pub struct ZmqPush {
    config: TransportConfig,
    socket: Option<PushSocket>,
}

impl ZmqPush {
    /// Create a new PUSH socket
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
impl Transport for ZmqPush {
    async fn start(&mut self) -> TransportResult<()> {
        if self.socket.is_some() {
            return Err(TransportError::AlreadyRunning);
        }

        let mut socket = PushSocket::new();
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

        info!("[ZMQ-PUSH] Connected to {}", self.config.address);

        Ok(())
    }

    async fn stop(&mut self) -> TransportResult<()> {
        if let Some(socket) = self.socket.take() {
            for err in socket.close().await {
                debug!("[ZMQ-PUSH] Close error on {}: {}", self.config.address, err);
            }
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.socket.is_some()
    }

    fn transport_type(&self) -> &str {
        "zmq-push"
    }
}

#[async_trait]
impl Push for ZmqPush {
    async fn push(&mut self, data: &[u8]) -> TransportResult<()> {
        self.config.check_size(data.len())?;

        let limit = self.config.send_timeout;
        let socket = self.socket.as_mut().ok_or(TransportError::NotRunning)?;

        let send = socket.send(ZmqMessage::from(data.to_vec()));
        let result = match limit {
            Some(limit) => timeout(limit, send)
                .await
                .map_err(|_| TransportError::Timeout)?,
            None => send.await,
        };
        result.map_err(|e| TransportError::SendFailed(e.to_string()))?;

        trace!(
            "[ZMQ-PUSH] Sent {} bytes to {}",
            data.len(),
            self.config.address
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_creation() {
        let push = ZmqPush::with_address("tcp://127.0.0.1:30020");
        assert!(push.is_ok());
        assert!(ZmqPush::with_address("").is_err());
    }

    #[tokio::test]
    async fn test_push_requires_start() {
        let mut push = ZmqPush::with_address("tcp://127.0.0.1:30021").unwrap();
        assert!(!push.is_running());
        assert!(matches!(
            push.push(b"x").await,
            Err(TransportError::NotRunning)
        ));
    }
}
