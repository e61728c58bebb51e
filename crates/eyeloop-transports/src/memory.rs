// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-process transports
//!
//! [`pair`] returns a connected PUSH/SUB pair backed by an unbounded tokio
//! channel. Semantics follow the ZMQ roles they stand in for:
//!
//! - both ends must be started before use
//! - the subscriber only yields messages matching a subscribed prefix
//!   (nothing until the first `subscribe`)
//! - once the push end is dropped and the queue is drained, `receive`
//!   returns `ConnectionClosed`

use crate::common::{TransportConfig, TransportError, TransportResult};
use crate::traits::{Push, Subscriber, Transport};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::trace;

/// Create a connected in-memory PUSH/SUB pair
pub fn pair(label: impl Into<String>) -> (MemoryPush, MemorySub) {
    let label = label.into();
    let (tx, rx) = mpsc::unbounded_channel();
    (
        MemoryPush {
            label: label.clone(),
            config: TransportConfig::new(format!("inproc://{}", label)),
            tx,
            running: false,
        },
        MemorySub {
            label,
            rx,
            topics: Vec::new(),
            running: false,
        },
    )
}

/// Sending end of an in-memory pair
pub struct MemoryPush {
    label: String,
    config: TransportConfig,
    tx: mpsc::UnboundedSender<Vec<u8>>,
    running: bool,
}

impl MemoryPush {
    /// Apply a message size limit like a socket would
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.config = self.config.with_max_message_size(size);
        self
    }
}

#[async_trait]
impl Transport for MemoryPush {
    async fn start(&mut self) -> TransportResult<()> {
        if self.running {
            return Err(TransportError::AlreadyRunning);
        }
        self.running = true;
        Ok(())
    }

    async fn stop(&mut self) -> TransportResult<()> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn transport_type(&self) -> &str {
        "memory-push"
    }
}

#[async_trait]
impl Push for MemoryPush {
    async fn push(&mut self, data: &[u8]) -> TransportResult<()> {
        if !self.running {
            return Err(TransportError::NotRunning);
        }
        self.config.check_size(data.len())?;
        self.tx
            .send(data.to_vec())
            .map_err(|_| TransportError::SendFailed(format!("{}: receiver dropped", self.label)))?;
        trace!("[MEMORY] {} <- {} bytes", self.label, data.len());
        Ok(())
    }
}

/// Receiving end of an in-memory pair
pub struct MemorySub {
    label: String,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    topics: Vec<String>,
    running: bool,
}

impl MemorySub {
    /// Next queued payload without waiting, ignoring topic filters
    pub fn try_next(&mut self) -> Option<Vec<u8>> {
        self.rx.try_recv().ok()
    }

    /// Drain everything queued so far, ignoring topic filters
    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            out.push(message);
        }
        out
    }

    fn accepts(&self, message: &[u8]) -> bool {
        self.topics
            .iter()
            .any(|topic| message.starts_with(topic.as_bytes()))
    }
}

#[async_trait]
impl Transport for MemorySub {
    async fn start(&mut self) -> TransportResult<()> {
        if self.running {
            return Err(TransportError::AlreadyRunning);
        }
        self.running = true;
        Ok(())
    }

    async fn stop(&mut self) -> TransportResult<()> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn transport_type(&self) -> &str {
        "memory-sub"
    }
}

#[async_trait]
impl Subscriber for MemorySub {
    async fn subscribe(&mut self, topic: &str) -> TransportResult<()> {
        if !self.running {
            return Err(TransportError::NotRunning);
        }
        self.topics.push(topic.to_string());
        Ok(())
    }

    async fn receive(&mut self) -> TransportResult<Vec<u8>> {
        if !self.running {
            return Err(TransportError::NotRunning);
        }
        loop {
            let message = self.rx.recv().await.ok_or(TransportError::ConnectionClosed)?;
            if self.accepts(&message) {
                trace!("[MEMORY] {} -> {} bytes", self.label, message.len());
                return Ok(message);
            }
        }
    }
}
