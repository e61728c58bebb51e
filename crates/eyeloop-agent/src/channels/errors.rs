// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Device error channel
//!
//! Payloads are opaque text with no correlation to requests. Every payload
//! is logged; the listener only ends when the channel closes or the session
//! stops it. The socket connects inside the listener task, backing off while
//! the device is unreachable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use eyeloop_transports::{Subscriber, TransportError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{subscribe_all, RECEIVE_ERROR_BACKOFF};
use crate::core::error::{AgentError, Result};
use crate::reconnect::ReconnectionStrategy;

/// Passive listener on a device's error channel
pub struct ErrorListener {
    label: String,
    subscriber: Option<Box<dyn Subscriber>>,
    strategy: ReconnectionStrategy,
    forward: Option<mpsc::Sender<String>>,
    received: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl ErrorListener {
    pub fn new(label: impl Into<String>, subscriber: Box<dyn Subscriber>) -> Self {
        Self {
            label: label.into(),
            subscriber: Some(subscriber),
            strategy: ReconnectionStrategy::new(500, 0),
            forward: None,
            received: Arc::new(AtomicU64::new(0)),
            handle: None,
        }
    }

    /// Backoff between failed connects
    pub fn with_reconnection(mut self, strategy: ReconnectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Also hand every error message to `tx`
    ///
    /// Messages are dropped when `tx` is full; the listener never waits on it.
    pub fn with_forwarding(mut self, tx: mpsc::Sender<String>) -> Self {
        self.forward = Some(tx);
        self
    }

    /// Spawn the task that connects, subscribes to everything and receives
    pub fn start(&mut self) -> Result<()> {
        let mut subscriber = self.subscriber.take().ok_or(AgentError::AlreadyRunning)?;

        let label = self.label.clone();
        let mut strategy = self.strategy.clone();
        let forward = self.forward.clone();
        let received = Arc::clone(&self.received);

        self.handle = Some(tokio::spawn(async move {
            if let Err(e) = subscribe_all(subscriber.as_mut(), &mut strategy, &label).await {
                warn!("[ERROR-CHANNEL] Not listening on {}: {}", label, e);
                return;
            }

            loop {
                match subscriber.receive().await {
                    Ok(payload) => {
                        let message = String::from_utf8_lossy(&payload).into_owned();
                        received.fetch_add(1, Ordering::Relaxed);
                        warn!("[ERROR-CHANNEL] {} reported: {}", label, message);

                        if let Some(tx) = &forward {
                            if tx.try_send(message).is_err() {
                                debug!(
                                    "[ERROR-CHANNEL] Forward queue unavailable, message dropped"
                                );
                            }
                        }
                    }
                    Err(TransportError::ConnectionClosed | TransportError::NotRunning) => {
                        debug!("[ERROR-CHANNEL] {} closed", label);
                        break;
                    }
                    Err(e) => {
                        warn!("[ERROR-CHANNEL] Receive on {} failed: {}", label, e);
                        tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                    }
                }
            }
        }));

        debug!("[ERROR-CHANNEL] Listening on {}", self.label);
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            debug!("[ERROR-CHANNEL] Stopped listening on {}", self.label);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn errors_received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

impl Drop for ErrorListener {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Flaky;
    use eyeloop_transports::memory;
    use eyeloop_transports::{Push, Transport};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test]
    async fn test_errors_are_surfaced_as_text() {
        let (mut push, sub) = memory::pair("errors");
        push.start().await.unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let mut listener = ErrorListener::new("sensor", Box::new(sub)).with_forwarding(tx);
        listener.start().unwrap();

        push.push(b"camera not found").await.unwrap();
        push.push(&[0x66, 0x6f, 0xff]).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), "camera not found");
        assert_eq!(rx.recv().await.unwrap(), "fo\u{FFFD}");
        assert_eq!(listener.errors_received(), 2);

        listener.stop().await;
        assert!(!listener.is_running());
    }

    #[tokio::test]
    async fn test_listener_ends_when_channel_closes() {
        let (push, sub) = memory::pair("errors");
        let mut listener = ErrorListener::new("sensor", Box::new(sub));
        listener.start().unwrap();

        drop(push);
        tokio::time::timeout(Duration::from_secs(1), async {
            while listener.is_running() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(listener.errors_received(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listens_once_the_device_is_reachable() {
        let (mut push, sub) = memory::pair("errors");
        push.start().await.unwrap();
        let sub = Flaky::new(sub, 2);
        let attempts = sub.attempts();

        let (tx, mut rx) = mpsc::channel(8);
        let mut listener = ErrorListener::new("sensor", Box::new(sub))
            .with_reconnection(ReconnectionStrategy::new(100, 0))
            .with_forwarding(tx);
        listener.start().unwrap();

        push.push(b"camera busy").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), "camera busy");
        assert_eq!(attempts.load(Ordering::Relaxed), 3);
        assert!(listener.is_running());

        listener.stop().await;
    }
}
