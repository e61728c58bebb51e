// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Outbound configuration channel
//!
//! Carries sensor configuration and actuation commands. [`ConfigChannel::send`]
//! never waits on the device: it encodes the command and queues it for a
//! delivery task that owns the socket. The task connects lazily, backs off
//! between failed connects and counts every command it could not deliver.
//! Nothing is retried.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eyeloop_protocol::{ConfigCommand, MessageCodec};
use eyeloop_transports::{Push, Transport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::core::error::{AgentError, Result, SendFailure};
use crate::reconnect::ReconnectionStrategy;

/// Commands waiting for delivery before `send` starts rejecting
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// How long `close` waits for queued commands to go out
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Delivery totals of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Commands handed to the transport
    pub delivered: u64,
    /// Of those, actuation frames
    pub frames: u64,
    /// Of those, detection-type requests
    pub reconfigurations: u64,
    /// Commands dequeued but not delivered
    pub failed: u64,
}

#[derive(Debug, Default)]
struct DeliveryCounters {
    delivered: AtomicU64,
    frames: AtomicU64,
    reconfigurations: AtomicU64,
    failed: AtomicU64,
}

impl DeliveryCounters {
    fn record(&self, kind: CommandKind) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        match kind {
            CommandKind::Frame => self.frames.fetch_add(1, Ordering::Relaxed),
            CommandKind::Detections => self.reconfigurations.fetch_add(1, Ordering::Relaxed),
            CommandKind::Other => 0,
        };
    }

    fn snapshot(&self) -> DeliveryStats {
        DeliveryStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            reconfigurations: self.reconfigurations.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CommandKind {
    Frame,
    Detections,
    Other,
}

impl CommandKind {
    fn of(command: &ConfigCommand) -> Self {
        if command.is_actuation() {
            Self::Frame
        } else if command.detection_types.is_some() {
            Self::Detections
        } else {
            Self::Other
        }
    }
}

struct Outbound {
    bytes: Vec<u8>,
    kind: CommandKind,
}

/// Socket owned by the delivery task
struct Link {
    label: String,
    push: Box<dyn Push>,
    strategy: ReconnectionStrategy,
    retry_at: Option<Instant>,
}

impl Link {
    /// Connect if the backoff allows it; fails fast while backing off
    async fn connect(&mut self) -> std::result::Result<(), SendFailure> {
        if self.push.is_running() {
            return Ok(());
        }
        if self.strategy.is_exhausted() {
            return Err(SendFailure::new(&self.label, "gave up connecting"));
        }
        if self.retry_at.is_some_and(|at| Instant::now() < at) {
            return Err(SendFailure::new(&self.label, "not connected"));
        }

        match self.push.start().await {
            Ok(()) => {
                if self.strategy.attempt_number() > 0 {
                    info!(
                        "[CONFIG] {} connected after {} retries",
                        self.label,
                        self.strategy.attempt_number()
                    );
                }
                self.strategy.reset();
                self.retry_at = None;
                Ok(())
            }
            Err(e) => {
                match self.strategy.next_backoff() {
                    Some(backoff) => {
                        warn!(
                            "[CONFIG] Connecting {} failed: {} - next attempt in {:?}",
                            self.label, e, backoff
                        );
                        self.retry_at = Some(Instant::now() + backoff);
                    }
                    None => warn!("[CONFIG] Connecting {} failed: {} - giving up", self.label, e),
                }
                Err(SendFailure::new(&self.label, e))
            }
        }
    }

    async fn deliver(&mut self, bytes: &[u8]) -> std::result::Result<(), SendFailure> {
        self.connect().await?;
        self.push
            .push(bytes)
            .await
            .map_err(|e| SendFailure::new(&self.label, e))
    }

    async fn close(&mut self) {
        if self.push.is_running() {
            if let Err(e) = self.push.stop().await {
                debug!("[CONFIG] Closing {} failed: {}", self.label, e);
            }
        }
    }
}

async fn run_delivery(
    mut link: Link,
    mut rx: mpsc::Receiver<Outbound>,
    counters: Arc<DeliveryCounters>,
) {
    if link.connect().await.is_ok() {
        debug!("[CONFIG] {} connected", link.label);
    }

    while let Some(outbound) = rx.recv().await {
        match link.deliver(&outbound.bytes).await {
            Ok(()) => {
                counters.record(outbound.kind);
                trace!("[CONFIG] {} <- {} bytes", link.label, outbound.bytes.len());
            }
            Err(failure) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!("[CONFIG] {}", failure);
            }
        }
    }

    link.close().await;
}

pub struct ConfigChannel {
    label: String,
    codec: Arc<dyn MessageCodec>,
    push: Option<Box<dyn Push>>,
    strategy: ReconnectionStrategy,
    queue_depth: usize,
    tx: Option<mpsc::Sender<Outbound>>,
    counters: Arc<DeliveryCounters>,
    handle: Option<JoinHandle<()>>,
}

impl ConfigChannel {
    /// The push transport may be unstarted; the delivery task connects it
    pub fn new(
        label: impl Into<String>,
        push: Box<dyn Push>,
        codec: Arc<dyn MessageCodec>,
    ) -> Self {
        Self {
            label: label.into(),
            codec,
            push: Some(push),
            strategy: ReconnectionStrategy::new(500, 0),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            tx: None,
            counters: Arc::new(DeliveryCounters::default()),
            handle: None,
        }
    }

    /// Backoff between failed connects
    pub fn with_reconnection(mut self, strategy: ReconnectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Spawn the delivery task
    pub fn start(&mut self) -> Result<()> {
        let push = self.push.take().ok_or(AgentError::AlreadyRunning)?;
        let (tx, rx) = mpsc::channel(self.queue_depth);

        let link = Link {
            label: self.label.clone(),
            push,
            strategy: self.strategy.clone(),
            retry_at: None,
        };
        self.handle = Some(tokio::spawn(run_delivery(link, rx, Arc::clone(&self.counters))));
        self.tx = Some(tx);
        Ok(())
    }

    /// Encode one command and queue it for delivery
    ///
    /// `Ok` means queued. Delivery failures show up in [`Self::stats`].
    pub fn send(&self, command: &ConfigCommand) -> std::result::Result<(), SendFailure> {
        let bytes = self
            .codec
            .encode_config(command)
            .map_err(|e| SendFailure::new(&self.label, e))?;
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| SendFailure::new(&self.label, "not running"))?;

        let size = bytes.len();
        tx.try_send(Outbound {
            bytes,
            kind: CommandKind::of(command),
        })
        .map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendFailure::new(
                &self.label,
                format!("{} commands already pending", self.queue_depth),
            ),
            mpsc::error::TrySendError::Closed(_) => SendFailure::new(&self.label, "not running"),
        })?;

        debug!(
            "[CONFIG] Queued {} command for {} ({} bytes)",
            if command.is_actuation() { "actuation" } else { "sensor" },
            self.label,
            size
        );
        Ok(())
    }

    pub fn stats(&self) -> DeliveryStats {
        self.counters.snapshot()
    }

    /// Stop accepting commands and wait up to [`DRAIN_TIMEOUT`] for the
    /// queue to drain
    pub async fn close(&mut self) {
        self.tx = None;
        if let Some(mut handle) = self.handle.take() {
            if tokio::time::timeout(DRAIN_TIMEOUT, &mut handle).await.is_err() {
                warn!(
                    "[CONFIG] {} did not drain within {:?}, pending commands dropped",
                    self.label, DRAIN_TIMEOUT
                );
                handle.abort();
                let _ = handle.await;
            }
        }
    }
}

impl Drop for ConfigChannel {
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
    use async_trait::async_trait;
    use eyeloop_protocol::{CodecKind, DetectionType, LedFrame, LedValue};
    use eyeloop_transports::{memory, TransportResult};

    fn off_frame() -> ConfigCommand {
        ConfigCommand::frame(LedFrame::uniform(35, LedValue::OFF).unwrap())
    }

    /// Connects, then never completes a send
    struct Stalled {
        running: bool,
    }

    #[async_trait]
    impl Transport for Stalled {
        async fn start(&mut self) -> TransportResult<()> {
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
            "stalled"
        }
    }

    #[async_trait]
    impl Push for Stalled {
        async fn push(&mut self, _data: &[u8]) -> TransportResult<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_send_encodes_with_codec() {
        let (push, mut sub) = memory::pair("config");
        let codec = CodecKind::Json.build();
        let mut channel = ConfigChannel::new("sensor-config", Box::new(push), Arc::clone(&codec));
        channel.start().unwrap();

        let command = ConfigCommand::detect([DetectionType::HandFist, DetectionType::HandPalm]);
        channel.send(&command).unwrap();
        channel.close().await;

        let sent = sub.try_next().unwrap();
        assert_eq!(codec.decode_config(&sent).unwrap(), command);
        assert_eq!(
            channel.stats(),
            DeliveryStats {
                delivered: 1,
                frames: 0,
                reconfigurations: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_is_counted_not_raised() {
        let (push, sub) = memory::pair("config");
        drop(sub);
        let mut channel =
            ConfigChannel::new("actuator-config", Box::new(push), CodecKind::Protobuf.build());
        channel.start().unwrap();

        assert!(channel.send(&off_frame()).is_ok());
        channel.close().await;

        assert_eq!(channel.stats().failed, 1);
        assert_eq!(channel.stats().frames, 0);
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (push, _sub) = memory::pair("config");
        let mut channel =
            ConfigChannel::new("sensor-config", Box::new(push), CodecKind::Protobuf.build());
        channel.start().unwrap();
        channel.close().await;

        let failure = channel
            .send(&ConfigCommand::detect([DetectionType::Face]))
            .unwrap_err();
        assert_eq!(failure.channel, "sensor-config");
        assert!(failure.reason.contains("not running"), "{}", failure);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_peer_fails_until_it_connects() {
        let (push, mut sub) = memory::pair("actuator");
        let push = Flaky::new(push, 1);
        let attempts = push.attempts();
        let mut channel =
            ConfigChannel::new("actuator-config", Box::new(push), CodecKind::Protobuf.build())
                .with_reconnection(ReconnectionStrategy::new(1000, 0));
        channel.start().unwrap();

        // first connect refused; inside the backoff window sends fail fast
        channel.send(&off_frame()).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(channel.stats().failed, 1);
        assert_eq!(attempts.load(Ordering::Relaxed), 1);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        channel.send(&off_frame()).unwrap();
        channel.close().await;

        assert_eq!(attempts.load(Ordering::Relaxed), 2);
        assert_eq!(channel.stats().frames, 1);
        assert_eq!(sub.drain().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_peer_never_blocks_send() {
        let mut channel = ConfigChannel::new(
            "actuator-config",
            Box::new(Stalled { running: false }),
            CodecKind::Protobuf.build(),
        )
        .with_queue_depth(4);
        channel.start().unwrap();

        let started = Instant::now();
        let rejected = (0..20)
            .filter(|_| channel.send(&off_frame()).is_err())
            .count();
        assert_eq!(started.elapsed(), Duration::ZERO);
        // at most one command in flight plus four queued
        assert!(rejected >= 15, "{} rejected", rejected);

        channel.close().await;
        assert!(started.elapsed() <= DRAIN_TIMEOUT + Duration::from_millis(10));
        assert_eq!(channel.stats().delivered, 0);
    }
}
