// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Keepalive pings
//!
//! The device stops streaming when pings cease. A ping goes out as soon as
//! the service starts and then once per interval. The socket connects on
//! the first tick; a refused connect or a failed ping is logged and the next
//! tick tries again.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eyeloop_transports::{Push, Transport};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use crate::core::error::{AgentError, Result};

#[derive(Debug, Default)]
struct LivenessCounters {
    sent: AtomicU64,
    failed: AtomicU64,
}

/// Keepalive service for one device
pub struct LivenessService {
    label: String,
    interval: Duration,
    push: Option<Box<dyn Push>>,
    running: Arc<AtomicBool>,
    counters: Arc<LivenessCounters>,
    handle: Option<JoinHandle<()>>,
}

impl LivenessService {
    /// # Errors
    /// `InvalidConfig` for a zero interval.
    pub fn new(label: impl Into<String>, push: Box<dyn Push>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(AgentError::InvalidConfig(
                "keepalive interval must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            label: label.into(),
            interval,
            push: Some(push),
            running: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(LivenessCounters::default()),
            handle: None,
        })
    }

    /// Spawn the ping task; the first ping is sent immediately
    pub fn start(&mut self) -> Result<()> {
        let mut push = self.push.take().ok_or(AgentError::AlreadyRunning)?;

        self.running.store(true, Ordering::Relaxed);

        let label = self.label.clone();
        let interval = self.interval;
        let running = Arc::clone(&self.running);
        let counters = Arc::clone(&self.counters);

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !push.is_running() {
                    if let Err(e) = push.start().await {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!("[LIVENESS] Cannot reach {}: {}", label, e);
                        continue;
                    }
                }
                match push.push(&[]).await {
                    Ok(()) => {
                        counters.sent.fetch_add(1, Ordering::Relaxed);
                        trace!("[LIVENESS] Ping sent to {}", label);
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!("[LIVENESS] Failed to send keepalive to {}: {}", label, e);
                    }
                }
            }
        }));

        debug!(
            "[LIVENESS] Service started for {} (every {:?})",
            self.label, self.interval
        );
        Ok(())
    }

    /// Stop pinging; the push socket is dropped with the task
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            debug!("[LIVENESS] Service stopped for {}", self.label);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn pings_sent(&self) -> u64 {
        self.counters.sent.load(Ordering::Relaxed)
    }

    pub fn pings_failed(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }
}

impl Drop for LivenessService {
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

    #[tokio::test(start_paused = true)]
    async fn test_pings_at_start_and_every_interval() {
        let (push, mut sub) = memory::pair("keepalive");
        sub.start().await.unwrap();

        let mut liveness =
            LivenessService::new("keepalive", Box::new(push), Duration::from_secs(3)).unwrap();
        liveness.start().unwrap();

        // t = 0
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(sub.drain().len(), 1);

        // t = 3000, 6000, 9000
        tokio::time::sleep(Duration::from_millis(9000)).await;
        let pings = sub.drain();
        assert_eq!(pings.len(), 3);
        assert!(pings.iter().all(Vec::is_empty));
        assert_eq!(liveness.pings_sent(), 4);

        liveness.stop().await;
        assert!(!liveness.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_pinging() {
        let (push, sub) = memory::pair("keepalive");
        drop(sub);

        let mut liveness =
            LivenessService::new("keepalive", Box::new(push), Duration::from_secs(3)).unwrap();
        liveness.start().unwrap();

        tokio::time::sleep(Duration::from_millis(6001)).await;
        assert_eq!(liveness.pings_sent(), 0);
        assert_eq!(liveness.pings_failed(), 3);
        assert!(liveness.is_running());

        liveness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_connect_is_retried_next_tick() {
        let (push, mut sub) = memory::pair("keepalive");
        sub.start().await.unwrap();
        let push = Flaky::new(push, 2);
        let attempts = push.attempts();

        let mut liveness =
            LivenessService::new("keepalive", Box::new(push), Duration::from_secs(3)).unwrap();
        liveness.start().unwrap();

        // refused at 0 and 3 s, connected and pinging from 6 s
        tokio::time::sleep(Duration::from_millis(9001)).await;
        assert_eq!(attempts.load(Ordering::Relaxed), 3);
        assert_eq!(liveness.pings_failed(), 2);
        assert_eq!(liveness.pings_sent(), 2);
        assert_eq!(sub.drain().len(), 2);

        liveness.stop().await;
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let (push, _sub) = memory::pair("keepalive");
        assert!(matches!(
            LivenessService::new("keepalive", Box::new(push), Duration::ZERO),
            Err(AgentError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_start_twice() {
        let (push, _sub) = memory::pair("keepalive");
        let mut liveness =
            LivenessService::new("keepalive", Box::new(push), Duration::from_secs(3)).unwrap();
        liveness.start().unwrap();
        assert!(matches!(liveness.start(), Err(AgentError::AlreadyRunning)));
        liveness.stop().await;
    }
}
