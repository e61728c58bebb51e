// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connection retry with exponential backoff

use std::time::Duration;

use eyeloop_transports::Transport;
use tracing::{info, warn};

use crate::core::error::Result;

/// Backoff ceiling
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Reconnection strategy with exponential backoff
#[derive(Debug, Clone)]
pub struct ReconnectionStrategy {
    base_backoff_ms: u64,
    max_backoff_ms: u64,
    current_attempt: u32,
    /// Maximum retry attempts (0 = infinite)
    max_attempts: u32,
}

impl ReconnectionStrategy {
    /// Create a new reconnection strategy
    ///
    /// # Arguments
    /// * `base_backoff_ms` - Initial backoff duration in milliseconds
    /// * `max_attempts` - Maximum retry attempts (0 = infinite)
    pub fn new(base_backoff_ms: u64, max_attempts: u32) -> Self {
        Self {
            base_backoff_ms,
            max_backoff_ms: MAX_BACKOFF_MS,
            current_attempt: 0,
            max_attempts,
        }
    }

    /// Next backoff (`base * 2^(attempt - 1)`, capped), or None once exhausted
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        self.current_attempt += 1;

        let exp = 2u64.saturating_pow(self.current_attempt - 1);
        let backoff_ms = self
            .base_backoff_ms
            .saturating_mul(exp)
            .min(self.max_backoff_ms);

        Some(Duration::from_millis(backoff_ms))
    }

    /// Reset after a successful connection
    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }

    pub fn attempt_number(&self) -> u32 {
        self.current_attempt
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_attempts > 0 && self.current_attempt >= self.max_attempts
    }
}

/// Start `transport` unless it is already running, retrying transient
/// failures with backoff until the strategy runs out of attempts
///
/// # Example
/// ```ignore
/// let mut strategy = ReconnectionStrategy::new(500, 0);
/// connect_with_backoff(subscriber.as_mut(), &mut strategy, "tcp://10.0.0.7:22016").await?;
/// subscriber.subscribe("").await?;
/// ```
pub async fn connect_with_backoff<T>(
    transport: &mut T,
    strategy: &mut ReconnectionStrategy,
    name: &str,
) -> Result<()>
where
    T: Transport + ?Sized,
{
    loop {
        if transport.is_running() {
            strategy.reset();
            return Ok(());
        }

        match transport.start().await {
            Ok(()) => {
                if strategy.attempt_number() > 0 {
                    info!(
                        "[RECONNECT] {} connected after {} retries",
                        name,
                        strategy.attempt_number()
                    );
                }
                strategy.reset();
                return Ok(());
            }
            Err(e) if e.is_transient() => match strategy.next_backoff() {
                Some(backoff) => {
                    warn!(
                        "[RECONNECT] {} failed (attempt {}): {} - retrying in {:?}",
                        name,
                        strategy.attempt_number(),
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                None => {
                    warn!(
                        "[RECONNECT] {} failed after {} retries - giving up",
                        name,
                        strategy.attempt_number()
                    );
                    return Err(e.into());
                }
            },
            Err(e) => return Err(e.into()),
        }
    }
}
