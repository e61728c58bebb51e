// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-role device channels
//!
//! - [`ConfigChannel`]: one-shot configuration and actuation commands
//! - [`LivenessService`]: periodic empty keepalive pushes
//! - [`ErrorListener`]: device-reported faults, logged as text

use std::time::Duration;

use eyeloop_transports::Subscriber;

use crate::core::error::Result;
use crate::reconnect::{connect_with_backoff, ReconnectionStrategy};

pub mod config;
pub mod errors;
pub mod liveness;

pub use config::{ConfigChannel, DeliveryStats};
pub use errors::ErrorListener;
pub use liveness::LivenessService;

/// Pause after a receive error that did not close the channel
pub(crate) const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Connect with backoff, then subscribe to every topic
pub(crate) async fn subscribe_all(
    subscriber: &mut dyn Subscriber,
    strategy: &mut ReconnectionStrategy,
    name: &str,
) -> Result<()> {
    connect_with_backoff(&mut *subscriber, strategy, name).await?;
    subscriber.subscribe("").await?;
    Ok(())
}
