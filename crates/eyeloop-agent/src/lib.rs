// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # eyeloop-agent
//!
//! Device session for a vision sensor and an LED ring actuator.
//!
//! A session coordinates four independent channels on the sensor (config,
//! keepalive, error, data) and the config channel of the actuator:
//!
//! - **Liveness**: an empty keepalive at start and then every interval
//! - **Errors**: device-reported faults are logged, never acted on
//! - **Detections**: decoded in arrival order, malformed payloads dropped
//! - **Actuation**: a pure state machine turns each event into LED frames
//!   and sensor reconfigurations, sent fire-and-forget
//!
//! ## Usage
//!
//! ```rust,no_run
//! use eyeloop_agent::{DeviceSession, SessionConfig};
//! use eyeloop_config::EyeloopConfig;
//!
//! # async fn run() -> eyeloop_agent::Result<()> {
//! let config = SessionConfig::from_eyeloop_config(&EyeloopConfig::default())?;
//! let session = DeviceSession::connect(config)?;
//! let stats = session
//!     .run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! println!("{}", stats);
//! # Ok(())
//! # }
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod actuation;
pub mod channels;
pub mod core;
pub mod reconnect;
pub mod report;
pub mod session;
pub mod stream;

#[cfg(test)]
mod testing;

pub use actuation::{
    start_commands, transition, ActuationCommand, ActuationMachine, Behavior, GeometryMapping,
    GestureControl, Phase, SessionState,
};
pub use channels::{ConfigChannel, DeliveryStats, ErrorListener, LivenessService};
pub use crate::core::{AgentError, Result, SendFailure, SessionConfig};
pub use reconnect::{connect_with_backoff, ReconnectionStrategy};
pub use report::describe_event;
pub use session::{DeviceSession, SessionChannels, SessionStats};
pub use stream::{decode_payloads, DetectionStream};
