// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ZMQ transport implementations
//!
//! Client-side socket patterns a device controller needs:
//! - **Push-Pull**: PUSH (client) for the config and keepalive roles
//! - **Publish-Subscribe**: SUB (client) for the error and data roles
//!
//! ## Example
//!
//! ```no_run
//! use eyeloop_transports::zmq::client::ZmqPush;
//! use eyeloop_transports::traits::{Push, Transport};
//!
//! # async fn run() -> eyeloop_transports::TransportResult<()> {
//! let mut keepalive = ZmqPush::with_address("tcp://127.0.0.1:22014")?;
//! keepalive.start().await?;
//! keepalive.push(&[]).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{ZmqPush, ZmqSub};
