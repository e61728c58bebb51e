// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # eyeloop-transports
//!
//! Channel capabilities used to talk to a device. A device exposes two
//! outbound roles (config, keepalive) and two inbound roles (error, data):
//!
//! - **Push**: one-way, fire-and-forget sender (ZMQ PUSH)
//! - **Subscriber**: one-way receiver with a topic filter (ZMQ SUB)
//!
//! ## Feature Flags
//!
//! - `zmq-client` (default): ZMQ PUSH/SUB clients on the pure-Rust `zeromq` crate
//!
//! The [`memory`] module is always available and provides in-process
//! PUSH/SUB pairs with the same semantics, used to drive sessions without a
//! device.
//!
//! ## Example
//!
//! ```no_run
//! use eyeloop_transports::prelude::*;
//!
//! # async fn run() -> TransportResult<()> {
//! let mut data = ZmqSub::with_address("tcp://127.0.0.1:22016")?;
//! data.start().await?;
//! data.subscribe("").await?;
//!
//! loop {
//!     let payload = data.receive().await?;
//!     println!("{} bytes", payload.len());
//! }
//! # }
//! ```

pub mod common;
pub mod memory;
pub mod traits;

#[cfg(feature = "zmq-client")]
pub mod zmq;

pub use common::{TransportConfig, TransportError, TransportResult};
pub use traits::{Push, Subscriber, Transport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::common::*;
    pub use crate::traits::*;

    pub use crate::memory::{MemoryPush, MemorySub};

    #[cfg(feature = "zmq-client")]
    pub use crate::zmq::client::*;
}
