// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # eyeloop
//!
//! Detection-driven controller for a vision sensor and an LED ring on a
//! remote device. The controller configures the camera, keeps the link
//! alive, consumes the detection stream and drives the ring through a
//! state machine.
//!
//! ## Crates
//!
//! - [`protocol`]: endpoints, detections, LED frames, wire codecs
//! - [`transports`]: ZMQ PUSH/SUB channels and in-memory stand-ins
//! - [`agent`]: the device session and actuation state machine
//! - [`config`]: `eyeloop_configuration.toml` loading and validation
//! - [`observability`]: logging setup and per-crate debug flags
//!
//! ## Usage
//!
//! ```rust,no_run
//! use eyeloop::prelude::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = load_config_or_default(None, None)?;
//! validate_config(&config)?;
//!
//! let session = DeviceSession::connect(SessionConfig::from_eyeloop_config(&config)?)?;
//! let stats = session.run().await?;
//! println!("{}", stats);
//! # Ok(())
//! # }
//! ```
//!
//! The `tools/` binaries (`gesture_everloop`, `face_everloop`,
//! `query_demographics`) are thin wrappers over [`controller`].

pub use eyeloop_agent as agent;
pub use eyeloop_config as config;
pub use eyeloop_observability as observability;
pub use eyeloop_protocol as protocol;
pub use eyeloop_transports as transports;

pub mod controller;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use eyeloop_agent::{
        ActuationCommand, ActuationMachine, Behavior, DeviceSession, Phase, SessionChannels,
        SessionConfig, SessionStats,
    };
    pub use eyeloop_config::{load_config_or_default, validate_config, BehaviorMode, EyeloopConfig};
    pub use eyeloop_observability::{init_logging, CrateDebugFlags};
    pub use eyeloop_protocol::{
        ConfigCommand, Detection, DetectionEvent, DetectionType, DeviceEndpoint, LedFrame,
        LedValue,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_facade_imports() {
        let config = EyeloopConfig::default();
        let session = SessionConfig::from_eyeloop_config(&config).unwrap();
        assert_eq!(session.sensor_endpoint, DeviceEndpoint::resolve("127.0.0.1", 22013).unwrap());
        assert!(matches!(session.behavior, Behavior::Gesture(_)));
    }
}
