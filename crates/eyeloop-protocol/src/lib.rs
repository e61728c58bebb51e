// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # eyeloop-protocol
//!
//! Data model and wire contract shared by every eyeloop crate:
//!
//! - **Endpoint resolution**: one `(host, base_port)` device identity expands
//!   into the four channel addresses (config, keepalive, error, data).
//! - **Detections**: decoded vision results with tags, locations and
//!   recognition attributes, plus the label tables used to render them.
//! - **Actuation**: fixed-length LED frames and presence-aware configuration
//!   commands.
//! - **Codec**: the [`MessageCodec`] seam with a protobuf implementation
//!   (what the device speaks) and a JSON implementation.
//!
//! Nothing in this crate performs I/O.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod codec;
pub mod command;
pub mod detection;
pub mod endpoint;
pub mod error;
pub mod labels;
pub mod led;

pub use codec::{CodecKind, JsonCodec, MessageCodec, ProtobufCodec};
pub use command::{CameraParameters, ConfigCommand, SensorConfig};
pub use detection::{
    Attribute, AttributeKind, Detection, DetectionEvent, DetectionType, Emotion, Gender, Location,
};
pub use endpoint::{ChannelRole, DeviceEndpoint};
pub use error::{ProtocolError, ProtocolResult};
pub use led::{LedChannel, LedFrame, LedValue, EVERLOOP_LED_COUNT};
