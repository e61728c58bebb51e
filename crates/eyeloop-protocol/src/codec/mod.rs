// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Message codec adapter
//!
//! Two message families cross the wire: configuration commands (outbound,
//! also used for actuation frames) and vision results (inbound). The codec is
//! a black box to the rest of the system; channels only see bytes.

mod json;
pub mod proto;

pub use json::JsonCodec;
pub use proto::ProtobufCodec;

use crate::command::ConfigCommand;
use crate::detection::DetectionEvent;
use crate::error::ProtocolResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Serializer for the two message families
pub trait MessageCodec: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn encode_config(&self, command: &ConfigCommand) -> ProtocolResult<Vec<u8>>;

    fn decode_config(&self, bytes: &[u8]) -> ProtocolResult<ConfigCommand>;

    fn encode_vision_result(&self, event: &DetectionEvent) -> ProtocolResult<Vec<u8>>;

    /// # Errors
    /// `MalformedDetection` for payloads that cannot be decoded, including
    /// detection records without a location.
    fn decode_vision_result(&self, bytes: &[u8]) -> ProtocolResult<DetectionEvent>;
}

/// Codec selection as it appears in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    #[default]
    Protobuf,
    Json,
}

impl CodecKind {
    pub fn build(self) -> Arc<dyn MessageCodec> {
        match self {
            CodecKind::Protobuf => Arc::new(ProtobufCodec),
            CodecKind::Json => Arc::new(JsonCodec),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "protobuf" | "proto" => Some(CodecKind::Protobuf),
            "json" => Some(CodecKind::Json),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_kind_from_name() {
        assert_eq!(CodecKind::from_name("Proto"), Some(CodecKind::Protobuf));
        assert_eq!(CodecKind::from_name("json"), Some(CodecKind::Json));
        assert_eq!(CodecKind::from_name("msgpack"), None);
        assert_eq!(CodecKind::default().build().name(), "protobuf");
    }
}
