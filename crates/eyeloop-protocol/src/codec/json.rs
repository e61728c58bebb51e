// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::codec::MessageCodec;
use crate::command::ConfigCommand;
use crate::detection::DetectionEvent;
use crate::error::{ProtocolError, ProtocolResult};

/// JSON rendition of the domain types; absent fields are omitted
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl MessageCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode_config(&self, command: &ConfigCommand) -> ProtocolResult<Vec<u8>> {
        serde_json::to_vec(command).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    fn decode_config(&self, bytes: &[u8]) -> ProtocolResult<ConfigCommand> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::MalformedConfig(e.to_string()))
    }

    fn encode_vision_result(&self, event: &DetectionEvent) -> ProtocolResult<Vec<u8>> {
        serde_json::to_vec(event).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    fn decode_vision_result(&self, bytes: &[u8]) -> ProtocolResult<DetectionEvent> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::MalformedDetection(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::DetectionType;

    #[test]
    fn test_decode_detection_from_json() {
        let payload = br#"{"detections":[{"tag":"HAND_PALM","location":{"x":100.0,"y":50.0}}]}"#;
        let event = JsonCodec.decode_vision_result(payload).unwrap();
        let detection = event.primary().unwrap();
        assert_eq!(detection.tag, DetectionType::HandPalm);
        assert_eq!(detection.location.x, 100.0);
        assert!(detection.attributes.is_empty());
    }

    #[test]
    fn test_missing_location_is_malformed() {
        let payload = br#"{"detections":[{"tag":"FACE"}]}"#;
        assert!(matches!(
            JsonCodec.decode_vision_result(payload),
            Err(ProtocolError::MalformedDetection(_))
        ));
    }

    #[test]
    fn test_short_frame_is_malformed_config() {
        let payload = br#"{"frame":[]}"#;
        assert!(matches!(
            JsonCodec.decode_config(payload),
            Err(ProtocolError::MalformedConfig(_))
        ));
    }
}
