// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Protobuf wire format spoken by the device drivers
//!
//! The message structs mirror the driver schema field-for-field. Scalars that
//! configure the device are `optional` so an unset field is absent on the
//! wire instead of zero.

use crate::codec::MessageCodec;
use crate::command::{CameraParameters, ConfigCommand};
use crate::detection::{
    Attribute, AttributeKind, Detection, DetectionEvent, DetectionType, Emotion, Gender, Location,
};
use crate::error::{ProtocolError, ProtocolResult};
use crate::led::{LedFrame, LedValue as DomainLedValue};
use prost::Message;
use tracing::{debug, trace};

#[derive(Clone, PartialEq, Message)]
pub struct DriverConfig {
    #[prost(float, optional, tag = "1")]
    pub delay_between_updates: Option<f32>,
    #[prost(message, optional, tag = "3")]
    pub image: Option<EverloopImage>,
    #[prost(message, optional, tag = "9")]
    pub malos_eye_config: Option<MalosEyeConfig>,
}

#[derive(Clone, PartialEq, Message)]
pub struct EverloopImage {
    #[prost(message, repeated, tag = "1")]
    pub led: Vec<LedValue>,
}

#[derive(Clone, PartialEq, Message)]
pub struct LedValue {
    #[prost(uint32, tag = "1")]
    pub red: u32,
    #[prost(uint32, tag = "2")]
    pub green: u32,
    #[prost(uint32, tag = "3")]
    pub blue: u32,
    #[prost(uint32, tag = "4")]
    pub white: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct MalosEyeConfig {
    #[prost(int32, repeated, tag = "1")]
    pub object_to_detect: Vec<i32>,
    #[prost(message, optional, tag = "2")]
    pub camera_config: Option<CameraConfig>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CameraConfig {
    #[prost(int32, optional, tag = "1")]
    pub camera_id: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub width: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub height: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct VisionResult {
    #[prost(message, repeated, tag = "1")]
    pub rect_detection: Vec<RectangularDetection>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RectangularDetection {
    #[prost(message, optional, tag = "1")]
    pub location: Option<Rectangle>,
    #[prost(int32, tag = "2")]
    pub tag: i32,
    #[prost(float, tag = "3")]
    pub confidence: f32,
    #[prost(message, repeated, tag = "4")]
    pub facial_recognition: Vec<FacialRecognition>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Rectangle {
    #[prost(float, tag = "1")]
    pub x: f32,
    #[prost(float, tag = "2")]
    pub y: f32,
    #[prost(float, tag = "3")]
    pub width: f32,
    #[prost(float, tag = "4")]
    pub height: f32,
}

#[derive(Clone, PartialEq, Message)]
pub struct FacialRecognition {
    #[prost(int32, tag = "1")]
    pub tag: i32,
    #[prost(float, tag = "2")]
    pub confidence: f32,
    #[prost(int32, tag = "3")]
    pub age: i32,
    #[prost(int32, tag = "4")]
    pub emotion: i32,
    #[prost(int32, tag = "5")]
    pub gender: i32,
    #[prost(float, tag = "6")]
    pub pose_yaw: f32,
    #[prost(float, tag = "7")]
    pub pose_roll: f32,
    #[prost(float, tag = "8")]
    pub pose_pitch: f32,
}

/// Codec for the driver protobuf schema
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufCodec;

impl MessageCodec for ProtobufCodec {
    fn name(&self) -> &'static str {
        "protobuf"
    }

    fn encode_config(&self, command: &ConfigCommand) -> ProtocolResult<Vec<u8>> {
        let mut message = DriverConfig {
            delay_between_updates: command.update_interval_secs,
            image: command.frame.as_ref().map(|frame| EverloopImage {
                led: frame.values().iter().map(led_to_wire).collect(),
            }),
            malos_eye_config: None,
        };

        if command.camera.is_some() || command.detection_types.is_some() {
            message.malos_eye_config = Some(MalosEyeConfig {
                object_to_detect: command
                    .detection_types
                    .iter()
                    .flatten()
                    .map(|t| t.code())
                    .collect(),
                camera_config: command.camera.map(|camera| CameraConfig {
                    camera_id: Some(camera.camera_id),
                    width: Some(camera.width),
                    height: Some(camera.height),
                }),
            });
        }

        let bytes = message.encode_to_vec();
        trace!("[CODEC] DriverConfig encoded to {} bytes", bytes.len());
        Ok(bytes)
    }

    fn decode_config(&self, bytes: &[u8]) -> ProtocolResult<ConfigCommand> {
        let message = DriverConfig::decode(bytes)
            .map_err(|e| ProtocolError::MalformedConfig(e.to_string()))?;

        let mut command = ConfigCommand {
            update_interval_secs: message.delay_between_updates,
            ..ConfigCommand::default()
        };

        if let Some(eye) = message.malos_eye_config {
            if !eye.object_to_detect.is_empty() {
                command.detection_types = Some(
                    eye.object_to_detect
                        .into_iter()
                        .map(DetectionType::from_code)
                        .collect(),
                );
            }
            if let Some(camera) = eye.camera_config {
                let defaults = CameraParameters::default();
                command.camera = Some(CameraParameters {
                    camera_id: camera.camera_id.unwrap_or(defaults.camera_id),
                    width: camera.width.unwrap_or(defaults.width),
                    height: camera.height.unwrap_or(defaults.height),
                });
            }
        }

        if let Some(image) = message.image {
            let values = image
                .led
                .iter()
                .map(led_from_wire)
                .collect::<ProtocolResult<Vec<_>>>()?;
            let frame = LedFrame::try_from(values)
                .map_err(|e| ProtocolError::MalformedConfig(e.to_string()))?;
            command.frame = Some(frame);
        }

        Ok(command)
    }

    fn encode_vision_result(&self, event: &DetectionEvent) -> ProtocolResult<Vec<u8>> {
        let message = VisionResult {
            rect_detection: event.detections.iter().map(detection_to_wire).collect(),
        };
        Ok(message.encode_to_vec())
    }

    fn decode_vision_result(&self, bytes: &[u8]) -> ProtocolResult<DetectionEvent> {
        let message = VisionResult::decode(bytes)?;

        let detections = message
            .rect_detection
            .into_iter()
            .enumerate()
            .map(|(index, rect)| detection_from_wire(index, rect))
            .collect::<ProtocolResult<Vec<_>>>()?;

        Ok(DetectionEvent::new(detections))
    }
}

fn led_to_wire(value: &DomainLedValue) -> LedValue {
    LedValue {
        red: u32::from(value.red),
        green: u32::from(value.green),
        blue: u32::from(value.blue),
        white: u32::from(value.white),
    }
}

fn led_from_wire(value: &LedValue) -> ProtocolResult<DomainLedValue> {
    let channel = |v: u32| {
        u8::try_from(v).map_err(|_| {
            ProtocolError::MalformedConfig(format!("LED intensity {} exceeds 255", v))
        })
    };
    Ok(DomainLedValue::rgbw(
        channel(value.red)?,
        channel(value.green)?,
        channel(value.blue)?,
        channel(value.white)?,
    ))
}

fn detection_to_wire(detection: &Detection) -> RectangularDetection {
    RectangularDetection {
        location: Some(Rectangle {
            x: detection.location.x,
            y: detection.location.y,
            width: 0.0,
            height: 0.0,
        }),
        tag: detection.tag.code(),
        confidence: 0.0,
        facial_recognition: detection.attributes.iter().map(attribute_to_wire).collect(),
    }
}

fn attribute_to_wire(attribute: &Attribute) -> FacialRecognition {
    let mut wire = FacialRecognition {
        tag: attribute.kind().code(),
        ..FacialRecognition::default()
    };
    match *attribute {
        Attribute::Age { years } => wire.age = years,
        Attribute::Emotion { value } => wire.emotion = value.code().unwrap_or(-1),
        Attribute::Gender { value } => wire.gender = value.code().unwrap_or(-1),
        Attribute::Pose { yaw, pitch, roll } => {
            wire.pose_yaw = yaw;
            wire.pose_pitch = pitch;
            wire.pose_roll = roll;
        }
    }
    wire
}

fn detection_from_wire(index: usize, rect: RectangularDetection) -> ProtocolResult<Detection> {
    let location = rect.location.ok_or_else(|| {
        ProtocolError::MalformedDetection(format!("detection {} has no location", index))
    })?;

    let attributes = rect
        .facial_recognition
        .iter()
        .filter_map(attribute_from_wire)
        .collect();

    Ok(Detection {
        tag: DetectionType::from_code(rect.tag),
        location: Location::new(location.x, location.y),
        attributes,
    })
}

fn attribute_from_wire(wire: &FacialRecognition) -> Option<Attribute> {
    let Some(kind) = AttributeKind::from_code(wire.tag) else {
        debug!("[CODEC] Skipping recognition attribute with tag {}", wire.tag);
        return None;
    };
    Some(match kind {
        AttributeKind::Age => Attribute::Age { years: wire.age },
        AttributeKind::Emotion => Attribute::Emotion {
            value: Emotion::from_code(wire.emotion),
        },
        AttributeKind::Gender => Attribute::Gender {
            value: Gender::from_code(wire.gender),
        },
        AttributeKind::Pose => Attribute::Pose {
            yaw: wire.pose_yaw,
            pitch: wire.pose_pitch,
            roll: wire.pose_roll,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::EVERLOOP_LED_COUNT;

    #[test]
    fn test_absent_fields_are_not_encoded() {
        let bytes = ProtobufCodec.encode_config(&ConfigCommand::default()).unwrap();
        assert!(bytes.is_empty());

        let frame = LedFrame::off(EVERLOOP_LED_COUNT).unwrap();
        let bytes = ProtobufCodec.encode_config(&ConfigCommand::frame(frame)).unwrap();
        let wire = DriverConfig::decode(bytes.as_slice()).unwrap();
        assert!(wire.delay_between_updates.is_none());
        assert!(wire.malos_eye_config.is_none());
        assert_eq!(wire.image.map(|i| i.led.len()), Some(EVERLOOP_LED_COUNT));
    }

    #[test]
    fn test_zero_interval_is_present() {
        let command = ConfigCommand::default().with_update_interval(0.0);
        let bytes = ProtobufCodec.encode_config(&command).unwrap();
        let wire = DriverConfig::decode(bytes.as_slice()).unwrap();
        assert_eq!(wire.delay_between_updates, Some(0.0));
    }

    #[test]
    fn test_detection_set_carried_in_eye_config() {
        let command = ConfigCommand::detect([DetectionType::HandFist, DetectionType::HandPalm]);
        let bytes = ProtobufCodec.encode_config(&command).unwrap();
        let wire = DriverConfig::decode(bytes.as_slice()).unwrap();
        let eye = wire.malos_eye_config.unwrap();
        assert_eq!(eye.object_to_detect, vec![6, 4]);
        assert!(eye.camera_config.is_none());
    }

    #[test]
    fn test_missing_location_is_malformed() {
        let wire = VisionResult {
            rect_detection: vec![RectangularDetection {
                location: None,
                tag: 1,
                ..RectangularDetection::default()
            }],
        };
        let result = ProtobufCodec.decode_vision_result(&wire.encode_to_vec());
        assert!(matches!(result, Err(ProtocolError::MalformedDetection(_))));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result = ProtobufCodec.decode_vision_result(&[0xFF, 0xFF, 0xFF]);
        assert!(matches!(result, Err(ProtocolError::MalformedDetection(_))));
    }

    #[test]
    fn test_empty_payload_is_empty_event() {
        let event = ProtobufCodec.decode_vision_result(&[]).unwrap();
        assert!(event.is_empty());
    }

    #[test]
    fn test_unknown_attribute_tags_are_skipped() {
        let wire = VisionResult {
            rect_detection: vec![RectangularDetection {
                location: Some(Rectangle::default()),
                tag: 2,
                facial_recognition: vec![
                    FacialRecognition {
                        tag: 3,
                        ..FacialRecognition::default()
                    },
                    FacialRecognition {
                        tag: 1,
                        emotion: 9,
                        ..FacialRecognition::default()
                    },
                ],
                ..RectangularDetection::default()
            }],
        };
        let event = ProtobufCodec.decode_vision_result(&wire.encode_to_vec()).unwrap();
        let detection = event.primary().unwrap();
        assert_eq!(detection.tag, DetectionType::FaceDemographics);
        assert_eq!(
            detection.attributes,
            vec![Attribute::Emotion { value: Emotion::Unknown }]
        );
    }

    #[test]
    fn test_oversized_led_intensity_rejected() {
        let wire = DriverConfig {
            image: Some(EverloopImage {
                led: vec![LedValue {
                    red: 300,
                    ..LedValue::default()
                }],
            }),
            ..DriverConfig::default()
        };
        let result = ProtobufCodec.decode_config(&wire.encode_to_vec());
        assert!(matches!(result, Err(ProtocolError::MalformedConfig(_))));
    }
}
