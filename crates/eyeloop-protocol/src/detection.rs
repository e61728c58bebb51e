// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Detection events produced by the vision service

use crate::labels::{self, ATTRIBUTE_KINDS, DETECTION_TYPES, EMOTIONS, GENDERS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Object classes the vision service can be asked to detect.
///
/// The device's vocabulary is authoritative; codes this controller does not
/// name are carried through as `Other` instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionType {
    Face,
    FaceDemographics,
    HandThumbUp,
    HandPalm,
    HandPinch,
    HandFist,
    Other(i32),
}

impl DetectionType {
    pub fn from_code(code: i32) -> Self {
        labels::from_code(&DETECTION_TYPES, code).unwrap_or(DetectionType::Other(code))
    }

    pub fn code(self) -> i32 {
        match self {
            DetectionType::Other(code) => code,
            known => labels::code_of(&DETECTION_TYPES, known).unwrap_or_default(),
        }
    }

    pub fn label(self) -> &'static str {
        labels::label_of(&DETECTION_TYPES, self)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        labels::from_label(&DETECTION_TYPES, label)
    }
}

impl fmt::Display for DetectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionType::Other(code) => write!(f, "{}({})", labels::UNKNOWN_LABEL, code),
            known => f.write_str(known.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Angry,
    Disgust,
    Confused,
    Happy,
    Sad,
    Surprised,
    Calm,
    Unknown,
}

impl Emotion {
    pub fn from_code(code: i32) -> Self {
        labels::from_code(&EMOTIONS, code).unwrap_or(Emotion::Unknown)
    }

    /// Wire code, `None` for `Unknown`
    pub fn code(self) -> Option<i32> {
        labels::code_of(&EMOTIONS, self)
    }

    pub fn label(self) -> &'static str {
        labels::label_of(&EMOTIONS, self)
    }

    pub fn from_label(label: &str) -> Self {
        labels::from_label(&EMOTIONS, label).unwrap_or(Emotion::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn from_code(code: i32) -> Self {
        labels::from_code(&GENDERS, code).unwrap_or(Gender::Unknown)
    }

    pub fn code(self) -> Option<i32> {
        labels::code_of(&GENDERS, self)
    }

    pub fn label(self) -> &'static str {
        labels::label_of(&GENDERS, self)
    }
}

/// Kind tag of a recognition attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Age,
    Emotion,
    Gender,
    Pose,
}

impl AttributeKind {
    pub fn from_code(code: i32) -> Option<Self> {
        labels::from_code(&ATTRIBUTE_KINDS, code)
    }

    pub fn code(self) -> i32 {
        labels::code_of(&ATTRIBUTE_KINDS, self).unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        labels::label_of(&ATTRIBUTE_KINDS, self)
    }
}

/// One recognition attribute attached to a detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribute {
    Age { years: i32 },
    Emotion { value: Emotion },
    Gender { value: Gender },
    /// Head pose in radians
    Pose { yaw: f32, pitch: f32, roll: f32 },
}

impl Attribute {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Age { .. } => AttributeKind::Age,
            Attribute::Emotion { .. } => AttributeKind::Emotion,
            Attribute::Gender { .. } => AttributeKind::Gender,
            Attribute::Pose { .. } => AttributeKind::Pose,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Age { years } => write!(f, "Age: {}", years),
            Attribute::Emotion { value } => write!(f, "Emotion: {}", value.label()),
            Attribute::Gender { value } => write!(f, "Gender: {}", value.label()),
            Attribute::Pose { yaw, pitch, roll } => write!(
                f,
                "Pose (radians). Yaw: {} Pitch: {} Roll: {}",
                round_pose(*yaw),
                round_pose(*pitch),
                round_pose(*roll)
            ),
        }
    }
}

fn round_pose(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

/// Pixel coordinates in the configured camera frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f32,
    pub y: f32,
}

impl Location {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One recognized object instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub tag: DetectionType,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl Detection {
    pub fn new(tag: DetectionType, x: f32, y: f32) -> Self {
        Self {
            tag,
            location: Location::new(x, y),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// One decoded vision result.
///
/// An empty detection list is a meaningful "nothing detected" event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub detections: Vec<Detection>,
}

impl DetectionEvent {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(detection: Detection) -> Self {
        Self {
            detections: vec![detection],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// The detection at index 0; the only one actuation ever consults
    pub fn primary(&self) -> Option<&Detection> {
        self.detections.first()
    }
}
