// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Static code ↔ label tables
//!
//! Each table is exhaustive for the values this controller names. Lookups
//! never fail: codes outside a table resolve to the table's fallback and
//! render as [`UNKNOWN_LABEL`].

use crate::detection::{AttributeKind, DetectionType, Emotion, Gender};

/// Label used for any code outside a table
pub const UNKNOWN_LABEL: &str = "unknown";

/// Detection types: (type, wire code, label)
pub(crate) const DETECTION_TYPES: [(DetectionType, i32, &str); 6] = [
    (DetectionType::Face, 1, "FACE"),
    (DetectionType::FaceDemographics, 2, "FACE_DEMOGRAPHICS"),
    (DetectionType::HandThumbUp, 3, "HAND_THUMB_UP"),
    (DetectionType::HandPalm, 4, "HAND_PALM"),
    (DetectionType::HandPinch, 5, "HAND_PINCH"),
    (DetectionType::HandFist, 6, "HAND_FIST"),
];

/// Emotions: (emotion, wire code, label)
pub(crate) const EMOTIONS: [(Emotion, i32, &str); 7] = [
    (Emotion::Angry, 0, "Angry"),
    (Emotion::Disgust, 1, "Disgust"),
    (Emotion::Confused, 2, "Confused"),
    (Emotion::Happy, 3, "Happy"),
    (Emotion::Sad, 4, "Sad"),
    (Emotion::Surprised, 5, "Surprised"),
    (Emotion::Calm, 6, "Calm"),
];

/// Genders: (gender, wire code, label)
pub(crate) const GENDERS: [(Gender, i32, &str); 2] =
    [(Gender::Male, 0, "Male"), (Gender::Female, 1, "Female")];

/// Recognition attribute kinds: (kind, wire code, label)
pub(crate) const ATTRIBUTE_KINDS: [(AttributeKind, i32, &str); 4] = [
    (AttributeKind::Age, 0, "AGE"),
    (AttributeKind::Emotion, 1, "EMOTION"),
    (AttributeKind::Gender, 2, "GENDER"),
    (AttributeKind::Pose, 4, "POSE"),
];

pub(crate) fn code_of<T: PartialEq + Copy>(
    table: &[(T, i32, &'static str)],
    value: T,
) -> Option<i32> {
    table.iter().find(|(v, _, _)| *v == value).map(|(_, code, _)| *code)
}

pub(crate) fn label_of<T: PartialEq + Copy>(
    table: &[(T, i32, &'static str)],
    value: T,
) -> &'static str {
    table
        .iter()
        .find(|(v, _, _)| *v == value)
        .map(|(_, _, label)| *label)
        .unwrap_or(UNKNOWN_LABEL)
}

pub(crate) fn from_code<T: Copy>(table: &[(T, i32, &'static str)], code: i32) -> Option<T> {
    table.iter().find(|(_, c, _)| *c == code).map(|(v, _, _)| *v)
}

pub(crate) fn from_label<T: Copy>(table: &[(T, i32, &'static str)], label: &str) -> Option<T> {
    table
        .iter()
        .find(|(_, _, l)| l.eq_ignore_ascii_case(label))
        .map(|(v, _, _)| *v)
}
