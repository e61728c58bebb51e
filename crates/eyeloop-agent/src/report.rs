// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Human-readable rendering of detection events

use eyeloop_protocol::DetectionEvent;

/// One line per detection followed by one line per attribute
pub fn describe_event(event: &DetectionEvent) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, detection) in event.detections.iter().enumerate() {
        lines.push(format!(
            "Detection {}: {} at ({}, {})",
            index, detection.tag, detection.location.x, detection.location.y
        ));
        for attribute in &detection.attributes {
            lines.push(format!("  {}", attribute));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyeloop_protocol::{Attribute, Detection, DetectionType, Emotion, Gender};

    #[test]
    fn test_demographics_rendering() {
        let event = DetectionEvent::new(vec![
            Detection::new(DetectionType::FaceDemographics, 12.0, 34.5)
                .with_attribute(Attribute::Age { years: 31 })
                .with_attribute(Attribute::Emotion {
                    value: Emotion::Happy,
                })
                .with_attribute(Attribute::Gender {
                    value: Gender::Female,
                })
                .with_attribute(Attribute::Pose {
                    yaw: 0.12345,
                    pitch: -0.5,
                    roll: 1.0,
                }),
            Detection::new(DetectionType::Face, 1.0, 2.0),
        ]);

        assert_eq!(
            describe_event(&event),
            vec![
                "Detection 0: FACE_DEMOGRAPHICS at (12, 34.5)".to_string(),
                "  Age: 31".to_string(),
                "  Emotion: Happy".to_string(),
                "  Gender: Female".to_string(),
                "  Pose (radians). Yaw: 0.123 Pitch: -0.5 Roll: 1".to_string(),
                "Detection 1: FACE at (1, 2)".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_event_has_no_lines() {
        assert!(describe_event(&DetectionEvent::empty()).is_empty());
    }
}
