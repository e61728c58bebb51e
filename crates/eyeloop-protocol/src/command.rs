// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Outbound configuration commands
//!
//! Commands are presence-aware: every field is optional and only present
//! fields are interpreted by the device. A command carrying
//! `detection_types` replaces the device's requested set wholesale; a
//! command without it leaves the set untouched.

use crate::detection::DetectionType;
use crate::led::LedFrame;
use serde::{Deserialize, Serialize};

/// Camera capture parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraParameters {
    pub camera_id: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for CameraParameters {
    fn default() -> Self {
        Self {
            camera_id: 0,
            width: 640,
            height: 480,
        }
    }
}

/// Full sensor configuration held by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub camera: CameraParameters,
    pub update_interval_secs: f32,
    pub detection_types: Vec<DetectionType>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            camera: CameraParameters::default(),
            update_interval_secs: 0.05,
            detection_types: vec![DetectionType::Face],
        }
    }
}

impl SensorConfig {
    /// Camera + update interval, without touching the detection set
    pub fn capture_command(&self) -> ConfigCommand {
        ConfigCommand::default()
            .with_camera(self.camera)
            .with_update_interval(self.update_interval_secs)
    }

    /// Detection-type request replacing whatever the device had
    pub fn detection_command(&self) -> ConfigCommand {
        ConfigCommand::detect(self.detection_types.iter().copied())
    }

    /// Replace the requested detection types
    pub fn replace_detection_types(&mut self, types: impl IntoIterator<Item = DetectionType>) {
        self.detection_types = dedup_in_order(types);
    }
}

/// One configuration message for the device's config channel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraParameters>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval_secs: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_types: Option<Vec<DetectionType>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<LedFrame>,
}

impl ConfigCommand {
    /// Detection-type request; duplicates are dropped, order is kept
    pub fn detect(types: impl IntoIterator<Item = DetectionType>) -> Self {
        Self {
            detection_types: Some(dedup_in_order(types)),
            ..Self::default()
        }
    }

    /// Actuation command carrying a complete frame
    pub fn frame(frame: LedFrame) -> Self {
        Self {
            frame: Some(frame),
            ..Self::default()
        }
    }

    pub fn with_camera(mut self, camera: CameraParameters) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_update_interval(mut self, seconds: f32) -> Self {
        self.update_interval_secs = Some(seconds);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.camera.is_none()
            && self.update_interval_secs.is_none()
            && self.detection_types.is_none()
            && self.frame.is_none()
    }

    pub fn is_actuation(&self) -> bool {
        self.frame.is_some()
    }
}

fn dedup_in_order(types: impl IntoIterator<Item = DetectionType>) -> Vec<DetectionType> {
    let mut out: Vec<DetectionType> = Vec::new();
    for t in types {
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
