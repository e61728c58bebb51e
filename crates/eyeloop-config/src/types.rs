// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `eyeloop_configuration.toml`. Every field has a default, so an empty file
//! (or no file at all) yields a working configuration for a local device.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EyeloopConfig {
    pub device: DeviceConfig,
    pub sensor: SensorConfig,
    pub actuator: ActuatorConfig,
    pub liveness: LivenessConfig,
    pub transport: TransportConfig,
    pub behavior: BehaviorConfig,
    pub logging: LoggingConfig,
}

/// Device identity shared by the sensor and actuator services
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub host: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Vision service (camera) settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Base port of the vision service; stored wide so out-of-range values
    /// reach validation instead of failing TOML parsing
    pub base_port: i64,
    pub camera_id: i32,
    pub width: i32,
    pub height: i32,
    /// Seconds between detection results
    pub update_interval_secs: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            base_port: 22013,
            camera_id: 0,
            width: 640,
            height: 480,
            update_interval_secs: 0.05,
        }
    }
}

/// LED ring service settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub base_port: i64,
    pub led_count: usize,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            base_port: 20021,
            led_count: 35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LivenessConfig {
    pub interval_ms: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self { interval_ms: 3000 }
    }
}

/// Socket-level settings applied to every channel
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    pub connect_timeout_ms: u64,
    pub send_timeout_ms: u64,
    /// Connection attempts per channel (0 = retry forever)
    pub connect_retries: u32,
    pub retry_backoff_ms: u64,
    pub max_message_size: usize,
    /// Commands a config channel holds while its device is slow
    pub send_queue_depth: usize,
    /// Wire codec: "protobuf" or "json"
    pub codec: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            send_timeout_ms: 1000,
            connect_retries: 0,
            retry_backoff_ms: 500,
            max_message_size: 1024 * 1024,
            send_queue_depth: 16,
            codec: "protobuf".to_string(),
        }
    }
}

/// Which reaction the controller runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorMode {
    /// Face first, then hand gestures drive the ring
    #[default]
    Gesture,
    /// Face position maps continuously onto the ring color
    Geometry,
    /// Face demographics are logged, the ring is untouched
    Report,
}

impl BehaviorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorMode::Gesture => "gesture",
            BehaviorMode::Geometry => "geometry",
            BehaviorMode::Report => "report",
        }
    }
}

impl fmt::Display for BehaviorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BehaviorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gesture" => Ok(BehaviorMode::Gesture),
            "geometry" | "face" => Ok(BehaviorMode::Geometry),
            "report" | "demographics" => Ok(BehaviorMode::Report),
            other => Err(format!("unknown behavior mode '{}'", other)),
        }
    }
}

/// LED color channel name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
    White,
}

/// RGBW intensities as written in the file: `[r, g, b, w]`
pub type Rgbw = [u32; 4];

/// Reaction tuning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub mode: BehaviorMode,
    /// Peak intensity of the geometry mapping
    pub intensity_cap: u32,
    /// Channel driven by horizontal position
    pub horizontal_channel: ColorChannel,
    /// Channel driven by vertical position
    pub vertical_channel: ColorChannel,
    /// Palm coordinates are divided by this before becoming intensities
    pub palm_scale: f32,
    pub fist_channel: ColorChannel,
    pub fist_intensity: u32,
    /// Frame sent when the primary cue is first seen
    pub ack_color: Rgbw,
    /// Frame sent at startup by the gesture behavior
    pub idle_color: Rgbw,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            mode: BehaviorMode::Gesture,
            intensity_cap: 80,
            horizontal_channel: ColorChannel::Red,
            vertical_channel: ColorChannel::Blue,
            palm_scale: 5.0,
            fist_channel: ColorChannel::Green,
            fist_intensity: 10,
            ack_color: [0, 10, 0, 0],
            idle_color: [0, 0, 0, 2],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when no debug flags or RUST_LOG apply
    pub level: String,
    /// Crates to log at debug level
    pub debug_crates: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug_crates: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_devices() {
        let config = EyeloopConfig::default();
        assert_eq!(config.device.host, "127.0.0.1");
        assert_eq!(config.sensor.base_port, 22013);
        assert_eq!(config.actuator.base_port, 20021);
        assert_eq!(config.actuator.led_count, 35);
        assert_eq!(config.liveness.interval_ms, 3000);
        assert_eq!(config.behavior.mode, BehaviorMode::Gesture);
        assert_eq!(config.behavior.idle_color, [0, 0, 0, 2]);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: EyeloopConfig = toml::from_str("").unwrap();
        assert_eq!(config, EyeloopConfig::default());
    }

    #[test]
    fn test_behavior_mode_parsing() {
        assert_eq!("Geometry".parse::<BehaviorMode>(), Ok(BehaviorMode::Geometry));
        assert_eq!("demographics".parse::<BehaviorMode>(), Ok(BehaviorMode::Report));
        assert!("dance".parse::<BehaviorMode>().is_err());
    }

    #[test]
    fn test_partial_section() {
        let config: EyeloopConfig = toml::from_str(
            r#"
            [behavior]
            mode = "geometry"
            horizontal_channel = "green"
            "#,
        )
        .unwrap();
        assert_eq!(config.behavior.mode, BehaviorMode::Geometry);
        assert_eq!(config.behavior.horizontal_channel, ColorChannel::Green);
        assert_eq!(config.behavior.vertical_channel, ColorChannel::Blue);
        assert_eq!(config.behavior.intensity_cap, 80);
    }
}
