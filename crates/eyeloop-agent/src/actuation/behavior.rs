// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Reaction parameters for each behavior

use std::num::NonZeroUsize;

use eyeloop_config::{BehaviorMode, ColorChannel, EyeloopConfig, Rgbw};
use eyeloop_protocol::{DetectionType, LedChannel, LedFrame, LedValue, Location, EVERLOOP_LED_COUNT};

use crate::core::error::{AgentError, Result};

/// Detection types requested once the gesture behavior has seen a face
pub const GESTURE_DETECTIONS: [DetectionType; 2] =
    [DetectionType::HandFist, DetectionType::HandPalm];

/// What the session does with detections
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// Face position drives the ring color on every event
    GeometryMapping(GeometryMapping),
    /// Face first, then palm position and fist toggles
    Gesture(GestureControl),
    /// Face demographics are logged; the ring is untouched
    Report,
}

impl Behavior {
    /// Build the configured behavior
    ///
    /// # Errors
    /// `InvalidConfig` for a zero LED count, non-positive camera size or
    /// non-positive palm scale.
    pub fn from_config(config: &EyeloopConfig) -> Result<Self> {
        let tuning = &config.behavior;
        match tuning.mode {
            BehaviorMode::Report => Ok(Behavior::Report),
            BehaviorMode::Geometry => {
                if config.sensor.width <= 0 || config.sensor.height <= 0 {
                    return Err(AgentError::InvalidConfig(format!(
                        "camera size {}x{} must be positive",
                        config.sensor.width, config.sensor.height
                    )));
                }
                Ok(Behavior::GeometryMapping(GeometryMapping {
                    frame_width: config.sensor.width as f32,
                    frame_height: config.sensor.height as f32,
                    intensity_cap: clamp_intensity(tuning.intensity_cap),
                    horizontal: led_channel(tuning.horizontal_channel),
                    vertical: led_channel(tuning.vertical_channel),
                    led_count: led_count(config)?,
                }))
            }
            BehaviorMode::Gesture => {
                if !(tuning.palm_scale.is_finite() && tuning.palm_scale > 0.0) {
                    return Err(AgentError::InvalidConfig(format!(
                        "palm scale {} must be positive",
                        tuning.palm_scale
                    )));
                }
                Ok(Behavior::Gesture(GestureControl {
                    palm_scale: tuning.palm_scale,
                    palm_horizontal: led_channel(tuning.horizontal_channel),
                    palm_vertical: led_channel(tuning.vertical_channel),
                    fist_channel: led_channel(tuning.fist_channel),
                    fist_intensity: clamp_intensity(tuning.fist_intensity),
                    ack: led_value(tuning.ack_color),
                    idle: led_value(tuning.idle_color),
                    led_count: led_count(config)?,
                }))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Behavior::GeometryMapping(_) => "geometry",
            Behavior::Gesture(_) => "gesture",
            Behavior::Report => "report",
        }
    }

    /// Detection type requested at startup
    pub fn primary_cue(&self) -> DetectionType {
        match self {
            Behavior::Report => DetectionType::FaceDemographics,
            Behavior::GeometryMapping(_) | Behavior::Gesture(_) => DetectionType::Face,
        }
    }

    /// Ring size, for behaviors that drive the ring
    pub fn led_count(&self) -> Option<NonZeroUsize> {
        match self {
            Behavior::GeometryMapping(mapping) => Some(mapping.led_count),
            Behavior::Gesture(gesture) => Some(gesture.led_count),
            Behavior::Report => None,
        }
    }
}

/// Linear map from the primary detection's position to two channels
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryMapping {
    pub frame_width: f32,
    pub frame_height: f32,
    pub intensity_cap: u8,
    /// Brighter towards the left edge
    pub horizontal: LedChannel,
    /// Brighter towards the bottom edge
    pub vertical: LedChannel,
    pub led_count: NonZeroUsize,
}

impl Default for GeometryMapping {
    fn default() -> Self {
        Self {
            frame_width: 640.0,
            frame_height: 480.0,
            intensity_cap: 80,
            horizontal: LedChannel::Red,
            vertical: LedChannel::Blue,
            led_count: default_led_count(),
        }
    }
}

impl GeometryMapping {
    pub fn value_at(&self, location: Location) -> LedValue {
        let cap = f32::from(self.intensity_cap);
        let horizontal = (self.frame_width - location.x) / self.frame_width * cap;
        let vertical = location.y / self.frame_height * cap;
        LedValue::OFF
            .with(self.horizontal, to_intensity(horizontal))
            .with(self.vertical, to_intensity(vertical))
    }

    pub fn frame_at(&self, location: Location) -> LedFrame {
        LedFrame::filled(self.led_count, self.value_at(location))
    }

    pub fn off_frame(&self) -> LedFrame {
        LedFrame::filled(self.led_count, LedValue::OFF)
    }
}

/// Two-phase face-then-hands control
#[derive(Debug, Clone, PartialEq)]
pub struct GestureControl {
    /// Palm coordinates are divided by this to get intensities
    pub palm_scale: f32,
    pub palm_horizontal: LedChannel,
    pub palm_vertical: LedChannel,
    pub fist_channel: LedChannel,
    pub fist_intensity: u8,
    /// Shown once the face is seen
    pub ack: LedValue,
    /// Shown at startup
    pub idle: LedValue,
    pub led_count: NonZeroUsize,
}

impl Default for GestureControl {
    fn default() -> Self {
        Self {
            palm_scale: 5.0,
            palm_horizontal: LedChannel::Red,
            palm_vertical: LedChannel::Blue,
            fist_channel: LedChannel::Green,
            fist_intensity: 10,
            ack: LedValue::rgbw(0, 10, 0, 0),
            idle: LedValue::rgbw(0, 0, 0, 2),
            led_count: default_led_count(),
        }
    }
}

impl GestureControl {
    pub fn palm_value(&self, location: Location) -> LedValue {
        LedValue::OFF
            .with(self.palm_horizontal, to_intensity(location.x / self.palm_scale))
            .with(self.palm_vertical, to_intensity(location.y / self.palm_scale))
    }

    pub fn fist_value(&self, on: bool) -> LedValue {
        LedValue::single(self.fist_channel, if on { self.fist_intensity } else { 0 })
    }

    pub fn frame(&self, value: LedValue) -> LedFrame {
        LedFrame::filled(self.led_count, value)
    }
}

/// Round and clamp a computed intensity into 0..=255
fn to_intensity(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, f32::from(u8::MAX)) as u8
}

fn clamp_intensity(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

fn led_value(rgbw: Rgbw) -> LedValue {
    let [red, green, blue, white] = rgbw.map(clamp_intensity);
    LedValue::rgbw(red, green, blue, white)
}

fn led_channel(channel: ColorChannel) -> LedChannel {
    match channel {
        ColorChannel::Red => LedChannel::Red,
        ColorChannel::Green => LedChannel::Green,
        ColorChannel::Blue => LedChannel::Blue,
        ColorChannel::White => LedChannel::White,
    }
}

fn led_count(config: &EyeloopConfig) -> Result<NonZeroUsize> {
    NonZeroUsize::new(config.actuator.led_count).ok_or_else(|| {
        AgentError::InvalidConfig("actuator.led_count must be greater than 0".to_string())
    })
}

fn default_led_count() -> NonZeroUsize {
    NonZeroUsize::new(EVERLOOP_LED_COUNT).unwrap_or(NonZeroUsize::MIN)
}
