// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Addressable LED frames
//!
//! A frame always addresses every LED on the ring. Shorter frames leave the
//! unaddressed LEDs at an undefined device-side default, so the only way to
//! build a [`LedFrame`] is with an explicit LED count.

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// LED count of the Everloop ring used by the reference demos
pub const EVERLOOP_LED_COUNT: usize = 35;

/// Color channel of an RGBW LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedChannel {
    Red,
    Green,
    Blue,
    White,
}

/// Intensity of a single RGBW LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct LedValue {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

impl LedValue {
    pub const OFF: LedValue = LedValue::rgbw(0, 0, 0, 0);

    pub const fn rgbw(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    /// Value with a single channel lit
    pub fn single(channel: LedChannel, intensity: u8) -> Self {
        LedValue::OFF.with(channel, intensity)
    }

    pub fn with(mut self, channel: LedChannel, intensity: u8) -> Self {
        match channel {
            LedChannel::Red => self.red = intensity,
            LedChannel::Green => self.green = intensity,
            LedChannel::Blue => self.blue = intensity,
            LedChannel::White => self.white = intensity,
        }
        self
    }

    pub fn channel(&self, channel: LedChannel) -> u8 {
        match channel {
            LedChannel::Red => self.red,
            LedChannel::Green => self.green,
            LedChannel::Blue => self.blue,
            LedChannel::White => self.white,
        }
    }

    pub fn is_off(&self) -> bool {
        *self == LedValue::OFF
    }
}

/// Complete actuator output: exactly one value per LED
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LedValue>", into = "Vec<LedValue>")]
pub struct LedFrame {
    leds: Vec<LedValue>,
}

impl LedFrame {
    /// Every LED set to the same value
    ///
    /// # Errors
    /// `InvalidFrame` if `led_count` is zero.
    pub fn uniform(led_count: usize, value: LedValue) -> ProtocolResult<Self> {
        if led_count == 0 {
            return Err(ProtocolError::InvalidFrame {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self {
            leds: vec![value; led_count],
        })
    }

    /// Like [`LedFrame::uniform`] for a count already known to be non-zero
    pub fn filled(led_count: NonZeroUsize, value: LedValue) -> Self {
        Self {
            leds: vec![value; led_count.get()],
        }
    }

    /// Explicit "off" signal for every LED
    pub fn off(led_count: usize) -> ProtocolResult<Self> {
        Self::uniform(led_count, LedValue::OFF)
    }

    /// Build from per-LED values, checking the length against the device
    pub fn from_values(values: Vec<LedValue>, led_count: usize) -> ProtocolResult<Self> {
        if values.len() != led_count || led_count == 0 {
            return Err(ProtocolError::InvalidFrame {
                expected: led_count,
                actual: values.len(),
            });
        }
        Ok(Self { leds: values })
    }

    pub fn len(&self) -> usize {
        self.leds.len()
    }

    /// Always false; kept for API symmetry with collections
    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    pub fn values(&self) -> &[LedValue] {
        &self.leds
    }

    pub fn is_off(&self) -> bool {
        self.leds.iter().all(LedValue::is_off)
    }

    /// The shared value when every LED is identical
    pub fn uniform_value(&self) -> Option<LedValue> {
        let first = *self.leds.first()?;
        self.leds.iter().all(|v| *v == first).then_some(first)
    }
}

impl TryFrom<Vec<LedValue>> for LedFrame {
    type Error = ProtocolError;

    fn try_from(values: Vec<LedValue>) -> Result<Self, Self::Error> {
        let count = values.len();
        LedFrame::from_values(values, count)
    }
}

impl From<LedFrame> for Vec<LedValue> {
    fn from(frame: LedFrame) -> Self {
        frame.leds
    }
}
