// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Detection-driven actuation

pub mod behavior;
pub mod machine;

pub use behavior::{Behavior, GeometryMapping, GestureControl, GESTURE_DETECTIONS};
pub use machine::{
    start_commands, transition, ActuationCommand, ActuationMachine, Phase, SessionState,
};
