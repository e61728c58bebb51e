// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Gesture controller.
//!
//! Waits for a face, acknowledges it on the LED ring, then switches the
//! camera to hand detection: a palm colors the ring by its position and a
//! fist toggles the ring on and off.
//!
//! Usage: gesture_everloop [--config <path>] [--host <ip>] [--debug-all]

use eyeloop::config::BehaviorMode;
use eyeloop::controller::{parse_args, run_controller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (args, debug_flags) = parse_args(
        "Face, then palm and fist gestures drive the LED ring",
        std::env::args(),
    );
    run_controller(BehaviorMode::Gesture, args, debug_flags).await
}
