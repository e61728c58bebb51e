// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Face-tracking controller.
//!
//! Maps the position of the first detected face onto the LED ring: one
//! channel brightens towards the left edge, another towards the bottom.
//! The ring turns off while no face is in view.

use eyeloop::config::BehaviorMode;
use eyeloop::controller::{parse_args, run_controller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (args, debug_flags) = parse_args(
        "Face position drives the LED ring color",
        std::env::args(),
    );
    run_controller(BehaviorMode::Geometry, args, debug_flags).await
}
