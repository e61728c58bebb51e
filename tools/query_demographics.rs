// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logs age, emotion, gender and head pose of every detected face.

use eyeloop::config::BehaviorMode;
use eyeloop::controller::{parse_args, run_controller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (args, debug_flags) = parse_args("Log face demographics", std::env::args());
    run_controller(BehaviorMode::Report, args, debug_flags).await
}
