// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Session configuration and error types

pub mod config;
pub mod error;

pub use config::SessionConfig;
pub use error::{AgentError, Result, SendFailure};
