// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # eyeloop-observability
//!
//! Console logging for eyeloop controllers with per-crate debug flag support.
//!
//! Debug logging is enabled per crate with `--debug-<crate>` arguments or the
//! `EYELOOP_DEBUG` environment variable. `RUST_LOG`, when set, replaces the
//! flag-derived filter entirely.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use init::*;

/// Known eyeloop crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "eyeloop",
    "eyeloop-protocol",
    "eyeloop-transports",
    "eyeloop-agent",
    "eyeloop-config",
];
