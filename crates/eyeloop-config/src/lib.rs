// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # eyeloop Configuration System
//!
//! Type-safe configuration loader for eyeloop controllers with support for:
//! - TOML file parsing (`eyeloop_configuration.toml`)
//! - Environment variable overrides (including the `CREATOR_IP` host override)
//! - CLI argument overrides
//! - Compiled-in defaults when no file exists
//!
//! ## Usage
//!
//! ```rust,no_run
//! use eyeloop_config::{load_config_or_default, validate_config};
//!
//! let config = load_config_or_default(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! println!("Device: {}", config.device.host);
//! println!("Sensor base port: {}", config.sensor.base_port);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    load_config_or_default, CONFIG_FILE_NAME, CONFIG_PATH_ENV,
};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
