// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{BehaviorMode, ConfigError, ConfigResult, EyeloopConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for during discovery
pub const CONFIG_FILE_NAME: &str = "eyeloop_configuration.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "EYELOOP_CONFIG_PATH";

/// Host override honoured by the reference device demos
pub const LEGACY_HOST_ENV: &str = "CREATOR_IP";

/// Find the eyeloop configuration file
///
/// Search order:
/// 1. `EYELOOP_CONFIG_PATH` environment variable
/// 2. Current working directory: `./eyeloop_configuration.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    let (found, searched) = discover_config_file()?;
    if let Some(path) = found {
        return Ok(path);
    }

    let search_list = searched
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "eyeloop configuration file '{}' not found in any of these locations:\n{}\n\n\
         Set {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Search for a config file; `Ok((None, searched))` when none exists.
///
/// An explicit `EYELOOP_CONFIG_PATH` that does not exist is an error rather
/// than a miss.
fn discover_config_file() -> ConfigResult<(Option<PathBuf>, Vec<PathBuf>)> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok((Some(path), Vec::new()));
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    let found = search_paths.iter().find(|p| p.exists()).cloned();
    Ok((found, search_paths))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is a separate step ([`crate::validate_config`]).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<EyeloopConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let config = parse_config_file(&config_file)?;
    Ok(with_overrides(config, cli_args))
}

/// Like [`load_config`], but falls back to compiled-in defaults when
/// discovery finds no file. Overrides still apply to the defaults.
///
/// # Errors
///
/// An explicit path (argument or `EYELOOP_CONFIG_PATH`) that does not exist,
/// unreadable files and invalid TOML are still errors.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<EyeloopConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }

    let config = match discover_config_file()? {
        (Some(path), _) => parse_config_file(&path)?,
        (None, _) => EyeloopConfig::default(),
    };
    Ok(with_overrides(config, cli_args))
}

fn parse_config_file(path: &Path) -> ConfigResult<EyeloopConfig> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn with_overrides(
    mut config: EyeloopConfig,
    cli_args: Option<&HashMap<String, String>>,
) -> EyeloopConfig {
    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }
    config
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `CREATOR_IP` -> `device.host`
/// - `EYELOOP_HOST` -> `device.host` (wins over `CREATOR_IP`)
/// - `EYELOOP_SENSOR_PORT` -> `sensor.base_port`
/// - `EYELOOP_ACTUATOR_PORT` -> `actuator.base_port`
/// - `EYELOOP_LED_COUNT` -> `actuator.led_count`
/// - `EYELOOP_KEEPALIVE_MS` -> `liveness.interval_ms`
/// - `EYELOOP_BEHAVIOR` -> `behavior.mode`
/// - `EYELOOP_CODEC` -> `transport.codec`
/// - `EYELOOP_LOG_LEVEL` -> `logging.level`
///
/// Unparseable numeric values are ignored.
pub fn apply_environment_overrides(config: &mut EyeloopConfig) {
    // Applied in order: EYELOOP_HOST after CREATOR_IP
    const ENV_KEYS: [(&str, &str); 9] = [
        (LEGACY_HOST_ENV, "host"),
        ("EYELOOP_HOST", "host"),
        ("EYELOOP_SENSOR_PORT", "sensor_port"),
        ("EYELOOP_ACTUATOR_PORT", "actuator_port"),
        ("EYELOOP_LED_COUNT", "led_count"),
        ("EYELOOP_KEEPALIVE_MS", "keepalive_ms"),
        ("EYELOOP_BEHAVIOR", "behavior"),
        ("EYELOOP_CODEC", "codec"),
        ("EYELOOP_LOG_LEVEL", "log_level"),
    ];

    for (var, key) in ENV_KEYS {
        if let Ok(value) = env::var(var) {
            apply_override(config, key, &value);
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments
///   (e.g., `{"host": "192.168.1.20", "behavior": "geometry"}`)
///
/// Recognised keys: `host`, `sensor_port`, `actuator_port`, `led_count`,
/// `keepalive_ms`, `behavior`, `codec`, `log_level`.
pub fn apply_cli_overrides(config: &mut EyeloopConfig, cli_args: &HashMap<String, String>) {
    for (key, value) in cli_args {
        apply_override(config, key, value);
    }
}

fn apply_override(config: &mut EyeloopConfig, key: &str, value: &str) {
    match key {
        "host" => config.device.host = value.to_string(),
        "sensor_port" => {
            if let Ok(port) = value.parse::<i64>() {
                config.sensor.base_port = port;
            }
        }
        "actuator_port" => {
            if let Ok(port) = value.parse::<i64>() {
                config.actuator.base_port = port;
            }
        }
        "led_count" => {
            if let Ok(count) = value.parse::<usize>() {
                config.actuator.led_count = count;
            }
        }
        "keepalive_ms" => {
            if let Ok(ms) = value.parse::<u64>() {
                config.liveness.interval_ms = ms;
            }
        }
        "behavior" => {
            if let Ok(mode) = value.parse::<BehaviorMode>() {
                config.behavior.mode = mode;
            }
        }
        "codec" => config.transport.codec = value.to_lowercase(),
        "log_level" => config.logging.level = value.to_string(),
        _ => {}
    }
}
