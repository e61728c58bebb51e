// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every violation is collected before reporting, so one run surfaces all of
//! them.

use crate::{ConfigError, ConfigResult, EyeloopConfig};

/// Highest base port whose fourth channel (`base + 3`) is still a valid port
pub const MAX_BASE_PORT: i64 = 65532;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidPortRange { port_name: String, port: i64 },
    PortConflict { range1: String, range2: String, port: i64 },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPortRange { port_name, port } => {
                write!(
                    f,
                    "Port {} = {} is outside valid base port range (1-{})",
                    port_name, port, MAX_BASE_PORT
                )
            }
            Self::PortConflict {
                range1,
                range2,
                port,
            } => {
                write!(
                    f,
                    "Port conflict: {} and {} channel ranges both use port {}",
                    range1, range2, port
                )
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Base ports in 1..=65532 (each device occupies four consecutive ports)
/// - Sensor and actuator channel ranges not overlapping
/// - Required fields
/// - Valid value ranges
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &EyeloopConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_port_ranges(config, &mut errors);
    validate_port_conflicts(config, &mut errors);
    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn base_ports(config: &EyeloopConfig) -> [(&'static str, i64); 2] {
    [
        ("sensor.base_port", config.sensor.base_port),
        ("actuator.base_port", config.actuator.base_port),
    ]
}

fn validate_port_ranges(config: &EyeloopConfig, errors: &mut Vec<ConfigValidationError>) {
    for (port_name, port) in base_ports(config) {
        if !(1..=MAX_BASE_PORT).contains(&port) {
            errors.push(ConfigValidationError::InvalidPortRange {
                port_name: port_name.to_string(),
                port,
            });
        }
    }
}

/// Both services live on the same host, so their four-port ranges must be disjoint
fn validate_port_conflicts(config: &EyeloopConfig, errors: &mut Vec<ConfigValidationError>) {
    let sensor = config.sensor.base_port;
    let actuator = config.actuator.base_port;

    let overlap_start = sensor.max(actuator);
    let overlap_end = (sensor + 3).min(actuator + 3);
    if overlap_start <= overlap_end {
        errors.push(ConfigValidationError::PortConflict {
            range1: "sensor".to_string(),
            range2: "actuator".to_string(),
            port: overlap_start,
        });
    }
}

fn validate_required_fields(config: &EyeloopConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.device.host.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "device.host".to_string(),
        });
    }
}

fn validate_value_ranges(config: &EyeloopConfig, errors: &mut Vec<ConfigValidationError>) {
    let mut invalid = |field: &str, reason: &str| {
        errors.push(ConfigValidationError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        });
    };

    if config.actuator.led_count == 0 {
        invalid("actuator.led_count", "must be greater than 0");
    }
    if config.sensor.width <= 0 {
        invalid("sensor.width", "must be positive");
    }
    if config.sensor.height <= 0 {
        invalid("sensor.height", "must be positive");
    }
    if !(config.sensor.update_interval_secs >= 0.0) {
        invalid("sensor.update_interval_secs", "must not be negative");
    }
    if config.liveness.interval_ms == 0 {
        invalid("liveness.interval_ms", "must be greater than 0");
    }
    if config.transport.send_timeout_ms == 0 {
        invalid("transport.send_timeout_ms", "must be greater than 0");
    }
    if config.transport.connect_timeout_ms == 0 {
        invalid("transport.connect_timeout_ms", "must be greater than 0");
    }
    if config.transport.max_message_size == 0 {
        invalid("transport.max_message_size", "must be greater than 0");
    }
    if config.transport.send_queue_depth == 0 {
        invalid("transport.send_queue_depth", "must be greater than 0");
    }
    if !matches!(config.transport.codec.as_str(), "protobuf" | "json") {
        invalid("transport.codec", "must be 'protobuf' or 'json'");
    }
    if config.behavior.intensity_cap > 255 {
        invalid("behavior.intensity_cap", "must be at most 255");
    }
    if config.behavior.fist_intensity > 255 {
        invalid("behavior.fist_intensity", "must be at most 255");
    }
    if !(config.behavior.palm_scale > 0.0) {
        invalid("behavior.palm_scale", "must be positive");
    }
    if config.behavior.ack_color.iter().any(|c| *c > 255) {
        invalid("behavior.ack_color", "channels must be at most 255");
    }
    if config.behavior.idle_color.iter().any(|c| *c > 255) {
        invalid("behavior.idle_color", "channels must be at most 255");
    }
}
