// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for loading complete configuration files

use eyeloop_config::*;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const SHIPPED_CONFIG: &str = include_str!("../../../eyeloop_configuration.toml");

#[test]
fn test_shipped_config_matches_defaults() {
    let config: EyeloopConfig = toml::from_str(SHIPPED_CONFIG).unwrap();
    assert_eq!(config, EyeloopConfig::default());
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_load_via_env_path_with_cli_override() {
    let _env_lock = ENV_LOCK.lock().unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("device.toml");
    std::fs::write(
        &path,
        r#"
        [device]
        host = "10.1.1.9"

        [behavior]
        mode = "report"
        "#,
    )
    .unwrap();

    std::env::set_var(CONFIG_PATH_ENV, &path);
    let mut cli = HashMap::new();
    cli.insert("led_count".to_string(), "18".to_string());
    let result = load_config_or_default(None, Some(&cli));
    std::env::remove_var(CONFIG_PATH_ENV);

    let config = result.unwrap();
    assert_eq!(config.device.host, "10.1.1.9");
    assert_eq!(config.behavior.mode, BehaviorMode::Report);
    assert_eq!(config.actuator.led_count, 18);
}

#[test]
fn test_out_of_range_port_reaches_validation() {
    let config: EyeloopConfig = toml::from_str("[sensor]\nbase_port = 70000\n").unwrap();
    assert_eq!(config.sensor.base_port, 70000);

    match validate_config(&config) {
        Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("sensor.base_port")),
        other => panic!("expected validation error, got {:?}", other),
    }
}
