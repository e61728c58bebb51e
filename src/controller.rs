// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared entry point of the demo controllers

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::{info, warn};

use eyeloop_agent::{DeviceSession, SessionConfig};
use eyeloop_config::{load_config_or_default, validate_config, BehaviorMode, EyeloopConfig};
use eyeloop_observability::{debug_flags_help, init_logging, CrateDebugFlags, DEBUG_ENV};

/// Command-line options common to every controller
#[derive(Parser, Debug, Default)]
#[command(version)]
pub struct ControllerArgs {
    /// Path to eyeloop_configuration.toml (default: discovered)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Device host; overrides the file and CREATOR_IP
    #[arg(long)]
    pub host: Option<String>,

    /// Base port of the vision service
    #[arg(long)]
    pub sensor_port: Option<i64>,

    /// Base port of the LED ring service
    #[arg(long)]
    pub actuator_port: Option<i64>,

    /// Default log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ControllerArgs {
    /// Overrides in the key format of `apply_cli_overrides`
    pub fn overrides(&self, mode: BehaviorMode) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        overrides.insert("behavior".to_string(), mode.as_str().to_string());
        if let Some(host) = &self.host {
            overrides.insert("host".to_string(), host.clone());
        }
        if let Some(port) = self.sensor_port {
            overrides.insert("sensor_port".to_string(), port.to_string());
        }
        if let Some(port) = self.actuator_port {
            overrides.insert("actuator_port".to_string(), port.to_string());
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        overrides
    }
}

/// Split `--debug-*` flags from the rest and parse both
///
/// Exits with clap's usage message on invalid arguments.
pub fn parse_args<I>(about: &'static str, args: I) -> (ControllerArgs, CrateDebugFlags)
where
    I: IntoIterator<Item = String>,
{
    let (debug_args, rest): (Vec<String>, Vec<String>) = args
        .into_iter()
        .partition(|arg| arg.starts_with("--debug-"));

    let matches = ControllerArgs::command()
        .about(about)
        .after_help(debug_flags_help())
        .get_matches_from(rest);
    let parsed = ControllerArgs::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let mut flags = CrateDebugFlags::from_args(debug_args);
    if let Ok(value) = std::env::var(DEBUG_ENV) {
        flags = flags.with_crates(value.split(','));
    }
    (parsed, flags)
}

/// Load and validate configuration for `mode`
pub fn load_controller_config(mode: BehaviorMode, args: &ControllerArgs) -> Result<EyeloopConfig> {
    let overrides = args.overrides(mode);
    let config = load_config_or_default(args.config.as_deref(), Some(&overrides))
        .context("Failed to load configuration")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load configuration, start logging, connect and run until Ctrl-C
pub async fn run_controller(
    mode: BehaviorMode,
    args: ControllerArgs,
    debug_flags: CrateDebugFlags,
) -> Result<()> {
    let config = load_controller_config(mode, &args)?;

    let debug_flags =
        debug_flags.with_crates(config.logging.debug_crates.iter().map(String::as_str));
    init_logging(&debug_flags, &config.logging.level)?;

    info!(
        "eyeloop {} - {} controller for {}",
        crate::VERSION,
        mode,
        config.device.host
    );

    let session_config = SessionConfig::from_eyeloop_config(&config)?;
    let session =
        DeviceSession::connect(session_config).context("Failed to set up device session")?;

    let stats = session
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Ctrl-C handler unavailable ({}); running until the data channel closes", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Session finished: {}", stats);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_debug_flags_are_split_out() {
        let (parsed, flags) = parse_args(
            "test",
            args(&[
                "face_everloop",
                "--host",
                "10.0.0.7",
                "--debug-eyeloop-agent",
                "--sensor-port",
                "23000",
            ]),
        );
        assert_eq!(parsed.host.as_deref(), Some("10.0.0.7"));
        assert_eq!(parsed.sensor_port, Some(23000));
        assert!(flags.is_enabled("eyeloop-agent"));
    }

    #[test]
    fn test_overrides_carry_mode() {
        let parsed = ControllerArgs {
            host: Some("192.168.1.20".to_string()),
            ..ControllerArgs::default()
        };
        let overrides = parsed.overrides(BehaviorMode::Geometry);
        assert_eq!(overrides.get("behavior").map(String::as_str), Some("geometry"));
        assert_eq!(overrides.get("host").map(String::as_str), Some("192.168.1.20"));
        assert!(!overrides.contains_key("sensor_port"));
    }
}
