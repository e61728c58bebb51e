// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Session configuration resolved from the file-level configuration

use std::time::Duration;

use eyeloop_config::EyeloopConfig;
use eyeloop_protocol::{CameraParameters, CodecKind, DeviceEndpoint, SensorConfig};
use eyeloop_transports::TransportConfig;

use crate::actuation::Behavior;
use crate::core::error::{AgentError, Result};
use crate::reconnect::ReconnectionStrategy;

/// Everything a [`DeviceSession`](crate::DeviceSession) needs, with
/// endpoints already resolved
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Vision service: config, keepalive, error and data channels
    pub sensor_endpoint: DeviceEndpoint,
    /// LED ring service: only its config channel is used
    pub actuator_endpoint: DeviceEndpoint,
    /// Initial sensor configuration (camera + update interval)
    pub sensor: SensorConfig,
    pub behavior: Behavior,
    pub keepalive_interval: Duration,
    pub codec: CodecKind,
    pub connect_timeout: Duration,
    pub send_timeout: Duration,
    pub max_message_size: usize,
    /// Commands each config channel queues before rejecting sends
    pub send_queue_depth: usize,
    /// Connection attempts per channel (0 = retry forever)
    pub connect_retries: u32,
    pub retry_backoff_ms: u64,
}

impl SessionConfig {
    /// Resolve endpoints and build the behavior
    ///
    /// # Errors
    /// `Protocol(InvalidEndpoint)` for an unusable host/base port, and
    /// `InvalidConfig` for values the session cannot run with.
    pub fn from_eyeloop_config(config: &EyeloopConfig) -> Result<Self> {
        let sensor_endpoint =
            DeviceEndpoint::resolve(config.device.host.clone(), config.sensor.base_port)?;
        let actuator_endpoint =
            DeviceEndpoint::resolve(config.device.host.clone(), config.actuator.base_port)?;

        let codec = CodecKind::from_name(&config.transport.codec).ok_or_else(|| {
            AgentError::InvalidConfig(format!("unknown codec '{}'", config.transport.codec))
        })?;

        if config.liveness.interval_ms == 0 {
            return Err(AgentError::InvalidConfig(
                "liveness.interval_ms must be greater than 0".to_string(),
            ));
        }

        let sensor = SensorConfig {
            camera: CameraParameters {
                camera_id: config.sensor.camera_id,
                width: config.sensor.width,
                height: config.sensor.height,
            },
            update_interval_secs: config.sensor.update_interval_secs,
            detection_types: Vec::new(),
        };

        Ok(Self {
            sensor_endpoint,
            actuator_endpoint,
            sensor,
            behavior: Behavior::from_config(config)?,
            keepalive_interval: Duration::from_millis(config.liveness.interval_ms),
            codec,
            connect_timeout: Duration::from_millis(config.transport.connect_timeout_ms),
            send_timeout: Duration::from_millis(config.transport.send_timeout_ms),
            max_message_size: config.transport.max_message_size,
            send_queue_depth: config.transport.send_queue_depth,
            connect_retries: config.transport.connect_retries,
            retry_backoff_ms: config.transport.retry_backoff_ms,
        })
    }

    /// Socket settings for one channel address
    pub fn channel_config(&self, address: impl Into<String>) -> TransportConfig {
        TransportConfig::new(address)
            .with_connect_timeout(self.connect_timeout)
            .with_send_timeout(self.send_timeout)
            .with_max_message_size(self.max_message_size)
    }

    pub fn reconnection_strategy(&self) -> ReconnectionStrategy {
        ReconnectionStrategy::new(self.retry_backoff_ms, self.connect_retries)
    }
}
