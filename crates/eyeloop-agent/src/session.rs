// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Device session
//!
//! Owns the five channels a controller uses (sensor config, keepalive,
//! error and data, plus the actuator's config channel), runs the startup
//! sequence and then feeds detections one at a time through the actuation
//! machine. Events are processed strictly in arrival order by this loop,
//! which is the only writer of the session state.
//!
//! Sockets connect inside their channels. An unreachable sensor or
//! actuator is logged and retried with backoff; only invalid configuration
//! fails a session.

use std::fmt;
use std::future::Future;

use eyeloop_protocol::{ConfigCommand, DetectionEvent, SensorConfig};
use eyeloop_transports::zmq::client::{ZmqPush, ZmqSub};
use eyeloop_transports::{Push, Subscriber};
use tracing::{info, warn};

use crate::actuation::{ActuationCommand, ActuationMachine, Behavior, Phase};
use crate::channels::{ConfigChannel, ErrorListener, LivenessService};
use crate::core::config::SessionConfig;
use crate::core::error::{AgentError, Result, SendFailure};
use crate::report::describe_event;
use crate::stream::DetectionStream;

/// Transports for every channel of a session
///
/// Transports may be handed over unstarted; each channel starts its own.
pub struct SessionChannels {
    pub sensor_config: Box<dyn Push>,
    pub keepalive: Box<dyn Push>,
    pub errors: Box<dyn Subscriber>,
    pub data: Box<dyn Subscriber>,
    pub actuator_config: Box<dyn Push>,
}

impl SessionChannels {
    /// Unconnected ZMQ sockets for every channel
    ///
    /// # Errors
    /// `Transport(InvalidConfig)` for unusable socket settings.
    pub fn zmq(config: &SessionConfig) -> Result<Self> {
        let sensor = &config.sensor_endpoint;
        Ok(Self {
            sensor_config: zmq_push(config, sensor.config_address())?,
            keepalive: zmq_push(config, sensor.keepalive_address())?,
            errors: zmq_sub(config, sensor.error_address())?,
            data: zmq_sub(config, sensor.data_address())?,
            actuator_config: zmq_push(config, config.actuator_endpoint.config_address())?,
        })
    }
}

fn zmq_push(config: &SessionConfig, address: String) -> Result<Box<dyn Push>> {
    let push: Box<dyn Push> = Box::new(ZmqPush::new(config.channel_config(address))?);
    Ok(push)
}

fn zmq_sub(config: &SessionConfig, address: String) -> Result<Box<dyn Subscriber>> {
    let sub: Box<dyn Subscriber> = Box::new(ZmqSub::new(config.channel_config(address))?);
    Ok(sub)
}

/// Totals reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Decoded detection events processed
    pub events: u64,
    /// Data payloads dropped because they did not decode
    pub malformed: u64,
    /// Frames handed to the actuator transport
    pub frames_sent: u64,
    /// Detection-type requests handed to the sensor transport, including
    /// the initial one
    pub reconfigurations: u64,
    /// Commands rejected by a full queue or not delivered
    pub send_failures: u64,
    pub device_errors: u64,
    pub keepalives_sent: u64,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} events, {} malformed, {} frames, {} reconfigurations, {} send failures, \
             {} device errors, {} keepalives",
            self.events,
            self.malformed,
            self.frames_sent,
            self.reconfigurations,
            self.send_failures,
            self.device_errors,
            self.keepalives_sent
        )
    }
}

/// One controller attached to one sensor and one actuator
pub struct DeviceSession {
    sensor: SensorConfig,
    machine: ActuationMachine,
    sensor_config: ConfigChannel,
    actuator_config: ConfigChannel,
    stream: DetectionStream,
    errors: ErrorListener,
    liveness: LivenessService,
    events: u64,
    rejected: u64,
    started: bool,
}

impl DeviceSession {
    /// Session over ZMQ; sockets connect once the session starts
    pub fn connect(config: SessionConfig) -> Result<Self> {
        info!(
            "[SESSION] Using sensor {} and actuator {}",
            config.sensor_endpoint, config.actuator_endpoint
        );
        let channels = SessionChannels::zmq(&config)?;
        Self::with_channels(config, channels)
    }

    /// Build a session over caller-provided transports
    pub fn with_channels(config: SessionConfig, channels: SessionChannels) -> Result<Self> {
        let codec = config.codec.build();
        let sensor = &config.sensor_endpoint;

        let liveness = LivenessService::new(
            sensor.keepalive_address(),
            channels.keepalive,
            config.keepalive_interval,
        )?;

        let strategy = config.reconnection_strategy();

        Ok(Self {
            sensor_config: ConfigChannel::new(
                sensor.config_address(),
                channels.sensor_config,
                codec.clone(),
            )
            .with_reconnection(strategy.clone())
            .with_queue_depth(config.send_queue_depth),
            actuator_config: ConfigChannel::new(
                config.actuator_endpoint.config_address(),
                channels.actuator_config,
                codec.clone(),
            )
            .with_reconnection(strategy.clone())
            .with_queue_depth(config.send_queue_depth),
            stream: DetectionStream::new(channels.data, codec)
                .with_reconnection(strategy.clone()),
            errors: ErrorListener::new(sensor.error_address(), channels.errors)
                .with_reconnection(strategy),
            liveness,
            machine: ActuationMachine::new(config.behavior),
            sensor: config.sensor,
            events: 0,
            rejected: 0,
            started: false,
        })
    }

    pub fn behavior(&self) -> &Behavior {
        self.machine.behavior()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// Sensor configuration as last sent to the device
    pub fn sensor_config(&self) -> &SensorConfig {
        &self.sensor
    }

    /// Startup sequence: listen for errors and data, configure the camera,
    /// issue the behavior's start commands, then start pinging
    ///
    /// # Errors
    /// `AlreadyRunning` on a second call. Connect and send failures are
    /// logged and counted, not returned.
    pub async fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(AgentError::AlreadyRunning);
        }
        self.started = true;

        self.sensor_config.start()?;
        self.actuator_config.start()?;
        self.errors.start()?;
        if let Err(e) = self.stream.start().await {
            warn!("[SESSION] Data channel not connected yet: {}", e);
        }

        let capture = self.sensor.capture_command();
        if let Err(failure) = self.sensor_config.send(&capture) {
            self.record_failure(failure);
        }

        for command in self.machine.start() {
            self.execute(command);
        }

        self.liveness.start()?;

        info!(
            "[SESSION] Started {} behavior, waiting for {}",
            self.machine.behavior().name(),
            self.machine.behavior().primary_cue()
        );
        Ok(())
    }

    /// Run one event through the machine and send what it produced
    pub fn process_event(&mut self, event: &DetectionEvent) {
        self.events += 1;

        if matches!(self.machine.behavior(), Behavior::Report) {
            for line in describe_event(event) {
                info!("[DETECTIONS] {}", line);
            }
        }

        for command in self.machine.handle(event) {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: ActuationCommand) {
        match command {
            ActuationCommand::SetFrame(frame) => {
                if let Err(failure) = self.actuator_config.send(&ConfigCommand::frame(frame)) {
                    self.record_failure(failure);
                }
            }
            ActuationCommand::RequestDetections(types) => {
                self.sensor.replace_detection_types(types);
                let command = self.sensor.detection_command();
                match self.sensor_config.send(&command) {
                    Ok(()) => {
                        info!(
                            "[SESSION] Requested detections: {}",
                            self.sensor
                                .detection_types
                                .iter()
                                .map(ToString::to_string)
                                .collect::<Vec<_>>()
                                .join(", ")
                        );
                    }
                    Err(failure) => self.record_failure(failure),
                }
            }
        }
    }

    fn record_failure(&mut self, failure: SendFailure) {
        self.rejected += 1;
        warn!("[SESSION] {}", failure);
    }

    /// Current totals
    ///
    /// Delivery counts trail the event loop until [`Self::shutdown`] has
    /// drained the config channels.
    pub fn stats(&self) -> SessionStats {
        let sensor = self.sensor_config.stats();
        let actuator = self.actuator_config.stats();
        SessionStats {
            events: self.events,
            malformed: self.stream.malformed_count(),
            frames_sent: actuator.frames,
            reconfigurations: sensor.reconfigurations,
            send_failures: self.rejected + sensor.failed + actuator.failed,
            device_errors: self.errors.errors_received(),
            keepalives_sent: self.liveness.pings_sent(),
        }
    }

    /// Consume detections until the data channel closes
    pub async fn run(self) -> Result<SessionStats> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Consume detections until `shutdown` resolves or the data channel closes
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<SessionStats>
    where
        F: Future<Output = ()>,
    {
        if !self.started {
            self.start().await?;
        }

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("[SESSION] Shutdown requested");
                    break;
                }
                event = self.stream.next_event() => match event {
                    Some(event) => self.process_event(&event),
                    None => break,
                },
            }
        }

        Ok(self.shutdown().await)
    }

    /// Tear down every channel and report the totals
    pub async fn shutdown(mut self) -> SessionStats {
        self.liveness.stop().await;
        self.errors.stop().await;
        self.stream.close().await;
        self.sensor_config.close().await;
        self.actuator_config.close().await;

        let stats = self.stats();
        info!("[SESSION] Stopped: {}", stats);
        stats
    }
}
