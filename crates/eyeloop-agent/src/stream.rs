// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Inbound detection stream
//!
//! An unbounded, ordered, non-restartable sequence of [`DetectionEvent`]s.
//! A payload that fails to decode is logged, counted and dropped; the
//! stream continues with the next one. Events published while nobody is
//! receiving are lost. An unreachable data channel is retried with backoff
//! from [`DetectionStream::next_event`]; to the caller it looks like a
//! silent device.

use std::sync::Arc;

use eyeloop_protocol::{DetectionEvent, MessageCodec};
use eyeloop_transports::{Subscriber, Transport, TransportError};
use tracing::{debug, info, warn};

use crate::channels::{subscribe_all, RECEIVE_ERROR_BACKOFF};
use crate::core::error::Result;
use crate::reconnect::ReconnectionStrategy;

pub struct DetectionStream {
    data: Box<dyn Subscriber>,
    codec: Arc<dyn MessageCodec>,
    strategy: ReconnectionStrategy,
    subscribed: bool,
    malformed: u64,
}

impl DetectionStream {
    pub fn new(data: Box<dyn Subscriber>, codec: Arc<dyn MessageCodec>) -> Self {
        Self {
            data,
            codec,
            strategy: ReconnectionStrategy::new(500, 0),
            subscribed: false,
            malformed: 0,
        }
    }

    /// Backoff between failed connects
    pub fn with_reconnection(mut self, strategy: ReconnectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Connect and subscribe to every topic, one attempt
    ///
    /// # Errors
    /// The connect or subscribe failure. [`Self::next_event`] keeps retrying.
    pub async fn start(&mut self) -> Result<()> {
        if !self.subscribed {
            if !self.data.is_running() {
                self.data.start().await?;
            }
            self.data.subscribe("").await?;
            self.subscribed = true;
            debug!("[DETECTIONS] Subscribed to data channel");
        }
        Ok(())
    }

    /// Wait for the next decodable event
    ///
    /// Returns `None` only when the data channel has closed for good or
    /// reconnecting gave up. There is no timeout: a silent or unreachable
    /// device simply never yields.
    pub async fn next_event(&mut self) -> Option<DetectionEvent> {
        if !self.subscribed {
            let connected =
                subscribe_all(self.data.as_mut(), &mut self.strategy, "data channel").await;
            if let Err(e) = connected {
                warn!("[DETECTIONS] Giving up on data channel: {}", e);
                return None;
            }
            self.subscribed = true;
            info!("[DETECTIONS] Subscribed to data channel");
        }

        loop {
            match self.data.receive().await {
                Ok(payload) => {
                    if let Some(event) = self.decode(&payload) {
                        return Some(event);
                    }
                }
                Err(TransportError::ConnectionClosed | TransportError::NotRunning) => {
                    info!("[DETECTIONS] Data channel closed");
                    return None;
                }
                Err(e) => {
                    warn!("[DETECTIONS] Receive failed: {}", e);
                    tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                }
            }
        }
    }

    fn decode(&mut self, payload: &[u8]) -> Option<DetectionEvent> {
        match self.codec.decode_vision_result(payload) {
            Ok(event) => {
                debug!("[DETECTIONS] {} detection(s)", event.len());
                Some(event)
            }
            Err(e) => {
                self.malformed += 1;
                warn!("[DETECTIONS] Dropping payload of {} bytes: {}", payload.len(), e);
                None
            }
        }
    }

    pub fn malformed_count(&self) -> u64 {
        self.malformed
    }

    pub async fn close(&mut self) {
        if self.data.is_running() {
            if let Err(e) = self.data.stop().await {
                debug!("[DETECTIONS] Closing data channel failed: {}", e);
            }
        }
    }
}

/// Decode a batch of payloads in order, skipping the malformed ones
pub fn decode_payloads<'a, I>(codec: &dyn MessageCodec, payloads: I) -> Vec<DetectionEvent>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    payloads
        .into_iter()
        .filter_map(|payload| match codec.decode_vision_result(payload) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("[DETECTIONS] Dropping payload of {} bytes: {}", payload.len(), e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Flaky;
    use eyeloop_protocol::{CodecKind, Detection, DetectionType};
    use eyeloop_transports::memory;
    use eyeloop_transports::{Push, Transport};
    use std::sync::atomic::Ordering;

    fn face_at(x: f32, y: f32) -> DetectionEvent {
        DetectionEvent::single(Detection::new(DetectionType::Face, x, y))
    }

    #[test]
    fn test_malformed_payload_is_skipped_in_order() {
        let codec = CodecKind::Protobuf.build();
        let first = codec.encode_vision_result(&face_at(1.0, 2.0)).unwrap();
        let second = codec.encode_vision_result(&face_at(3.0, 4.0)).unwrap();
        let garbage = vec![0xFF, 0xFF, 0xFF];

        let events = decode_payloads(
            codec.as_ref(),
            [first.as_slice(), garbage.as_slice(), second.as_slice()],
        );
        assert_eq!(events, vec![face_at(1.0, 2.0), face_at(3.0, 4.0)]);
    }

    #[tokio::test]
    async fn test_stream_survives_malformed_payload() {
        let codec = CodecKind::Protobuf.build();
        let (mut push, sub) = memory::pair("data");
        push.start().await.unwrap();

        let mut stream = DetectionStream::new(Box::new(sub), Arc::clone(&codec));
        stream.start().await.unwrap();

        push.push(&codec.encode_vision_result(&face_at(10.0, 20.0)).unwrap())
            .await
            .unwrap();
        push.push(&[0xFF, 0xFF, 0xFF]).await.unwrap();
        push.push(&codec.encode_vision_result(&DetectionEvent::empty()).unwrap())
            .await
            .unwrap();
        drop(push);

        assert_eq!(stream.next_event().await, Some(face_at(10.0, 20.0)));
        assert_eq!(stream.next_event().await, Some(DetectionEvent::empty()));
        assert_eq!(stream.next_event().await, None);
        assert_eq!(stream.malformed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_data_channel_is_retried() {
        let codec = CodecKind::Protobuf.build();
        let (mut push, sub) = memory::pair("data");
        push.start().await.unwrap();
        let sub = Flaky::new(sub, 3);
        let attempts = sub.attempts();

        let mut stream = DetectionStream::new(Box::new(sub), Arc::clone(&codec))
            .with_reconnection(ReconnectionStrategy::new(100, 0));
        assert!(stream.start().await.is_err());

        push.push(&codec.encode_vision_result(&face_at(5.0, 6.0)).unwrap())
            .await
            .unwrap();
        assert_eq!(stream.next_event().await, Some(face_at(5.0, 6.0)));
        assert_eq!(attempts.load(Ordering::Relaxed), 4);
    }
}
