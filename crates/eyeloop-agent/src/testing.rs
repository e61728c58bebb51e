// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transport wrappers for unit tests

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use eyeloop_transports::{Push, Subscriber, Transport, TransportError, TransportResult};

/// Refuses the first `refusals` starts, then behaves like `inner`
pub(crate) struct Flaky<T> {
    inner: T,
    refusals: u32,
    attempts: Arc<AtomicU32>,
}

impl<T> Flaky<T> {
    pub(crate) fn new(inner: T, refusals: u32) -> Self {
        Self {
            inner,
            refusals,
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Start attempts so far, readable after the wrapper is boxed
    pub(crate) fn attempts(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.attempts)
    }
}

#[async_trait]
impl<T: Transport> Transport for Flaky<T> {
    async fn start(&mut self) -> TransportResult<()> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if self.refusals > 0 {
            self.refusals -= 1;
            return Err(TransportError::ConnectFailed("connection refused".to_string()));
        }
        self.inner.start().await
    }

    async fn stop(&mut self) -> TransportResult<()> {
        self.inner.stop().await
    }

    fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    fn transport_type(&self) -> &str {
        "flaky"
    }
}

#[async_trait]
impl<T: Push> Push for Flaky<T> {
    async fn push(&mut self, data: &[u8]) -> TransportResult<()> {
        self.inner.push(data).await
    }
}

#[async_trait]
impl<T: Subscriber> Subscriber for Flaky<T> {
    async fn subscribe(&mut self, topic: &str) -> TransportResult<()> {
        self.inner.subscribe(topic).await
    }

    async fn receive(&mut self) -> TransportResult<Vec<u8>> {
        self.inner.receive().await
    }
}
