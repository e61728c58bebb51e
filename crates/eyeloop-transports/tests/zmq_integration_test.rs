// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the ZMQ client sockets against loopback peers

use eyeloop_transports::prelude::*;
use std::time::Duration;
use zeromq::{PubSocket, PullSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

/// PUSH client delivers to a bound PULL peer, including empty keepalives
#[tokio::test]
async fn test_push_to_pull() {
    let mut pull = PullSocket::new();
    let endpoint = pull.bind("tcp://127.0.0.1:0").await.unwrap();

    let mut push = ZmqPush::with_address(endpoint.to_string()).unwrap();
    push.start().await.unwrap();
    assert!(push.is_running());

    push.push(b"config").await.unwrap();
    push.push(&[]).await.unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), pull.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.into_vec().pop().unwrap().to_vec(), b"config");

    let second = tokio::time::timeout(Duration::from_secs(5), pull.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(second.into_vec().pop().unwrap().is_empty());

    push.stop().await.unwrap();
    assert!(!push.is_running());
}

/// SUB client subscribed to everything receives the last frame of multipart messages
#[tokio::test]
async fn test_pub_to_sub_multipart() {
    let mut publisher = PubSocket::new();
    let endpoint = publisher.bind("tcp://127.0.0.1:0").await.unwrap();

    let mut sub = ZmqSub::with_address(endpoint.to_string()).unwrap();
    sub.start().await.unwrap();
    sub.subscribe("").await.unwrap();

    // Subscriptions propagate asynchronously; publish until one lands
    let publish = async move {
        loop {
            let mut message = ZmqMessage::from(b"topic".to_vec());
            message.push_back(b"payload".to_vec().into());
            let _ = publisher.send(message).await;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    };
    let publisher_task = tokio::spawn(publish);

    let payload = tokio::time::timeout(Duration::from_secs(5), sub.receive())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payload, b"payload");

    publisher_task.abort();
    sub.stop().await.unwrap();
}

/// Connecting to a port with no listener is bounded by the connect timeout
#[tokio::test]
async fn test_connect_without_listener_is_bounded() {
    let config =
        TransportConfig::new("tcp://127.0.0.1:1").with_connect_timeout(Duration::from_millis(200));
    let mut push = ZmqPush::new(config).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), push.start())
        .await
        .unwrap();
    assert!(matches!(
        result,
        Err(TransportError::ConnectFailed(_)) | Err(TransportError::Timeout)
    ));
    assert!(!push.is_running());
}
