// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ZMQ client-side socket patterns

pub mod push;
pub mod sub;

pub use push::ZmqPush;
pub use sub::ZmqSub;
