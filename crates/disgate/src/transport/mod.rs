// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! UDP reception for DIS exercise traffic.
//!
//! DIS is broadcast or multicast UDP on a well-known port (3000 by
//! convention). The receiver binds a reusable socket, optionally joins a
//! multicast group on every usable interface, and feeds each datagram to the
//! decode pipeline.

pub mod multicast;
pub mod udp;

pub use udp::DisReceiver;
