// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! Fan-out of decoded entity state to downstream consumers.
//!
//! The receive loop is the single producer; WebSocket sessions and console
//! tools subscribe through [`RelayHub`] and each get a dedicated bounded
//! queue. A slow consumer loses events, never stalls the producer.

pub mod hub;

pub use hub::{RelayHub, SubscriberHandle};

use crate::engine::EntityStateReport;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

/// What the hub forwards for each accepted Entity State PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayPolicy {
    /// Original datagram bytes only.
    Raw,
    /// Decoded and enriched report only.
    #[default]
    Decoded,
    /// Both, as two events per PDU (raw first).
    Both,
}

impl RelayPolicy {
    pub fn wants_raw(self) -> bool {
        matches!(self, RelayPolicy::Raw | RelayPolicy::Both)
    }

    pub fn wants_decoded(self) -> bool {
        matches!(self, RelayPolicy::Decoded | RelayPolicy::Both)
    }
}

impl FromStr for RelayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(RelayPolicy::Raw),
            "decoded" => Ok(RelayPolicy::Decoded),
            "both" => Ok(RelayPolicy::Both),
            other => Err(format!(
                "unknown relay policy '{}' (expected raw, decoded, or both)",
                other
            )),
        }
    }
}

/// One event on a subscriber queue. Payloads are behind `Arc` so fan-out to
/// N subscribers clones a pointer, not a PDU.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// Verbatim datagram as received.
    Raw {
        bytes: Arc<[u8]>,
        source: SocketAddr,
    },
    /// Fully decoded entity state.
    Report(Arc<EntityStateReport>),
}
