// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! # disgate - DIS Entity State decoder and relay
//!
//! A pure Rust receiver for Distributed Interactive Simulation (DIS) version 6
//! traffic. disgate listens for UDP datagrams (unicast, multicast, or
//! broadcast), decodes Entity State PDUs from the big-endian wire format,
//! derives human-meaningful quantities (geodetic position, heading/pitch/roll,
//! damage state, articulated sub-part identifiers), and fans the result out to
//! live subscribers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use disgate::engine::decode_and_enrich;
//!
//! # fn recv_datagram() -> (Vec<u8>, std::net::SocketAddr) { unimplemented!() }
//! let (bytes, source) = recv_datagram();
//! match decode_and_enrich(&bytes, source) {
//!     Ok(report) => println!(
//!         "{} at {:.4} {:.4} hdg {:.1}",
//!         report.marking,
//!         report.position.latitude_deg,
//!         report.position.longitude_deg,
//!         report.attitude.heading_deg,
//!     ),
//!     Err(err) => eprintln!("dropped datagram: {}", err),
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                       Relay Layer                            |
//! |   RelayHub -> SubscriberHandle (WebSocket bridge, console)   |
//! +--------------------------------------------------------------+
//! |                      Pipeline Layer                          |
//! |   decode -> geodetic -> orientation -> appearance            |
//! +--------------------------------------------------------------+
//! |                      Protocol Layer                          |
//! |   PduReader | Entity State codec | articulation records      |
//! +--------------------------------------------------------------+
//! |                     Transport Layer                          |
//! |   UDP bind | multicast join | single-consumer receive loop   |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`protocol`] - Entity State PDU wire codec (start here)
//! - [`geo`] - WGS-84 coordinate and orientation conversion
//! - [`appearance`] - entity appearance bitfield interpretation
//! - [`relay`] - fan-out hub for live subscribers
//! - [`engine`] - the decode-and-enrich pipeline
//! - [`transport`] - UDP reception and multicast membership
//!
//! ## See Also
//!
//! - IEEE 1278.1a-1998 (DIS protocol version 6)

/// Entity appearance bitfield interpretation (damage, smoke, flaming, ...).
pub mod appearance;
/// Global configuration (DIS wire constants, environment overrides).
pub mod config;
/// Decode-and-enrich pipeline feeding the relay hub.
pub mod engine;
/// WGS-84 geodetic conversion and body-to-local orientation.
pub mod geo;
/// DIS wire protocol: read/write cursors, Entity State PDU codec.
pub mod protocol;
/// Fan-out relay hub for live subscribers.
pub mod relay;
/// UDP transport: socket construction, multicast join, receive loop.
pub mod transport;

pub use appearance::{AppearanceFlags, Damage};
pub use engine::{decode_and_enrich, EntityStateReport};
pub use geo::{GeodeticPosition, OrientationAngles};
pub use protocol::{DecodeError, EntityId, EntityStatePdu, EntityType};
pub use relay::{RelayEvent, RelayHub, RelayPolicy, SubscriberHandle};
pub use transport::DisReceiver;
