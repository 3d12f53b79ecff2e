// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! disgate Global Configuration - Single Source of Truth
//!
//! This module centralizes ALL DIS wire constants and runtime configuration.
//! **NEVER hardcode elsewhere!**
//!
//! - Compile-time constants: IEEE 1278.1a wire layout (sizes, offsets, codes)
//! - Environment overrides: `DISGATE_*` variables for deployment knobs

use std::net::Ipv4Addr;

// =======================================================================
// DIS wire constants (IEEE 1278.1a-1998)
// =======================================================================

/// DIS protocol version 6 (IEEE 1278.1a-1998). The only version disgate decodes.
pub const PROTOCOL_VERSION: u8 = 6;

/// PDU type code for Entity State (IEEE 1278.1 Sec.4.5.2).
pub const PDU_TYPE_ENTITY_STATE: u8 = 1;

/// PDU header size in bytes (version, exercise, type, family, timestamp, length, padding).
pub const PDU_HEADER_LEN: usize = 12;

/// Fixed Entity State PDU size without articulation parameters.
///
/// Header (12) + entity id (6) + force id (1) + articulation count (1)
/// + entity type (8) + alternative type (8) + velocity (12) + location (24)
/// + orientation (12) + appearance (4) + dead reckoning (40) + marking (12)
/// + capabilities (4) = 144 bytes.
pub const ESPDU_FIXED_LEN: usize = 144;

/// Size of one articulation parameter record.
pub const ARTICULATION_RECORD_LEN: usize = 16;

/// Marking field: 1 charset byte + 11 character bytes.
pub const MARKING_CHAR_LEN: usize = 11;

/// Marking charset code for ASCII, the only charset decoded to text.
pub const MARKING_CHARSET_ASCII: u8 = 1;

/// Dead reckoning block size (algorithm byte + 39 opaque bytes).
pub const DEAD_RECKONING_LEN: usize = 40;

// =======================================================================
// Transport defaults
// =======================================================================

/// Conventional DIS exercise port.
pub const DEFAULT_PORT: u16 = 3000;

/// Receive buffer size. DIS PDUs arrive as single complete datagrams; the
/// Entity State PDU tops out well below this even with a full articulation set.
pub const MAX_DATAGRAM_SIZE: usize = 8192;

// =======================================================================
// Environment overrides
// =======================================================================

/// Runtime knobs resolved once at startup from `DISGATE_*` environment
/// variables, with compiled defaults where unset or unparseable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// UDP port to bind (`DISGATE_PORT`).
    pub port: u16,
    /// Multicast group to join, if any (`DISGATE_MULTICAST_GROUP`).
    pub multicast_group: Option<Ipv4Addr>,
}

impl RuntimeConfig {
    /// Resolve configuration from the environment.
    ///
    /// Invalid values log a warning and fall back to the default rather than
    /// failing startup.
    pub fn from_env() -> Self {
        let port = match std::env::var("DISGATE_PORT") {
            Ok(raw) => match raw.parse::<u16>() {
                Ok(p) => p,
                Err(_) => {
                    log::warn!("[config] invalid DISGATE_PORT='{}', using {}", raw, DEFAULT_PORT);
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        let multicast_group = match std::env::var("DISGATE_MULTICAST_GROUP") {
            Ok(raw) => match raw.parse::<Ipv4Addr>() {
                Ok(addr) if addr.is_multicast() => Some(addr),
                Ok(addr) => {
                    log::warn!("[config] DISGATE_MULTICAST_GROUP={} is not multicast, ignoring", addr);
                    None
                }
                Err(_) => {
                    log::warn!("[config] invalid DISGATE_MULTICAST_GROUP='{}', ignoring", raw);
                    None
                }
            },
            Err(_) => None,
        };

        Self { port, multicast_group }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            multicast_group: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_espdu_fixed_len_matches_field_sum() {
        let sum = PDU_HEADER_LEN // header
            + 6   // entity id
            + 1   // force id
            + 1   // articulation count
            + 8   // entity type
            + 8   // alternative entity type
            + 12  // linear velocity
            + 24  // location
            + 12  // orientation
            + 4   // appearance
            + DEAD_RECKONING_LEN
            + 1 + MARKING_CHAR_LEN
            + 4; // capabilities
        assert_eq!(sum, ESPDU_FIXED_LEN);
    }

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.port, 3000);
        assert!(config.multicast_group.is_none());
    }
}
