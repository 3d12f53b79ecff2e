// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! DIS wire protocol (IEEE 1278.1a-1998, protocol version 6).
//!
//! All multi-byte fields on the DIS wire are big-endian; floats are IEEE-754.
//! This module owns the read/write cursors, the Entity State PDU codec, and
//! the articulation parameter decoder.

pub mod articulation;
pub mod cursor;
pub mod espdu;

pub use articulation::ArticulationParameter;
pub use cursor::{PduReader, PduWriter};
pub use espdu::{DeadReckoning, EntityStatePdu, EulerAngles, PduHeader};

use std::fmt;

/// Result type for PDU decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while decoding a datagram.
///
/// Every variant is per-datagram and non-fatal: the caller drops the PDU and
/// keeps listening. [`DecodeError::NotEntityState`] is a filter outcome, not a
/// failure - foreign PDU types are expected on a shared exercise network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer shorter than the fixed Entity State PDU size (144 bytes).
    TooShort { len: usize },
    /// Buffer ended before the declared fields (articulation records included).
    TruncatedPdu { offset: usize },
    /// Header carried a DIS protocol version other than 6.
    UnsupportedVersion(u8),
    /// Valid DIS header, but not an Entity State PDU. Drop silently.
    NotEntityState { pdu_type: u8 },
}

impl DecodeError {
    /// True for outcomes that are normal traffic filtering rather than
    /// malformed input.
    #[must_use]
    pub fn is_filter(&self) -> bool {
        matches!(self, DecodeError::NotEntityState { .. })
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TooShort { len } => {
                write!(f, "datagram too short for Entity State PDU: {} bytes", len)
            }
            DecodeError::TruncatedPdu { offset } => {
                write!(f, "PDU truncated at offset {}", offset)
            }
            DecodeError::UnsupportedVersion(version) => {
                write!(f, "unsupported DIS protocol version {}", version)
            }
            DecodeError::NotEntityState { pdu_type } => {
                write!(f, "not an Entity State PDU (type {})", pdu_type)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// DIS entity identifier: site, application, and entity number form the
/// composite key that is unique within an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub site: u16,
    pub application: u16,
    pub entity: u16,
}

impl EntityId {
    pub(crate) fn read(reader: &mut PduReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            site: reader.read_u16_be()?,
            application: reader.read_u16_be()?,
            entity: reader.read_u16_be()?,
        })
    }

    pub(crate) fn write(&self, writer: &mut PduWriter) {
        writer.write_u16_be(self.site);
        writer.write_u16_be(self.application);
        writer.write_u16_be(self.entity);
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.site, self.application, self.entity)
    }
}

/// DIS entity type record (kind, domain, country, category, subcategory,
/// specific, extra). The domain byte selects the appearance bit layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityType {
    pub kind: u8,
    pub domain: u8,
    pub country: u16,
    pub category: u8,
    pub subcategory: u8,
    pub specific: u8,
    pub extra: u8,
}

impl EntityType {
    pub(crate) fn read(reader: &mut PduReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            kind: reader.read_u8()?,
            domain: reader.read_u8()?,
            country: reader.read_u16_be()?,
            category: reader.read_u8()?,
            subcategory: reader.read_u8()?,
            specific: reader.read_u8()?,
            extra: reader.read_u8()?,
        })
    }

    pub(crate) fn write(&self, writer: &mut PduWriter) {
        writer.write_u8(self.kind);
        writer.write_u8(self.domain);
        writer.write_u16_be(self.country);
        writer.write_u8(self.category);
        writer.write_u8(self.subcategory);
        writer.write_u8(self.specific);
        writer.write_u8(self.extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        assert_eq!(
            DecodeError::TooShort { len: 12 }.to_string(),
            "datagram too short for Entity State PDU: 12 bytes"
        );
        assert_eq!(
            DecodeError::UnsupportedVersion(5).to_string(),
            "unsupported DIS protocol version 5"
        );
        assert_eq!(
            DecodeError::TruncatedPdu { offset: 150 }.to_string(),
            "PDU truncated at offset 150"
        );
    }

    #[test]
    fn test_not_entity_state_is_filter() {
        assert!(DecodeError::NotEntityState { pdu_type: 2 }.is_filter());
        assert!(!DecodeError::TooShort { len: 0 }.is_filter());
        assert!(!DecodeError::UnsupportedVersion(7).is_filter());
    }

    #[test]
    fn test_entity_id_display() {
        let id = EntityId { site: 1, application: 2, entity: 3 };
        assert_eq!(id.to_string(), "1:2:3");
    }

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId { site: 42, application: 7, entity: 1337 };
        let mut writer = PduWriter::new();
        id.write(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes, [0, 42, 0, 7, 0x05, 0x39]);

        let mut reader = PduReader::new(&bytes);
        let back = EntityId::read(&mut reader).expect("entity id should decode");
        assert_eq!(back, id);
    }

    #[test]
    fn test_entity_type_roundtrip() {
        let ty = EntityType {
            kind: 1,
            domain: 2,
            country: 225,
            category: 5,
            subcategory: 6,
            specific: 7,
            extra: 8,
        };
        let mut writer = PduWriter::new();
        ty.write(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 8);

        let mut reader = PduReader::new(&bytes);
        let back = EntityType::read(&mut reader).expect("entity type should decode");
        assert_eq!(back, ty);
    }
}
