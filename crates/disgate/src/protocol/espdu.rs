// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! Entity State PDU codec (IEEE 1278.1a Sec.5.3.3.1).
//!
//! Decode validates the header first (version 6, Entity State type), then
//! reads the fixed 144-byte body and the trailing articulation records in
//! wire order. Any short read discards the whole PDU; a PDU is never
//! partially processed.
//!
//! The encode half is the synthetic counterpart: it exists so tests (and
//! loopback tooling) can construct byte-exact wire buffers, not because
//! disgate ever transmits Entity State.

use super::articulation::ArticulationParameter;
use super::cursor::{PduReader, PduWriter};
use super::{DecodeError, DecodeResult, EntityId, EntityType};
use crate::config::{
    ARTICULATION_RECORD_LEN, DEAD_RECKONING_LEN, ESPDU_FIXED_LEN, MARKING_CHARSET_ASCII,
    MARKING_CHAR_LEN, PDU_TYPE_ENTITY_STATE, PROTOCOL_VERSION,
};

/// DIS PDU header, common to every PDU type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    pub protocol_version: u8,
    pub exercise_id: u8,
    pub pdu_type: u8,
    pub protocol_family: u8,
    pub timestamp: u32,
    pub length: u16,
    pub padding: u16,
}

impl PduHeader {
    fn read(reader: &mut PduReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            protocol_version: reader.read_u8()?,
            exercise_id: reader.read_u8()?,
            pdu_type: reader.read_u8()?,
            protocol_family: reader.read_u8()?,
            timestamp: reader.read_u32_be()?,
            length: reader.read_u16_be()?,
            padding: reader.read_u16_be()?,
        })
    }

    fn write(&self, writer: &mut PduWriter) {
        writer.write_u8(self.protocol_version);
        writer.write_u8(self.exercise_id);
        writer.write_u8(self.pdu_type);
        writer.write_u8(self.protocol_family);
        writer.write_u32_be(self.timestamp);
        writer.write_u16_be(self.length);
        writer.write_u16_be(self.padding);
    }
}

/// DIS body Euler angles in radians: psi (yaw), theta (pitch), phi (roll),
/// defined relative to the ECEF axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerAngles {
    pub psi: f32,
    pub theta: f32,
    pub phi: f32,
}

/// Dead reckoning block: algorithm selector plus the remaining 39 bytes kept
/// as an opaque pass-through (not interpreted by this pipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadReckoning {
    pub algorithm: u8,
    pub other: [u8; DEAD_RECKONING_LEN - 1],
}

impl Default for DeadReckoning {
    fn default() -> Self {
        Self { algorithm: 0, other: [0u8; DEAD_RECKONING_LEN - 1] }
    }
}

/// A decoded DIS v6 Entity State PDU.
///
/// Constructed once per valid datagram and immutable thereafter; conversion
/// stages borrow it and attach derived values alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStatePdu {
    pub header: PduHeader,
    pub entity_id: EntityId,
    pub force_id: u8,
    pub entity_type: EntityType,
    pub alternative_entity_type: EntityType,
    /// Linear velocity in ECEF metres/second.
    pub linear_velocity: [f32; 3],
    /// Entity location in ECEF metres.
    pub location: [f64; 3],
    pub orientation: EulerAngles,
    /// Raw 32-bit appearance word; see [`crate::appearance`] for semantics.
    pub appearance: u32,
    pub dead_reckoning: DeadReckoning,
    /// Marking charset byte as received.
    pub marking_charset: u8,
    /// Marking decoded to a printable string (trimmed at first NUL or
    /// non-printable byte).
    pub marking: String,
    pub capabilities: u32,
    pub articulations: Vec<ArticulationParameter>,
}

impl EntityStatePdu {
    /// Decode an Entity State PDU from a complete datagram.
    ///
    /// Field order and offsets follow the IEEE 1278.1a wire layout: header,
    /// entity id, force id, articulation count, entity types, velocity,
    /// location (3xf64 starting at byte 48), orientation, appearance, dead
    /// reckoning, marking, capabilities, then `count` articulation records.
    pub fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        if bytes.len() < ESPDU_FIXED_LEN {
            return Err(DecodeError::TooShort { len: bytes.len() });
        }

        let mut reader = PduReader::new(bytes);
        let header = PduHeader::read(&mut reader)?;

        if header.protocol_version != PROTOCOL_VERSION {
            return Err(DecodeError::UnsupportedVersion(header.protocol_version));
        }
        if header.pdu_type != PDU_TYPE_ENTITY_STATE {
            return Err(DecodeError::NotEntityState { pdu_type: header.pdu_type });
        }

        let entity_id = EntityId::read(&mut reader)?;
        let force_id = reader.read_u8()?;
        let articulation_count = reader.read_u8()?;
        let entity_type = EntityType::read(&mut reader)?;
        let alternative_entity_type = EntityType::read(&mut reader)?;

        let linear_velocity = [
            reader.read_f32_be()?,
            reader.read_f32_be()?,
            reader.read_f32_be()?,
        ];
        let location = [
            reader.read_f64_be()?,
            reader.read_f64_be()?,
            reader.read_f64_be()?,
        ];
        let orientation = EulerAngles {
            psi: reader.read_f32_be()?,
            theta: reader.read_f32_be()?,
            phi: reader.read_f32_be()?,
        };
        let appearance = reader.read_u32_be()?;

        let algorithm = reader.read_u8()?;
        let mut other = [0u8; DEAD_RECKONING_LEN - 1];
        other.copy_from_slice(reader.read_bytes(DEAD_RECKONING_LEN - 1)?);
        let dead_reckoning = DeadReckoning { algorithm, other };

        let marking_charset = reader.read_u8()?;
        let marking_bytes = reader.read_bytes(MARKING_CHAR_LEN)?;
        let marking = decode_marking(marking_charset, marking_bytes);

        let capabilities = reader.read_u32_be()?;

        let mut articulations = Vec::with_capacity(articulation_count as usize);
        for _ in 0..articulation_count {
            let record = reader.read_bytes(ARTICULATION_RECORD_LEN)?;
            if let Some(param) = ArticulationParameter::decode(record) {
                articulations.push(param);
            }
        }

        Ok(Self {
            header,
            entity_id,
            force_id,
            entity_type,
            alternative_entity_type,
            linear_velocity,
            location,
            orientation,
            appearance,
            dead_reckoning,
            marking_charset,
            marking,
            capabilities,
            articulations,
        })
    }

    /// Encode this PDU to its wire representation.
    ///
    /// The header length field is rewritten from the actual encoded size so a
    /// round-trip through [`EntityStatePdu::decode`] reproduces every fixed
    /// field.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = PduWriter::new();

        let total = ESPDU_FIXED_LEN + self.articulations.len() * ARTICULATION_RECORD_LEN;
        let mut header = self.header;
        header.length = total as u16;
        header.write(&mut writer);

        self.entity_id.write(&mut writer);
        writer.write_u8(self.force_id);
        writer.write_u8(self.articulations.len() as u8);
        self.entity_type.write(&mut writer);
        self.alternative_entity_type.write(&mut writer);

        for v in self.linear_velocity {
            writer.write_f32_be(v);
        }
        for c in self.location {
            writer.write_f64_be(c);
        }
        writer.write_f32_be(self.orientation.psi);
        writer.write_f32_be(self.orientation.theta);
        writer.write_f32_be(self.orientation.phi);
        writer.write_u32_be(self.appearance);

        writer.write_u8(self.dead_reckoning.algorithm);
        writer.write_bytes(&self.dead_reckoning.other);

        writer.write_u8(self.marking_charset);
        let mut chars = [0u8; MARKING_CHAR_LEN];
        for (slot, byte) in chars.iter_mut().zip(self.marking.bytes()) {
            *slot = byte;
        }
        writer.write_bytes(&chars);

        writer.write_u32_be(self.capabilities);

        for param in &self.articulations {
            param.write(&mut writer);
        }

        writer.into_bytes()
    }
}

impl Default for EntityStatePdu {
    fn default() -> Self {
        Self {
            header: PduHeader {
                protocol_version: PROTOCOL_VERSION,
                exercise_id: 1,
                pdu_type: PDU_TYPE_ENTITY_STATE,
                protocol_family: 1,
                timestamp: 0,
                length: ESPDU_FIXED_LEN as u16,
                padding: 0,
            },
            entity_id: EntityId { site: 0, application: 0, entity: 0 },
            force_id: 0,
            entity_type: EntityType::default(),
            alternative_entity_type: EntityType::default(),
            linear_velocity: [0.0; 3],
            location: [0.0; 3],
            orientation: EulerAngles::default(),
            appearance: 0,
            dead_reckoning: DeadReckoning::default(),
            marking_charset: MARKING_CHARSET_ASCII,
            marking: String::new(),
            capabilities: 0,
            articulations: Vec::new(),
        }
    }
}

/// Decode the 11-byte marking field to a printable string.
///
/// Charset 1 (ASCII) is the supported encoding; anything else is decoded
/// best-effort from the raw bytes with a warning, never a failure. The string
/// stops at the first NUL or non-printable byte.
fn decode_marking(charset: u8, bytes: &[u8]) -> String {
    if charset != MARKING_CHARSET_ASCII {
        log::warn!(
            "[espdu] marking charset {} is not ASCII, decoding raw bytes best-effort",
            charset
        );
    }
    let printable_len = bytes
        .iter()
        .position(|&b| b == 0 || !(0x20..0x7F).contains(&b))
        .unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..printable_len]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pdu() -> EntityStatePdu {
        EntityStatePdu {
            entity_id: EntityId { site: 11, application: 22, entity: 33 },
            force_id: 1,
            entity_type: EntityType {
                kind: 1,
                domain: 2,
                country: 225,
                category: 1,
                subcategory: 2,
                specific: 3,
                extra: 0,
            },
            linear_velocity: [10.0, -5.5, 0.25],
            location: [4517590.87, 0.0, 4487348.41],
            orientation: EulerAngles { psi: 0.5, theta: -0.25, phi: 0.125 },
            appearance: 0x0000_0018,
            marking: "ALPHA".to_string(),
            capabilities: 0xDEAD_BEEF,
            ..EntityStatePdu::default()
        }
    }

    #[test]
    fn test_roundtrip_fixed_fields() {
        let pdu = sample_pdu();
        let bytes = pdu.encode();
        assert_eq!(bytes.len(), ESPDU_FIXED_LEN);

        let decoded = EntityStatePdu::decode(&bytes).expect("valid PDU should decode");
        assert_eq!(decoded.entity_id, pdu.entity_id);
        assert_eq!(decoded.force_id, pdu.force_id);
        assert_eq!(decoded.entity_type, pdu.entity_type);
        assert_eq!(decoded.alternative_entity_type, pdu.alternative_entity_type);
        assert_eq!(decoded.linear_velocity, pdu.linear_velocity);
        assert_eq!(decoded.location, pdu.location);
        assert_eq!(decoded.orientation, pdu.orientation);
        assert_eq!(decoded.appearance, pdu.appearance);
        assert_eq!(decoded.marking, "ALPHA");
        assert_eq!(decoded.capabilities, pdu.capabilities);
        assert_eq!(decoded.header.length as usize, ESPDU_FIXED_LEN);
        assert!(decoded.articulations.is_empty());
    }

    #[test]
    fn test_too_short_never_panics() {
        for len in 0..ESPDU_FIXED_LEN {
            let bytes = vec![0u8; len];
            assert_eq!(
                EntityStatePdu::decode(&bytes),
                Err(DecodeError::TooShort { len }),
                "length {} must fail with TooShort",
                len
            );
        }
    }

    #[test]
    fn test_unsupported_version_carries_value() {
        let mut bytes = sample_pdu().encode();
        bytes[0] = 5; // DIS v5 header byte
        assert_eq!(
            EntityStatePdu::decode(&bytes),
            Err(DecodeError::UnsupportedVersion(5))
        );
    }

    #[test]
    fn test_not_entity_state_filtered() {
        let mut bytes = sample_pdu().encode();
        bytes[2] = 2; // Fire PDU type
        let err = EntityStatePdu::decode(&bytes).unwrap_err();
        assert_eq!(err, DecodeError::NotEntityState { pdu_type: 2 });
        assert!(err.is_filter());
    }

    #[test]
    fn test_truncated_articulation_discards_pdu() {
        let mut pdu = sample_pdu();
        pdu.articulations.push(ArticulationParameter {
            designator: 0,
            change: 0,
            attached_to: 0,
            parameter_type: 4096,
            value: [0u8; 8],
            attached_entity: None,
        });
        let mut bytes = pdu.encode();
        // Declared one articulation record but deliver half of it.
        bytes.truncate(ESPDU_FIXED_LEN + ARTICULATION_RECORD_LEN / 2);

        assert_eq!(
            EntityStatePdu::decode(&bytes),
            Err(DecodeError::TruncatedPdu { offset: ESPDU_FIXED_LEN })
        );
    }

    #[test]
    fn test_marking_trims_at_nul() {
        let pdu = sample_pdu();
        let bytes = pdu.encode();
        // Marking field sits right after the dead reckoning block.
        let marking_start = 128;
        assert_eq!(bytes[marking_start], MARKING_CHARSET_ASCII);
        assert_eq!(&bytes[marking_start + 1..marking_start + 6], b"ALPHA");
        assert_eq!(bytes[marking_start + 6], 0);

        let decoded = EntityStatePdu::decode(&bytes).expect("decode");
        assert_eq!(decoded.marking, "ALPHA");
    }

    #[test]
    fn test_marking_non_ascii_charset_best_effort() {
        let mut bytes = sample_pdu().encode();
        bytes[128] = 0; // unspecified charset
        let decoded = EntityStatePdu::decode(&bytes).expect("decode");
        assert_eq!(decoded.marking_charset, 0);
        assert_eq!(decoded.marking, "ALPHA");
    }

    #[test]
    fn test_roundtrip_with_articulations() {
        let mut pdu = sample_pdu();
        pdu.articulations.push(ArticulationParameter {
            designator: 0,
            change: 3,
            attached_to: 1,
            parameter_type: 4107,
            value: [0x3F, 0x80, 0, 0, 0, 0, 0, 0],
            attached_entity: None,
        });
        pdu.articulations.push(ArticulationParameter {
            designator: 0,
            change: 0,
            attached_to: 0,
            parameter_type: 1,
            value: [0, 1, 0, 2, 0, 3, 0, 0],
            attached_entity: Some(EntityId { site: 1, application: 2, entity: 3 }),
        });

        let bytes = pdu.encode();
        assert_eq!(bytes.len(), ESPDU_FIXED_LEN + 2 * ARTICULATION_RECORD_LEN);
        assert_eq!(bytes[19], 2, "articulation count byte");

        let decoded = EntityStatePdu::decode(&bytes).expect("decode");
        assert_eq!(decoded.articulations.len(), 2);
        assert_eq!(decoded.articulations[0].parameter_type, 4107);
        assert!(decoded.articulations[0].attached_entity.is_none());
        assert_eq!(
            decoded.articulations[1].attached_entity,
            Some(EntityId { site: 1, application: 2, entity: 3 })
        );
    }

    #[test]
    fn test_location_at_documented_offset() {
        let mut pdu = sample_pdu();
        pdu.location = [1.0, 2.0, 3.0];
        let bytes = pdu.encode();
        // Location is 3xf64 starting at byte 48.
        assert_eq!(&bytes[48..56], &1.0f64.to_be_bytes());
        assert_eq!(&bytes[56..64], &2.0f64.to_be_bytes());
        assert_eq!(&bytes[64..72], &3.0f64.to_be_bytes());
    }
}
