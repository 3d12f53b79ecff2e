// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! Articulation parameter records (IEEE 1278.1 Sec.5.3.5).
//!
//! Each record is 16 bytes: designator, change indicator, attached-to id,
//! parameter type, and an 8-byte value. One record describing a malformed
//! parameter never fails the batch - it is logged and skipped while the rest
//! continue to decode.

use super::cursor::{PduReader, PduWriter};
use super::EntityId;
use crate::config::ARTICULATION_RECORD_LEN;
use std::fmt::Write as _;

/// Parameter type designator: the part is articulated (moves relative to the
/// entity, e.g. a turret azimuth).
pub const DESIGNATOR_ARTICULATED_PART: u8 = 0;
/// Parameter type designator: the part is attached (a store or sub-object
/// with its own identity).
pub const DESIGNATOR_ATTACHED_PART: u8 = 1;

/// Parameter type code whose value carries an attached-part Entity ID
/// (site/application/entity as three big-endian u16 in the first six value
/// bytes). This is the convention the observed exercise traffic uses.
pub const PARAMETER_TYPE_ATTACHED_ID: u32 = 1;

/// One decoded articulation parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticulationParameter {
    pub designator: u8,
    pub change: u8,
    /// Part id this parameter is attached to (0 = the entity itself).
    pub attached_to: u16,
    pub parameter_type: u32,
    /// Raw 8-byte parameter value, kept verbatim.
    pub value: [u8; 8],
    /// Nested Entity ID, decoded eagerly when the designator/type combination
    /// marks the value as an attached-part identifier.
    pub attached_entity: Option<EntityId>,
}

impl ArticulationParameter {
    /// Decode one 16-byte record. Returns `None` (and logs) for a record of
    /// the wrong size instead of failing the caller's batch.
    pub fn decode(record: &[u8]) -> Option<Self> {
        if record.len() != ARTICULATION_RECORD_LEN {
            log::warn!(
                "[articulation] malformed record: {} bytes, expected {}",
                record.len(),
                ARTICULATION_RECORD_LEN
            );
            return None;
        }

        let mut reader = PduReader::new(record);
        // Infallible on a size-checked record; keep the bounds checks anyway.
        let designator = reader.read_u8().ok()?;
        let change = reader.read_u8().ok()?;
        let attached_to = reader.read_u16_be().ok()?;
        let parameter_type = reader.read_u32_be().ok()?;
        let mut value = [0u8; 8];
        value.copy_from_slice(reader.read_bytes(8).ok()?);

        let attached_entity = if designator == DESIGNATOR_ARTICULATED_PART
            && parameter_type == PARAMETER_TYPE_ATTACHED_ID
        {
            Some(EntityId {
                site: u16::from_be_bytes([value[0], value[1]]),
                application: u16::from_be_bytes([value[2], value[3]]),
                entity: u16::from_be_bytes([value[4], value[5]]),
            })
        } else {
            None
        };

        Some(Self {
            designator,
            change,
            attached_to,
            parameter_type,
            value,
            attached_entity,
        })
    }

    /// Decode a buffer of consecutive 16-byte records. A trailing partial
    /// record is skipped with a warning; complete records still decode.
    pub fn decode_batch(buffer: &[u8]) -> Vec<Self> {
        let mut params = Vec::with_capacity(buffer.len() / ARTICULATION_RECORD_LEN);
        for chunk in buffer.chunks(ARTICULATION_RECORD_LEN) {
            if let Some(param) = Self::decode(chunk) {
                params.push(param);
            }
        }
        params
    }

    pub(crate) fn write(&self, writer: &mut PduWriter) {
        writer.write_u8(self.designator);
        writer.write_u8(self.change);
        writer.write_u16_be(self.attached_to);
        writer.write_u32_be(self.parameter_type);
        writer.write_bytes(&self.value);
    }

    /// Hexadecimal rendering of the raw value for display.
    #[must_use]
    pub fn value_hex(&self) -> String {
        let mut hex = String::with_capacity(16);
        for byte in self.value {
            let _ = write!(hex, "{:02x}", byte);
        }
        hex
    }
}
