// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! Datagram -> enriched report pipeline.
//!
//! One entry point per datagram: decode the Entity State PDU, derive the
//! geodetic position, local attitude and appearance flags, and publish the
//! result through the relay hub according to the configured policy. Errors
//! never propagate past this layer; a bad datagram is logged and dropped
//! while the receive loop keeps running.

use crate::appearance::AppearanceFlags;
use crate::geo::{body_to_local, ecef_to_geodetic, GeodeticPosition, OrientationAngles};
use crate::protocol::{ArticulationParameter, DecodeError, DecodeResult, EntityId, EntityStatePdu, EntityType};
use crate::relay::{RelayEvent, RelayHub, RelayPolicy};
use std::net::SocketAddr;
use std::sync::Arc;

/// A fully decoded and enriched Entity State, ready for display or relay.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStateReport {
    pub entity_id: EntityId,
    pub exercise_id: u8,
    /// DIS timestamp field as received (exercise clock units).
    pub timestamp: u32,
    pub force_id: u8,
    pub entity_type: EntityType,
    pub marking: String,
    /// ECEF velocity from the wire, metres/second.
    pub linear_velocity: [f32; 3],
    /// ECEF position from the wire, metres.
    pub location_ecef: [f64; 3],
    /// Derived WGS-84 position.
    pub position: GeodeticPosition,
    /// Derived attitude against the local tangent plane.
    pub attitude: OrientationAngles,
    pub appearance: AppearanceFlags,
    pub articulations: Vec<ArticulationParameter>,
    /// Sender of the datagram.
    pub source: SocketAddr,
    /// Size of the datagram on the wire, bytes.
    pub pdu_len: usize,
}

/// Decode a datagram and attach the derived geodetic/attitude/appearance
/// values.
///
/// The derivation order matters: the geodetic position must exist before the
/// attitude conversion, which needs the latitude and longitude of the entity
/// itself.
pub fn decode_and_enrich(bytes: &[u8], source: SocketAddr) -> DecodeResult<EntityStateReport> {
    let pdu = EntityStatePdu::decode(bytes)?;

    let [x, y, z] = pdu.location;
    let position = ecef_to_geodetic(x, y, z);
    let attitude = body_to_local(
        f64::from(pdu.orientation.psi),
        f64::from(pdu.orientation.theta),
        f64::from(pdu.orientation.phi),
        position.latitude_deg,
        position.longitude_deg,
    );
    let appearance = AppearanceFlags::decode(pdu.entity_type.domain, pdu.appearance);

    Ok(EntityStateReport {
        entity_id: pdu.entity_id,
        exercise_id: pdu.header.exercise_id,
        timestamp: pdu.header.timestamp,
        force_id: pdu.force_id,
        entity_type: pdu.entity_type,
        marking: pdu.marking,
        linear_velocity: pdu.linear_velocity,
        location_ecef: pdu.location,
        position,
        attitude,
        appearance,
        articulations: pdu.articulations,
        source,
        pdu_len: bytes.len(),
    })
}

/// Process one received datagram: decode, enrich, publish.
///
/// Returns the report when the datagram was an accepted Entity State PDU.
/// Decode failures are classified for logging: foreign PDU types are normal
/// traffic (trace), foreign protocol versions are worth noticing (debug),
/// and truncation means something on the network is broken (warn).
pub fn handle_datagram(
    hub: &RelayHub,
    policy: RelayPolicy,
    bytes: &[u8],
    source: SocketAddr,
) -> Option<Arc<EntityStateReport>> {
    let report = match decode_and_enrich(bytes, source) {
        Ok(report) => Arc::new(report),
        Err(err) => {
            match err {
                DecodeError::NotEntityState { .. } => {
                    log::trace!("[engine] {} from {}", err, source);
                }
                DecodeError::UnsupportedVersion(_) => {
                    log::debug!("[engine] {} from {}", err, source);
                }
                DecodeError::TooShort { .. } | DecodeError::TruncatedPdu { .. } => {
                    log::warn!("[engine] {} from {}", err, source);
                }
            }
            return None;
        }
    };

    log::trace!(
        "[engine] entity {} '{}' at {:.5},{:.5} from {}",
        report.entity_id,
        report.marking,
        report.position.latitude_deg,
        report.position.longitude_deg,
        source
    );

    if policy.wants_raw() {
        hub.publish(&RelayEvent::Raw {
            bytes: Arc::from(bytes.to_vec().into_boxed_slice()),
            source,
        });
    }
    if policy.wants_decoded() {
        hub.publish(&RelayEvent::Report(Arc::clone(&report)));
    }

    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ESPDU_FIXED_LEN;
    use crate::protocol::espdu::EulerAngles;
    use std::net::{IpAddr, Ipv4Addr};

    fn source() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)), 3000)
    }

    fn sample_bytes() -> Vec<u8> {
        EntityStatePdu {
            entity_id: EntityId { site: 1, application: 2, entity: 3 },
            force_id: 1,
            entity_type: EntityType {
                kind: 1,
                domain: 2,
                country: 225,
                category: 1,
                subcategory: 0,
                specific: 0,
                extra: 0,
            },
            location: [4_517_590.87, 0.0, 4_487_348.41],
            orientation: EulerAngles::default(),
            marking: "ALPHA".to_string(),
            ..EntityStatePdu::default()
        }
        .encode()
    }

    #[test]
    fn test_enrichment_end_to_end() {
        let bytes = sample_bytes();
        let report = decode_and_enrich(&bytes, source()).expect("valid PDU");

        assert_eq!(report.entity_id, EntityId { site: 1, application: 2, entity: 3 });
        assert_eq!(report.marking, "ALPHA");
        assert!((report.position.latitude_deg - 45.0).abs() < 1e-3);
        assert!(report.position.longitude_deg.abs() < 1e-9);
        assert_eq!(report.appearance.damage(), Some(crate::appearance::Damage::None));
        assert_eq!(report.pdu_len, ESPDU_FIXED_LEN);
        assert_eq!(report.source, source());
    }

    #[test]
    fn test_handle_datagram_publishes_decoded() {
        let hub = RelayHub::new();
        let sub = hub.subscribe(8);

        let report = handle_datagram(&hub, RelayPolicy::Decoded, &sample_bytes(), source());
        assert!(report.is_some());

        match sub.try_recv().expect("event expected") {
            RelayEvent::Report(r) => assert_eq!(r.marking, "ALPHA"),
            RelayEvent::Raw { .. } => panic!("decoded policy must not publish raw"),
        }
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_handle_datagram_both_publishes_raw_first() {
        let hub = RelayHub::new();
        let sub = hub.subscribe(8);
        let bytes = sample_bytes();

        handle_datagram(&hub, RelayPolicy::Both, &bytes, source());

        match sub.try_recv().expect("first event") {
            RelayEvent::Raw { bytes: raw, source: src } => {
                assert_eq!(raw.as_ref(), bytes.as_slice());
                assert_eq!(src, source());
            }
            RelayEvent::Report(_) => panic!("raw must come first under Both"),
        }
        match sub.try_recv().expect("second event") {
            RelayEvent::Report(r) => assert_eq!(r.entity_id.entity, 3),
            RelayEvent::Raw { .. } => panic!("second event must be the report"),
        }
    }

    #[test]
    fn test_handle_datagram_drops_garbage_silently() {
        let hub = RelayHub::new();
        let sub = hub.subscribe(8);

        assert!(handle_datagram(&hub, RelayPolicy::Both, &[0u8; 10], source()).is_none());

        let mut foreign = sample_bytes();
        foreign[2] = 2; // Fire PDU
        assert!(handle_datagram(&hub, RelayPolicy::Both, &foreign, source()).is_none());

        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_attitude_derived_at_entity_position() {
        // Pitch the ECEF-aligned body down 90 degrees about y: level and
        // pointing north when the entity sits at 0N 0E.
        let mut pdu = EntityStatePdu {
            location: [crate::geo::WGS84_A, 0.0, 0.0],
            orientation: EulerAngles { psi: 0.0, theta: -std::f32::consts::FRAC_PI_2, phi: 0.0 },
            ..EntityStatePdu::default()
        };
        pdu.marking = "LEVEL".to_string();

        let report = decode_and_enrich(&pdu.encode(), source()).expect("valid PDU");
        assert!(report.attitude.pitch_deg.abs() < 1e-4);
        assert!(report.attitude.roll_deg.abs() < 1e-4);
        let heading = report.attitude.heading_deg;
        assert!(heading < 1e-3 || heading > 360.0 - 1e-3, "heading {}", heading);
    }
}
