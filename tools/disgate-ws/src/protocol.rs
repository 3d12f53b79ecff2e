// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! WebSocket protocol messages for the entity state relay.
//!
//! JSON-based protocol for browser consumption of live DIS traffic.

use disgate::appearance::AppearanceFlags;
use disgate::engine::EntityStateReport;
use disgate::protocol::ArticulationParameter;
use disgate::EntityId;
use serde::{Deserialize, Serialize};

/// Client -> Server messages
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ping (keepalive)
    Ping {
        #[serde(default)]
        id: Option<u64>,
    },
}

/// Server -> Client messages
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Welcome message on connection
    Welcome {
        version: String,
        relay: String,
        dis_port: u16,
    },

    /// One decoded Entity State
    Entity(EntityMessage),

    /// Pong response
    Pong {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
    },

    /// Error occurred
    Error { message: String },
}

/// JSON shape of one enriched entity state.
#[derive(Debug, Clone, Serialize)]
pub struct EntityMessage {
    pub entity: EntityIdMessage,
    pub exercise: u8,
    pub timestamp: u32,
    pub force: u8,
    pub marking: String,
    pub kind: u8,
    pub domain: u8,
    pub country: u16,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub velocity_ecef: [f32; 3],
    pub appearance: AppearanceMessage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub articulations: Vec<ArticulationMessage>,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityIdMessage {
    pub site: u16,
    pub application: u16,
    pub entity: u16,
}

impl From<EntityId> for EntityIdMessage {
    fn from(id: EntityId) -> Self {
        Self {
            site: id.site,
            application: id.application,
            entity: id.entity,
        }
    }
}

/// Flattened appearance summary: the domain-common fields plus the raw word
/// so specialized clients can decode the rest themselves.
#[derive(Debug, Clone, Serialize)]
pub struct AppearanceMessage {
    pub damage: Option<String>,
    pub flaming: bool,
    pub smoke: bool,
    pub frozen: bool,
    pub deactivated: bool,
}

impl From<&AppearanceFlags> for AppearanceMessage {
    fn from(flags: &AppearanceFlags) -> Self {
        let damage = flags.damage().map(|d| d.to_string());
        let (flaming, smoke, frozen, deactivated) = match flags {
            AppearanceFlags::Land(a) => (a.flaming, a.smoke_emanating, a.frozen, a.deactivated),
            AppearanceFlags::Air(a) => (a.flaming, a.smoke_emanating, a.frozen, a.deactivated),
            AppearanceFlags::Surface(a) => (a.flaming, a.smoke_emanating, a.frozen, a.deactivated),
            AppearanceFlags::Subsurface(a) => {
                (a.flaming, a.smoke_emanating, a.frozen, a.deactivated)
            }
            AppearanceFlags::Unknown { .. } => (false, false, false, false),
        };
        Self {
            damage,
            flaming,
            smoke,
            frozen,
            deactivated,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticulationMessage {
    pub designator: u8,
    pub parameter_type: u32,
    pub value_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_entity: Option<EntityIdMessage>,
}

impl From<&ArticulationParameter> for ArticulationMessage {
    fn from(param: &ArticulationParameter) -> Self {
        Self {
            designator: param.designator,
            parameter_type: param.parameter_type,
            value_hex: param.value_hex(),
            attached_entity: param.attached_entity.map(EntityIdMessage::from),
        }
    }
}

impl From<&EntityStateReport> for EntityMessage {
    fn from(report: &EntityStateReport) -> Self {
        Self {
            entity: report.entity_id.into(),
            exercise: report.exercise_id,
            timestamp: report.timestamp,
            force: report.force_id,
            marking: report.marking.clone(),
            kind: report.entity_type.kind,
            domain: report.entity_type.domain,
            country: report.entity_type.country,
            latitude_deg: report.position.latitude_deg,
            longitude_deg: report.position.longitude_deg,
            altitude_m: report.position.altitude_m,
            heading_deg: report.attitude.heading_deg,
            pitch_deg: report.attitude.pitch_deg,
            roll_deg: report.attitude.roll_deg,
            velocity_ecef: report.linear_velocity,
            appearance: AppearanceMessage::from(&report.appearance),
            articulations: report
                .articulations
                .iter()
                .map(ArticulationMessage::from)
                .collect(),
            source: report.source.to_string(),
        }
    }
}

impl ServerMessage {
    pub fn welcome(relay: &str, dis_port: u16) -> Self {
        Self::Welcome {
            version: env!("CARGO_PKG_VERSION").to_string(),
            relay: relay.to_string(),
            dis_port,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
