// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! Entity appearance bitfield interpretation.
//!
//! The 32-bit appearance word changes meaning with the entity-type domain.
//! All platform domains share the 2-bit damage field in bits 3-4; the
//! surrounding flags differ. An unrecognized domain never fails - the raw
//! word is carried through so nothing downstream loses information.

use std::fmt;

/// Entity-type domain codes (IEEE 1278.1 enumerations).
pub const DOMAIN_LAND: u8 = 1;
pub const DOMAIN_AIR: u8 = 2;
pub const DOMAIN_SURFACE: u8 = 3;
pub const DOMAIN_SUBSURFACE: u8 = 4;

/// Damage state, bits 3-4 of the appearance word for every platform domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    None,
    Slight,
    Moderate,
    Destroyed,
}

impl Damage {
    fn from_word(word: u32) -> Self {
        match (word >> 3) & 0b11 {
            0 => Damage::None,
            1 => Damage::Slight,
            2 => Damage::Moderate,
            _ => Damage::Destroyed,
        }
    }
}

impl fmt::Display for Damage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Damage::None => "none",
            Damage::Slight => "slight",
            Damage::Moderate => "moderate",
            Damage::Destroyed => "destroyed",
        };
        f.write_str(label)
    }
}

/// Land platform appearance flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandAppearance {
    pub damage: Damage,
    pub mobility_killed: bool,
    pub firepower_killed: bool,
    pub smoke_emanating: bool,
    pub engine_smoke: bool,
    pub flaming: bool,
    pub frozen: bool,
    pub powerplant_on: bool,
    pub deactivated: bool,
}

/// Air platform appearance flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirAppearance {
    pub damage: Damage,
    pub propulsion_killed: bool,
    pub smoke_emanating: bool,
    pub engine_smoke: bool,
    pub flaming: bool,
    pub afterburner_on: bool,
    pub frozen: bool,
    pub powerplant_on: bool,
    pub deactivated: bool,
}

/// Surface (ship) platform appearance flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceAppearance {
    pub damage: Damage,
    pub mobility_killed: bool,
    pub smoke_emanating: bool,
    pub flaming: bool,
    pub frozen: bool,
    pub powerplant_on: bool,
    pub deactivated: bool,
}

/// Subsurface (submarine) platform appearance flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsurfaceAppearance {
    pub damage: Damage,
    pub mobility_killed: bool,
    pub smoke_emanating: bool,
    pub flaming: bool,
    pub frozen: bool,
    pub powerplant_on: bool,
    pub deactivated: bool,
}

/// Domain-tagged appearance decode result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppearanceFlags {
    Land(LandAppearance),
    Air(AirAppearance),
    Surface(SurfaceAppearance),
    Subsurface(SubsurfaceAppearance),
    /// Domain without a known bit layout; raw word preserved.
    Unknown { raw: u32 },
}

fn bit(word: u32, n: u32) -> bool {
    (word >> n) & 1 == 1
}

impl AppearanceFlags {
    /// Interpret `word` according to the entity-type `domain`.
    ///
    /// Never fails: an unrecognized domain yields [`AppearanceFlags::Unknown`]
    /// so appearance decoding can never abort PDU processing.
    #[must_use]
    pub fn decode(domain: u8, word: u32) -> Self {
        match domain {
            DOMAIN_LAND => AppearanceFlags::Land(LandAppearance {
                damage: Damage::from_word(word),
                mobility_killed: bit(word, 1),
                firepower_killed: bit(word, 2),
                smoke_emanating: bit(word, 5),
                engine_smoke: bit(word, 6),
                flaming: bit(word, 15),
                frozen: bit(word, 21),
                powerplant_on: bit(word, 22),
                deactivated: bit(word, 23),
            }),
            DOMAIN_AIR => AppearanceFlags::Air(AirAppearance {
                damage: Damage::from_word(word),
                propulsion_killed: bit(word, 1),
                smoke_emanating: bit(word, 5),
                engine_smoke: bit(word, 6),
                flaming: bit(word, 15),
                afterburner_on: bit(word, 16),
                frozen: bit(word, 21),
                powerplant_on: bit(word, 22),
                deactivated: bit(word, 23),
            }),
            DOMAIN_SURFACE => AppearanceFlags::Surface(SurfaceAppearance {
                damage: Damage::from_word(word),
                mobility_killed: bit(word, 1),
                smoke_emanating: bit(word, 5),
                flaming: bit(word, 15),
                frozen: bit(word, 21),
                powerplant_on: bit(word, 22),
                deactivated: bit(word, 23),
            }),
            DOMAIN_SUBSURFACE => AppearanceFlags::Subsurface(SubsurfaceAppearance {
                damage: Damage::from_word(word),
                mobility_killed: bit(word, 1),
                smoke_emanating: bit(word, 5),
                flaming: bit(word, 15),
                frozen: bit(word, 21),
                powerplant_on: bit(word, 22),
                deactivated: bit(word, 23),
            }),
            _ => AppearanceFlags::Unknown { raw: word },
        }
    }

    /// Damage state regardless of domain; `None` for unknown domains.
    #[must_use]
    pub fn damage(&self) -> Option<Damage> {
        match self {
            AppearanceFlags::Land(a) => Some(a.damage),
            AppearanceFlags::Air(a) => Some(a.damage),
            AppearanceFlags::Surface(a) => Some(a.damage),
            AppearanceFlags::Subsurface(a) => Some(a.damage),
            AppearanceFlags::Unknown { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_field_extraction() {
        assert_eq!(Damage::from_word(0x0000_0000), Damage::None);
        assert_eq!(Damage::from_word(0x0000_0008), Damage::Slight);
        assert_eq!(Damage::from_word(0x0000_0010), Damage::Moderate);
        assert_eq!(Damage::from_word(0x0000_0018), Damage::Destroyed);
    }

    #[test]
    fn test_land_flags() {
        let flags = AppearanceFlags::decode(DOMAIN_LAND, (1 << 1) | (1 << 5) | (1 << 15) | 0x10);
        match flags {
            AppearanceFlags::Land(a) => {
                assert_eq!(a.damage, Damage::Moderate);
                assert!(a.mobility_killed);
                assert!(a.smoke_emanating);
                assert!(a.flaming);
                assert!(!a.firepower_killed);
                assert!(!a.frozen);
            }
            other => panic!("expected Land, got {:?}", other),
        }
    }

    #[test]
    fn test_air_afterburner() {
        let flags = AppearanceFlags::decode(DOMAIN_AIR, 1 << 16);
        match flags {
            AppearanceFlags::Air(a) => {
                assert!(a.afterburner_on);
                assert_eq!(a.damage, Damage::None);
            }
            other => panic!("expected Air, got {:?}", other),
        }
    }

    #[test]
    fn test_surface_and_subsurface_share_damage_bits() {
        let word = 0x0000_0018;
        assert_eq!(
            AppearanceFlags::decode(DOMAIN_SURFACE, word).damage(),
            Some(Damage::Destroyed)
        );
        assert_eq!(
            AppearanceFlags::decode(DOMAIN_SUBSURFACE, word).damage(),
            Some(Damage::Destroyed)
        );
    }

    #[test]
    fn test_unknown_domain_preserves_raw_word() {
        let flags = AppearanceFlags::decode(9, 0xCAFE_F00D);
        assert_eq!(flags, AppearanceFlags::Unknown { raw: 0xCAFE_F00D });
        assert_eq!(flags.damage(), None);
    }

    #[test]
    fn test_clean_word_is_damage_none() {
        let flags = AppearanceFlags::decode(DOMAIN_LAND, 0);
        assert_eq!(flags.damage(), Some(Damage::None));
    }
}
