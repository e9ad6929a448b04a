//! Radio parameter resolution.
//!
//! A [`LoRaConfig`] describes the modem either through a named preset or
//! through explicit bandwidth/spread-factor/coding-rate values; the two
//! modes are mutually exclusive. [`resolve`] reconciles both into one
//! [`ResolvedRadioParameters`]. Pure and deterministic: identical input
//! always yields the identical result or the identical failure.

use serde::Serialize;
use thiserror::Error;

use crate::channel::LoRaConfig;

/// Manual bandwidths the modem accepts, in kHz (integer-truncated steps).
pub const ALLOWED_BANDWIDTHS_KHZ: [u32; 5] = [31, 62, 125, 250, 500];

/// Spread factor bounds for manual configuration.
pub const SPREAD_FACTOR_RANGE: std::ops::RangeInclusive<u32> = 6..=12;

/// Coding rate (4/x denominator) bounds for manual configuration.
pub const CODING_RATE_RANGE: std::ops::RangeInclusive<u32> = 5..=8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RadioConfigError {
    #[error("unknown modem preset (wire value {value})")]
    UnknownPreset { value: u32 },

    #[error("invalid manual radio parameters: {field} = {value}")]
    InvalidManualRadioParameters { field: &'static str, value: u32 },

    #[error("unknown region (wire value {value})")]
    UnknownRegion { value: u32 },
}

/// Named modem presets. `Unrecognized` carries a wire value outside the
/// known set so decode never silently coerces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModemPreset {
    LongFast,
    LongSlow,
    VeryLongSlow,
    MediumSlow,
    MediumFast,
    ShortSlow,
    ShortFast,
    LongModerate,
    ShortTurbo,
    Unrecognized(u32),
}

impl ModemPreset {
    #[must_use]
    pub fn from_wire(value: u32) -> Self {
        match value {
            0 => Self::LongFast,
            1 => Self::LongSlow,
            2 => Self::VeryLongSlow,
            3 => Self::MediumSlow,
            4 => Self::MediumFast,
            5 => Self::ShortSlow,
            6 => Self::ShortFast,
            7 => Self::LongModerate,
            8 => Self::ShortTurbo,
            other => Self::Unrecognized(other),
        }
    }

    #[must_use]
    pub fn to_wire(self) -> u32 {
        match self {
            Self::LongFast => 0,
            Self::LongSlow => 1,
            Self::VeryLongSlow => 2,
            Self::MediumSlow => 3,
            Self::MediumFast => 4,
            Self::ShortSlow => 5,
            Self::ShortFast => 6,
            Self::LongModerate => 7,
            Self::ShortTurbo => 8,
            Self::Unrecognized(value) => value,
        }
    }
}

impl Default for ModemPreset {
    fn default() -> Self {
        Self::LongFast
    }
}

/// Regulatory region codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    Unset,
    Us,
    Eu433,
    Eu868,
    Cn,
    Jp,
    Anz,
    Kr,
    Tw,
    Ru,
    In,
    Nz865,
    Th,
    Lora24,
    Ua433,
    Ua868,
    My433,
    My919,
    Sg923,
    Unrecognized(u32),
}

impl Region {
    #[must_use]
    pub fn from_wire(value: u32) -> Self {
        match value {
            0 => Self::Unset,
            1 => Self::Us,
            2 => Self::Eu433,
            3 => Self::Eu868,
            4 => Self::Cn,
            5 => Self::Jp,
            6 => Self::Anz,
            7 => Self::Kr,
            8 => Self::Tw,
            9 => Self::Ru,
            10 => Self::In,
            11 => Self::Nz865,
            12 => Self::Th,
            13 => Self::Lora24,
            14 => Self::Ua433,
            15 => Self::Ua868,
            16 => Self::My433,
            17 => Self::My919,
            18 => Self::Sg923,
            other => Self::Unrecognized(other),
        }
    }

    #[must_use]
    pub fn to_wire(self) -> u32 {
        match self {
            Self::Unset => 0,
            Self::Us => 1,
            Self::Eu433 => 2,
            Self::Eu868 => 3,
            Self::Cn => 4,
            Self::Jp => 5,
            Self::Anz => 6,
            Self::Kr => 7,
            Self::Tw => 8,
            Self::Ru => 9,
            Self::In => 10,
            Self::Nz865 => 11,
            Self::Th => 12,
            Self::Lora24 => 13,
            Self::Ua433 => 14,
            Self::Ua868 => 15,
            Self::My433 => 16,
            Self::My919 => 17,
            Self::Sg923 => 18,
            Self::Unrecognized(value) => value,
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::Unset
    }
}

/// The canonical parameter set every configuration resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRadioParameters {
    pub bandwidth_khz: u32,
    pub spread_factor: u32,
    pub coding_rate: u32,
}

/// Immutable preset → parameter mapping, constructed once and shared
/// read-only.
#[derive(Debug)]
pub struct PresetTable {
    entries: [(ModemPreset, ResolvedRadioParameters); 9],
}

impl PresetTable {
    #[must_use]
    pub fn new() -> Self {
        const fn params(bandwidth_khz: u32, spread_factor: u32, coding_rate: u32) -> ResolvedRadioParameters {
            ResolvedRadioParameters {
                bandwidth_khz,
                spread_factor,
                coding_rate,
            }
        }
        Self {
            entries: [
                (ModemPreset::ShortTurbo, params(500, 7, 5)),
                (ModemPreset::ShortFast, params(250, 7, 5)),
                (ModemPreset::ShortSlow, params(250, 8, 5)),
                (ModemPreset::MediumFast, params(250, 9, 5)),
                (ModemPreset::MediumSlow, params(250, 10, 5)),
                (ModemPreset::LongFast, params(250, 11, 5)),
                (ModemPreset::LongModerate, params(125, 11, 8)),
                (ModemPreset::LongSlow, params(125, 12, 8)),
                (ModemPreset::VeryLongSlow, params(62, 12, 8)),
            ],
        }
    }

    #[must_use]
    pub fn lookup(&self, preset: ModemPreset) -> Option<ResolvedRadioParameters> {
        self.entries
            .iter()
            .find(|(p, _)| *p == preset)
            .map(|(_, params)| *params)
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a [`LoRaConfig`] into concrete modem parameters.
///
/// With `use_preset` set, the manual fields are ignored entirely and the
/// preset is looked up in `table`; otherwise the manual fields are
/// validated and passed through.
///
/// # Errors
/// [`RadioConfigError::UnknownRegion`] for a region outside the table,
/// [`RadioConfigError::UnknownPreset`] for an unlisted preset, and
/// [`RadioConfigError::InvalidManualRadioParameters`] naming the first
/// out-of-range manual field.
pub fn resolve(
    config: &LoRaConfig,
    table: &PresetTable,
) -> Result<ResolvedRadioParameters, RadioConfigError> {
    if let Region::Unrecognized(value) = config.region {
        return Err(RadioConfigError::UnknownRegion { value });
    }

    if config.use_preset {
        return table
            .lookup(config.modem_preset)
            .ok_or(RadioConfigError::UnknownPreset {
                value: config.modem_preset.to_wire(),
            });
    }

    if !SPREAD_FACTOR_RANGE.contains(&config.spread_factor) {
        return Err(RadioConfigError::InvalidManualRadioParameters {
            field: "spread_factor",
            value: config.spread_factor,
        });
    }
    if !CODING_RATE_RANGE.contains(&config.coding_rate) {
        return Err(RadioConfigError::InvalidManualRadioParameters {
            field: "coding_rate",
            value: config.coding_rate,
        });
    }
    if !ALLOWED_BANDWIDTHS_KHZ.contains(&config.bandwidth_khz) {
        return Err(RadioConfigError::InvalidManualRadioParameters {
            field: "bandwidth_khz",
            value: config.bandwidth_khz,
        });
    }

    Ok(ResolvedRadioParameters {
        bandwidth_khz: config.bandwidth_khz,
        spread_factor: config.spread_factor,
        coding_rate: config.coding_rate,
    })
}
