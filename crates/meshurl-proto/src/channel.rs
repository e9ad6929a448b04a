//! Channel configuration messages and their wire assembly.
//!
//! Three message shapes travel inside channel URLs:
//!
//! - [`ChannelSet`]: the usual payload, repeated [`Channel`] sub-messages
//!   plus one [`LoRaConfig`].
//! - [`Channel`]: a single channel, emitted as the top-level message with
//!   no wrapping.
//! - The nested [`ChannelSettings`] / `ModuleSettings` carried by both.
//!
//! The URL format has no type discriminant, so decoding is a two-shot
//! attempt: parse as `ChannelSet` first, fall back to `Channel`, and if
//! both fail surface whichever failure is more specific. A known field
//! number arriving with the wrong wire type is the structural signal that
//! separates the two interpretations; unknown field numbers are skipped
//! for forward compatibility.

use serde::Serialize;
use thiserror::Error;

use crate::key;
use crate::radio::{ModemPreset, Region};
use crate::wire::{FieldReader, FieldValue, FieldWriter, WireError};

/// Channel names are capped at 11 bytes of UTF-8 on the wire.
pub const MAX_CHANNEL_NAME_BYTES: usize = 11;

/// Location precision is expressed in bits of a 32-bit coordinate.
pub const MAX_POSITION_PRECISION: u32 = 32;

mod channel_settings_fields {
    pub const PSK: u32 = 1;
    pub const NAME: u32 = 2;
    pub const UPLINK_ENABLED: u32 = 3;
    pub const DOWNLINK_ENABLED: u32 = 4;
    pub const MODULE_SETTINGS: u32 = 5;
}

mod module_settings_fields {
    pub const POSITION_PRECISION: u32 = 1;
}

mod channel_fields {
    pub const SETTINGS: u32 = 1;
    pub const ROLE: u32 = 2;
    pub const INDEX: u32 = 3;
}

mod lora_config_fields {
    pub const USE_PRESET: u32 = 1;
    pub const MODEM_PRESET: u32 = 2;
    pub const BANDWIDTH: u32 = 3;
    pub const SPREAD_FACTOR: u32 = 4;
    pub const CODING_RATE: u32 = 5;
    pub const REGION: u32 = 6;
    pub const FREQUENCY_OFFSET: u32 = 7;
    pub const HOP_LIMIT: u32 = 8;
    pub const TX_POWER: u32 = 9;
    pub const TX_ENABLED: u32 = 10;
    pub const RX_BOOSTED_GAIN: u32 = 11;
    pub const OVERRIDE_DUTY_CYCLE: u32 = 12;
}

mod channel_set_fields {
    pub const SETTINGS: u32 = 1;
    pub const LORA_CONFIG: u32 = 2;
}

/// Invariant violations caught before encoding (and enforced again on
/// decoded values).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("channel name {name:?} is {len} bytes, limit is {MAX_CHANNEL_NAME_BYTES}")]
    ChannelNameTooLong { name: String, len: usize },

    #[error("position_precision {value} is out of range 0..={MAX_POSITION_PRECISION}")]
    PositionPrecisionOutOfRange { value: u32 },

    #[error("channels at positions {first} and {second} are both primary")]
    MultiplePrimaryChannels { first: usize, second: usize },
}

/// Message assembly/disassembly errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MessageError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("{message} shape not recognized: {detail}")]
    NoRecognizedShape {
        message: &'static str,
        detail: String,
    },

    #[error(
        "payload matches neither message shape (as channel set: {channel_set}; as channel: {channel})"
    )]
    AmbiguousMessageType {
        channel_set: String,
        channel: String,
    },

    #[error(transparent)]
    Invalid(#[from] EncodeError),
}

impl MessageError {
    fn unexpected_wire_type(message: &'static str, field: u32, value: &FieldValue<'_>) -> Self {
        Self::NoRecognizedShape {
            message,
            detail: format!(
                "field {field} arrived with wire type {}",
                value.wire_type()
            ),
        }
    }

    /// Ranking used to pick the survivor when both decode attempts fail.
    /// Wire-level failures pinpoint an offset; invariant failures name a
    /// field; bare shape mismatches are the least specific.
    fn specificity(&self) -> u8 {
        match self {
            Self::Wire(_) => 2,
            Self::Invalid(_) => 1,
            _ => 0,
        }
    }
}

/// Channel role on the mesh. Exactly one channel in a set may be primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelRole {
    #[default]
    Disabled,
    Primary,
    Secondary,
    Unrecognized(u32),
}

impl ChannelRole {
    #[must_use]
    pub fn from_wire(value: u32) -> Self {
        match value {
            0 => Self::Disabled,
            1 => Self::Primary,
            2 => Self::Secondary,
            other => Self::Unrecognized(other),
        }
    }

    #[must_use]
    pub fn to_wire(self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::Primary => 1,
            Self::Secondary => 2,
            Self::Unrecognized(value) => value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleSettings {
    pub position_precision: u32,
}

impl ModuleSettings {
    fn encode_writer(&self) -> FieldWriter {
        let mut writer = FieldWriter::new();
        writer.varint_field(
            module_settings_fields::POSITION_PRECISION,
            u64::from(self.position_precision),
        );
        writer
    }

    fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        let mut reader = FieldReader::new(bytes);
        let mut out = Self::default();
        while let Some((field, value)) = reader.next_field()? {
            match (field, value) {
                (module_settings_fields::POSITION_PRECISION, FieldValue::Varint(v)) => {
                    out.position_precision = v as u32;
                }
                (module_settings_fields::POSITION_PRECISION, other) => {
                    return Err(MessageError::unexpected_wire_type(
                        "module_settings",
                        field,
                        &other,
                    ));
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

/// Per-channel settings: display name, encryption key, MQTT gating, and
/// position-sharing precision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelSettings {
    pub name: String,
    #[serde(serialize_with = "serialize_psk")]
    pub psk: Vec<u8>,
    pub uplink_enabled: bool,
    pub downlink_enabled: bool,
    pub module_settings: ModuleSettings,
}

fn serialize_psk<S>(psk: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&key::display_key(psk))
}

impl ChannelSettings {
    /// Check the invariants shared by the encode and decode paths.
    ///
    /// # Errors
    /// Returns the violated invariant.
    pub fn validate(&self) -> Result<(), EncodeError> {
        let len = self.name.len();
        if len > MAX_CHANNEL_NAME_BYTES {
            return Err(EncodeError::ChannelNameTooLong {
                name: self.name.clone(),
                len,
            });
        }
        if self.module_settings.position_precision > MAX_POSITION_PRECISION {
            return Err(EncodeError::PositionPrecisionOutOfRange {
                value: self.module_settings.position_precision,
            });
        }
        Ok(())
    }

    fn encode_writer(&self) -> FieldWriter {
        let mut writer = FieldWriter::new();
        writer.bytes_field(channel_settings_fields::PSK, &self.psk);
        writer.string_field(channel_settings_fields::NAME, &self.name);
        writer.bool_field(channel_settings_fields::UPLINK_ENABLED, self.uplink_enabled);
        writer.bool_field(
            channel_settings_fields::DOWNLINK_ENABLED,
            self.downlink_enabled,
        );
        writer.message_field(
            channel_settings_fields::MODULE_SETTINGS,
            self.module_settings.encode_writer(),
        );
        writer
    }

    fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        use channel_settings_fields as f;

        let mut reader = FieldReader::new(bytes);
        let mut out = Self::default();
        while let Some((field, value)) = reader.next_field()? {
            match (field, value) {
                (f::PSK, FieldValue::Bytes(b)) => out.psk = b.to_vec(),
                (f::NAME, FieldValue::Bytes(b)) => {
                    out.name = String::from_utf8_lossy(b).into_owned();
                }
                (f::UPLINK_ENABLED, FieldValue::Varint(v)) => out.uplink_enabled = v != 0,
                (f::DOWNLINK_ENABLED, FieldValue::Varint(v)) => out.downlink_enabled = v != 0,
                (f::MODULE_SETTINGS, FieldValue::Bytes(b)) => {
                    out.module_settings = ModuleSettings::decode(b)?;
                }
                (
                    field @ (f::PSK | f::NAME | f::UPLINK_ENABLED | f::DOWNLINK_ENABLED
                    | f::MODULE_SETTINGS),
                    other,
                ) => {
                    return Err(MessageError::unexpected_wire_type(
                        "channel_settings",
                        field,
                        &other,
                    ));
                }
                _ => {}
            }
        }
        out.validate()?;
        Ok(out)
    }
}

/// One channel slot: settings plus its role and position in the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub settings: ChannelSettings,
    pub role: ChannelRole,
    pub index: u32,
}

impl Channel {
    /// Encode as a top-level message (no wrapping).
    ///
    /// # Errors
    /// Returns an [`EncodeError`] when the settings violate an invariant.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.encode_writer()?.into_bytes())
    }

    fn encode_writer(&self) -> Result<FieldWriter, EncodeError> {
        self.settings.validate()?;
        let mut writer = FieldWriter::new();
        writer.message_field(channel_fields::SETTINGS, self.settings.encode_writer());
        writer.varint_field(channel_fields::ROLE, u64::from(self.role.to_wire()));
        writer.varint_field(channel_fields::INDEX, u64::from(self.index));
        Ok(writer)
    }

    /// Decode a top-level single-channel message.
    ///
    /// A payload with none of the channel fields is rejected here; that
    /// shape check is what keeps the two-shot fallback from accepting
    /// arbitrary bytes. Nested set elements skip it via
    /// [`decode_element`](Self::decode_element).
    ///
    /// # Errors
    /// Wire-level failures, shape mismatches, and invariant violations all
    /// surface as [`MessageError`].
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        let (out, saw_any) = Self::decode_element(bytes)?;
        if !saw_any {
            return Err(MessageError::NoRecognizedShape {
                message: "channel",
                detail: "no channel fields present".to_owned(),
            });
        }
        Ok(out)
    }

    fn decode_element(bytes: &[u8]) -> Result<(Self, bool), MessageError> {
        use channel_fields as f;

        let mut reader = FieldReader::new(bytes);
        let mut out = Self::default();
        let mut saw_any = false;
        while let Some((field, value)) = reader.next_field()? {
            match (field, value) {
                (f::SETTINGS, FieldValue::Bytes(b)) => {
                    out.settings = ChannelSettings::decode(b)?;
                    saw_any = true;
                }
                (f::ROLE, FieldValue::Varint(v)) => {
                    out.role = ChannelRole::from_wire(v as u32);
                    saw_any = true;
                }
                (f::INDEX, FieldValue::Varint(v)) => {
                    out.index = v as u32;
                    saw_any = true;
                }
                (field @ (f::SETTINGS | f::ROLE | f::INDEX), other) => {
                    return Err(MessageError::unexpected_wire_type("channel", field, &other));
                }
                _ => {}
            }
        }
        Ok((out, saw_any))
    }
}

/// Radio-wide settings shared by every channel in a set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoRaConfig {
    pub use_preset: bool,
    pub modem_preset: ModemPreset,
    pub bandwidth_khz: u32,
    pub spread_factor: u32,
    pub coding_rate: u32,
    pub region: Region,
    pub frequency_offset_hz: f32,
    pub hop_limit: u32,
    pub tx_power_dbm: i32,
    pub tx_enabled: bool,
    pub rx_boosted_gain: bool,
    pub override_duty_cycle: bool,
}

impl LoRaConfig {
    fn encode_writer(&self) -> FieldWriter {
        use lora_config_fields as f;

        let mut writer = FieldWriter::new();
        writer.bool_field(f::USE_PRESET, self.use_preset);
        if self.use_preset {
            writer.varint_field(f::MODEM_PRESET, u64::from(self.modem_preset.to_wire()));
        } else {
            writer.varint_field(f::BANDWIDTH, u64::from(self.bandwidth_khz));
            writer.varint_field(f::SPREAD_FACTOR, u64::from(self.spread_factor));
            writer.varint_field(f::CODING_RATE, u64::from(self.coding_rate));
        }
        writer.varint_field(f::REGION, u64::from(self.region.to_wire()));
        writer.float_field(f::FREQUENCY_OFFSET, self.frequency_offset_hz);
        writer.varint_field(f::HOP_LIMIT, u64::from(self.hop_limit));
        // int32 semantics: negative powers sign-extend to ten varint bytes
        writer.varint_field(f::TX_POWER, self.tx_power_dbm as u64);
        writer.bool_field(f::TX_ENABLED, self.tx_enabled);
        writer.bool_field(f::RX_BOOSTED_GAIN, self.rx_boosted_gain);
        writer.bool_field(f::OVERRIDE_DUTY_CYCLE, self.override_duty_cycle);
        writer
    }

    fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        use lora_config_fields as f;

        let mut reader = FieldReader::new(bytes);
        let mut out = Self::default();
        while let Some((field, value)) = reader.next_field()? {
            match (field, value) {
                (f::USE_PRESET, FieldValue::Varint(v)) => out.use_preset = v != 0,
                (f::MODEM_PRESET, FieldValue::Varint(v)) => {
                    out.modem_preset = ModemPreset::from_wire(v as u32);
                }
                (f::BANDWIDTH, FieldValue::Varint(v)) => out.bandwidth_khz = v as u32,
                (f::SPREAD_FACTOR, FieldValue::Varint(v)) => out.spread_factor = v as u32,
                (f::CODING_RATE, FieldValue::Varint(v)) => out.coding_rate = v as u32,
                (f::REGION, FieldValue::Varint(v)) => out.region = Region::from_wire(v as u32),
                (f::FREQUENCY_OFFSET, FieldValue::Fixed32(bits)) => {
                    out.frequency_offset_hz = f32::from_bits(bits);
                }
                (f::HOP_LIMIT, FieldValue::Varint(v)) => out.hop_limit = v as u32,
                (f::TX_POWER, FieldValue::Varint(v)) => out.tx_power_dbm = v as i32,
                (f::TX_ENABLED, FieldValue::Varint(v)) => out.tx_enabled = v != 0,
                (f::RX_BOOSTED_GAIN, FieldValue::Varint(v)) => out.rx_boosted_gain = v != 0,
                (f::OVERRIDE_DUTY_CYCLE, FieldValue::Varint(v)) => {
                    out.override_duty_cycle = v != 0;
                }
                (field @ 1..=12, other) => {
                    return Err(MessageError::unexpected_wire_type(
                        "lora_config",
                        field,
                        &other,
                    ));
                }
                _ => {}
            }
        }
        if out.use_preset {
            // preset and manual parameters are mutually exclusive; a foreign
            // encoder that sent both loses the manual side
            out.bandwidth_khz = 0;
            out.spread_factor = 0;
            out.coding_rate = 0;
        }
        Ok(out)
    }
}

/// Ordered channels plus the shared radio configuration, as carried by a
/// shareable URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelSet {
    pub channels: Vec<Channel>,
    pub lora_config: LoRaConfig,
}

impl ChannelSet {
    /// Check set-level invariants: at most one primary channel, and every
    /// channel's own invariants.
    ///
    /// # Errors
    /// Returns the violated invariant.
    pub fn validate(&self) -> Result<(), EncodeError> {
        let mut primary: Option<usize> = None;
        for (position, channel) in self.channels.iter().enumerate() {
            channel.settings.validate()?;
            if channel.role == ChannelRole::Primary {
                if let Some(first) = primary {
                    return Err(EncodeError::MultiplePrimaryChannels {
                        first,
                        second: position,
                    });
                }
                primary = Some(position);
            }
        }
        Ok(())
    }

    /// Encode the set: one sub-message per channel, then the radio config.
    ///
    /// # Errors
    /// Returns an [`EncodeError`] when validation fails.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let mut writer = FieldWriter::new();
        for channel in &self.channels {
            writer.repeated_message_field(channel_set_fields::SETTINGS, channel.encode_writer()?);
        }
        writer.message_field(
            channel_set_fields::LORA_CONFIG,
            self.lora_config.encode_writer(),
        );
        Ok(writer.into_bytes())
    }

    /// Decode a top-level channel-set message.
    ///
    /// # Errors
    /// Wire-level failures, shape mismatches, and invariant violations all
    /// surface as [`MessageError`].
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        use channel_set_fields as f;

        let mut reader = FieldReader::new(bytes);
        let mut out = Self::default();
        let mut saw_lora = false;
        while let Some((field, value)) = reader.next_field()? {
            match (field, value) {
                (f::SETTINGS, FieldValue::Bytes(b)) => {
                    out.channels.push(Channel::decode_element(b)?.0);
                }
                (f::LORA_CONFIG, FieldValue::Bytes(b)) => {
                    out.lora_config = LoRaConfig::decode(b)?;
                    saw_lora = true;
                }
                (field @ (f::SETTINGS | f::LORA_CONFIG), other) => {
                    return Err(MessageError::unexpected_wire_type(
                        "channel_set",
                        field,
                        &other,
                    ));
                }
                _ => {}
            }
        }
        if out.channels.is_empty() && !saw_lora {
            return Err(MessageError::NoRecognizedShape {
                message: "channel_set",
                detail: "no channels and no radio config present".to_owned(),
            });
        }
        out.validate()?;
        Ok(out)
    }
}

/// Result of the two-shot decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedConfig {
    ChannelSet(ChannelSet),
    Channel(Channel),
}

impl DecodedConfig {
    /// Seed a fresh editable configuration from a decoded one ("load
    /// settings"). A lone channel becomes a one-channel set with a default
    /// radio config; the result shares nothing with the source.
    #[must_use]
    pub fn into_channel_set(self) -> ChannelSet {
        match self {
            Self::ChannelSet(set) => set,
            Self::Channel(channel) => ChannelSet {
                channels: vec![channel],
                lora_config: LoRaConfig::default(),
            },
        }
    }
}

/// Decode raw payload bytes: attempt [`ChannelSet`] first, fall back to
/// [`Channel`] on the same bytes.
///
/// # Errors
/// When both attempts fail, the more specific failure wins; two equally
/// unspecific shape mismatches combine into
/// [`MessageError::AmbiguousMessageType`].
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedConfig, MessageError> {
    let set_err = match ChannelSet::decode(bytes) {
        Ok(set) => return Ok(DecodedConfig::ChannelSet(set)),
        Err(e) => e,
    };
    let channel_err = match Channel::decode(bytes) {
        Ok(channel) => return Ok(DecodedConfig::Channel(channel)),
        Err(e) => e,
    };

    if set_err.specificity() == 0 && channel_err.specificity() == 0 {
        return Err(MessageError::AmbiguousMessageType {
            channel_set: set_err.to_string(),
            channel: channel_err.to_string(),
        });
    }
    if channel_err.specificity() > set_err.specificity() {
        Err(channel_err)
    } else {
        Err(set_err)
    }
}
