//! Codec for Meshtastic-style channel-configuration URLs.
//!
//! A shareable URL embeds a binary payload (restricted protobuf wire
//! format, base64url-encoded) describing either a full [`ChannelSet`]
//! (channels plus radio config) or a single [`Channel`]. This crate is
//! the pure codec: URL payload extraction, the wire format, key
//! normalization, and preset resolution. It performs no I/O, keeps no
//! state between calls, and never logs; transports and UIs live
//! elsewhere.
//!
//! Decode direction: [`decode_url`] (or [`decode_bytes`] for raw QR scan
//! output) → [`DecodedConfig`]. Encode direction: [`encode_channel_set`]
//! / [`encode_channel`] → bytes → [`url_for`].

#![forbid(unsafe_code)]

mod channel;
mod key;
mod radio;
mod url;
mod wire;

pub use channel::{
    Channel, ChannelRole, ChannelSet, ChannelSettings, DecodedConfig, EncodeError, LoRaConfig,
    MAX_CHANNEL_NAME_BYTES, MAX_POSITION_PRECISION, MessageError, ModuleSettings,
};
pub use key::{DEFAULT_PSK_SENTINEL, KeyError, display_key, is_default_key, parse_key};
pub use radio::{
    ALLOWED_BANDWIDTHS_KHZ, CODING_RATE_RANGE, ModemPreset, PresetTable, RadioConfigError, Region,
    ResolvedRadioParameters, SPREAD_FACTOR_RANGE, resolve,
};
pub use url::{
    CANONICAL_BASE, UrlError, UrlStyle, build_url, decode_payload, encode_payload, extract_payload,
};
pub use wire::{FieldReader, FieldValue, FieldWriter, WireError};

use thiserror::Error;

/// Umbrella error for the decode direction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error(transparent)]
    Url(#[from] UrlError),

    #[error(transparent)]
    Message(#[from] MessageError),
}

/// Decode a channel URL (or a bare base64url payload) into its
/// configuration.
///
/// # Errors
/// [`DecodeError::Url`] when no payload can be extracted or the base64 is
/// invalid; [`DecodeError::Message`] when the bytes match neither message
/// shape or violate an invariant.
pub fn decode_url(input: &str) -> Result<DecodedConfig, DecodeError> {
    let payload = extract_payload(input)?;
    let bytes = decode_payload(payload)?;
    decode_bytes(&bytes)
}

/// Decode raw payload bytes (e.g. straight from a QR scan).
///
/// # Errors
/// [`DecodeError::Message`] as for [`decode_url`].
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedConfig, DecodeError> {
    Ok(channel::decode_bytes(bytes)?)
}

/// Encode a full channel set into payload bytes.
///
/// # Errors
/// Returns an [`EncodeError`] when validation fails (overlong name,
/// position precision out of range, more than one primary channel).
pub fn encode_channel_set(set: &ChannelSet) -> Result<Vec<u8>, EncodeError> {
    set.encode()
}

/// Encode a single channel into payload bytes (no set wrapping).
///
/// # Errors
/// Returns an [`EncodeError`] when validation fails.
pub fn encode_channel(channel: &Channel) -> Result<Vec<u8>, EncodeError> {
    channel.encode()
}

/// Canonical shareable URL for already-encoded payload bytes:
/// fragment-style, unpadded base64url.
#[must_use]
pub fn url_for(bytes: &[u8]) -> String {
    build_url(&encode_payload(bytes), UrlStyle::Fragment)
}
