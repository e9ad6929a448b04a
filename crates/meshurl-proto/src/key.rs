//! Pre-shared key normalization.
//!
//! Channel keys arrive in two textual forms: hex (with or without a `0x`
//! prefix) or standard-alphabet base64 (padding optional). Both normalize
//! to raw bytes; display always renders lowercase hex, so the original
//! input form is not preserved. Hex wins when a string is valid under
//! both readings, which keeps `display_key` output re-parseable.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Single-byte PSK value that selects the well-known default key.
pub const DEFAULT_PSK_SENTINEL: u8 = 0x01;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid hex key: {reason}")]
    InvalidHexKey { reason: String },

    #[error("key is neither hex nor base64")]
    InvalidKeyEncoding,
}

/// Parse a pre-shared key from its textual form.
///
/// A `0x`/`0X` prefix forces hex decoding. A bare even-length string of
/// hex digits is also read as hex. Anything else is tried as standard
/// base64, re-padded to a multiple of 4 first. The empty string is a
/// valid empty key ("no encryption").
///
/// # Errors
/// Returns [`KeyError::InvalidHexKey`] for a hex-prefixed input with an
/// odd digit count or a non-hex character, and
/// [`KeyError::InvalidKeyEncoding`] when base64 decoding fails.
pub fn parse_key(input: &str) -> Result<Vec<u8>, KeyError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(digits) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        if digits.len() % 2 != 0 {
            return Err(KeyError::InvalidHexKey {
                reason: format!("odd number of digits ({})", digits.len()),
            });
        }
        return hex::decode(digits).map_err(|e| KeyError::InvalidHexKey {
            reason: e.to_string(),
        });
    }

    if input.len() % 2 == 0 && input.bytes().all(|b| b.is_ascii_hexdigit()) {
        return hex::decode(input).map_err(|e| KeyError::InvalidHexKey {
            reason: e.to_string(),
        });
    }

    let mut padded = input.to_owned();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    STANDARD
        .decode(padded)
        .map_err(|_| KeyError::InvalidKeyEncoding)
}

/// Render a key for display: lowercase hex, empty string for the empty key.
#[must_use]
pub fn display_key(key: &[u8]) -> String {
    hex::encode(key)
}

/// Whether this PSK is the single-byte default-key sentinel.
#[must_use]
pub fn is_default_key(key: &[u8]) -> bool {
    key == [DEFAULT_PSK_SENTINEL]
}
