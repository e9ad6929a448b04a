//! Channel-URL payload extraction and base64url transcoding.
//!
//! Two URL shapes carry a payload: a fragment (`.../e/#<data>`, the
//! canonical form) and a query parameter (`.../e/?c=<data>`). A bare
//! string with no URL structure is treated as the payload itself, which
//! is how raw QR scan output arrives. Output is always unpadded
//! base64url; input may be padded or not, and either base64 alphabet.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use thiserror::Error;

/// Base for newly built URLs. Hosts are never validated on the way in.
pub const CANONICAL_BASE: &str = "https://meshtastic.org/e/";

/// Which URL shape to produce. Fragment is the canonical output form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlStyle {
    #[default]
    Fragment,
    Query,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("no encoded channel data found in URL")]
    NoEncodedData,

    #[error("invalid base64url payload: {reason}")]
    InvalidBase64 { reason: String },
}

/// Pull the base64url text out of a URL-ish string.
///
/// Precedence: non-empty fragment, then a non-empty `c` query parameter,
/// then (when the string has no URL structure at all) the whole string.
///
/// # Errors
/// [`UrlError::NoEncodedData`] when a URL-shaped string carries neither.
pub fn extract_payload(url: &str) -> Result<&str, UrlError> {
    let url = url.trim();

    if let Some(pos) = url.find('#') {
        let fragment = &url[pos + 1..];
        if !fragment.is_empty() {
            return Ok(fragment);
        }
    }

    if let Some(pos) = url.find('?') {
        let query = url[pos + 1..].split('#').next().unwrap_or("");
        for pair in query.split('&') {
            if let Some(value) = pair.strip_prefix("c=") {
                if !value.is_empty() {
                    return Ok(value);
                }
            }
        }
    }

    let looks_like_url = url.is_empty() || url.contains("://") || url.contains('/');
    if looks_like_url || url.contains('#') || url.contains('?') {
        return Err(UrlError::NoEncodedData);
    }
    Ok(url)
}

/// Decode base64url text into payload bytes, re-padding first so both
/// padded and unpadded input are accepted.
///
/// # Errors
/// [`UrlError::InvalidBase64`] on characters outside both alphabets.
pub fn decode_payload(text: &str) -> Result<Vec<u8>, UrlError> {
    let mut padded = text.to_owned();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    URL_SAFE
        .decode(&padded)
        .or_else(|_| STANDARD.decode(&padded))
        .map_err(|e| UrlError::InvalidBase64 {
            reason: e.to_string(),
        })
}

/// Encode payload bytes in the canonical form: base64url, no padding.
#[must_use]
pub fn encode_payload(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build a shareable URL around already-encoded payload text.
#[must_use]
pub fn build_url(payload: &str, style: UrlStyle) -> String {
    match style {
        UrlStyle::Fragment => format!("{CANONICAL_BASE}#{payload}"),
        UrlStyle::Query => format!("{CANONICAL_BASE}?c={payload}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_wins_over_query() {
        let url = "https://meshtastic.org/e/?c=QUFB#QkJC";
        assert_eq!(extract_payload(url).expect("extract ok"), "QkJC");
    }

    #[test]
    fn query_parameter_is_found() {
        let url = "https://meshtastic.org/e/?foo=1&c=QkJC";
        assert_eq!(extract_payload(url).expect("extract ok"), "QkJC");
    }

    #[test]
    fn bare_payload_passes_through() {
        assert_eq!(
            extract_payload("CgkSB0RlZmF1bHQQAQ").expect("extract ok"),
            "CgkSB0RlZmF1bHQQAQ"
        );
    }

    #[test]
    fn url_without_payload_is_rejected() {
        for url in [
            "https://meshtastic.org/e/",
            "https://meshtastic.org/e/#",
            "https://meshtastic.org/e/?c=",
            "",
        ] {
            assert_eq!(
                extract_payload(url).expect_err("should fail"),
                UrlError::NoEncodedData,
                "url {url:?}"
            );
        }
    }

    #[test]
    fn padded_and_unpadded_decode_identically() {
        let padded = decode_payload("AQID").expect("decode ok");
        let unpadded = decode_payload("AQIDBA==").expect("decode ok");
        assert_eq!(padded, vec![0x01, 0x02, 0x03]);
        assert_eq!(unpadded, vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(
            decode_payload("AQIDBA").expect("decode ok"),
            vec![0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn both_alphabets_are_accepted() {
        // 0xfb 0xff encodes as "-_8" url-safe, "+/8" standard
        assert_eq!(decode_payload("-_8").expect("decode ok"), vec![0xFB, 0xFF]);
        assert_eq!(decode_payload("+/8").expect("decode ok"), vec![0xFB, 0xFF]);
    }

    #[test]
    fn invalid_characters_are_rejected() {
        let err = decode_payload("not base64!").expect_err("should fail");
        assert!(matches!(err, UrlError::InvalidBase64 { .. }));
    }

    #[test]
    fn canonical_output_is_unpadded_urlsafe() {
        let text = encode_payload(&[0xFB, 0xFF]);
        assert_eq!(text, "-_8");
        assert_eq!(decode_payload(&text).expect("decode ok"), vec![0xFB, 0xFF]);
    }

    #[test]
    fn built_urls_roundtrip_through_extraction() {
        for style in [UrlStyle::Fragment, UrlStyle::Query] {
            let url = build_url("QkJC", style);
            assert_eq!(extract_payload(&url).expect("extract ok"), "QkJC");
        }
    }

    #[test]
    fn fragment_style_is_canonical() {
        assert_eq!(
            build_url("abc", UrlStyle::Fragment),
            "https://meshtastic.org/e/#abc"
        );
        assert_eq!(
            build_url("abc", UrlStyle::Query),
            "https://meshtastic.org/e/?c=abc"
        );
    }
}
