//! URL Transcoder Fuzz Target
//!
//! Fuzzes payload extraction and base64url decoding on arbitrary text,
//! then feeds whatever decodes through the full message decode.
//!
//! Goal: Ensure no panics on arbitrary URLs, fragments, query strings, or
//! raw payload text.

#![no_main]

use libfuzzer_sys::fuzz_target;
use meshurl_proto::{decode_payload, decode_url, extract_payload};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(payload) = extract_payload(text) {
        let _ = decode_payload(payload);
    }

    let _ = decode_url(text);
});
