//! Payload Decode Fuzz Target
//!
//! Fuzzes the two-shot message decode on arbitrary bytes:
//! - Wire-format parsing (varints, length prefixes, fixed-width fields)
//! - Shape inference between channel-set and single-channel layouts
//! - Invariant validation on decoded values
//!
//! Goal: Ensure no panics and no out-of-bounds reads on arbitrary input;
//! every outcome is a typed result.

#![no_main]

use libfuzzer_sys::fuzz_target;
use meshurl_proto::decode_bytes;

fuzz_target!(|data: &[u8]| {
    // Any decoded value must survive re-encoding: decode is only allowed
    // to produce values that pass its own validation.
    if let Ok(config) = decode_bytes(data) {
        let set = config.into_channel_set();
        let _ = meshurl_proto::encode_channel_set(&set);
    }
});
