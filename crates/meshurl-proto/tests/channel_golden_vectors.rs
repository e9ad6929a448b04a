//! Golden vectors for the channel-URL wire contract.
//!
//! These vectors pin the exact byte layout other Meshtastic-URL tools
//! produce and consume: field numbers, nesting, default omission, and
//! the unpadded base64url transport form. A layout change that breaks
//! one of these breaks interoperability, not just this crate.

use meshurl_proto::{
    Channel, ChannelRole, ChannelSet, ChannelSettings, DecodeError, DecodedConfig, LoRaConfig,
    MessageError, ModemPreset, ModuleSettings, PresetTable, Region, WireError, decode_bytes,
    decode_url, encode_channel, encode_channel_set, resolve, url_for,
};

// ============================================================================
// Test Constants
// ============================================================================

/// Single primary channel named "Default", as a bare fragment payload.
const DEFAULT_CHANNEL_B64: &str = "CgkSB0RlZmF1bHQQAQ";

/// The same value as exact wire bytes.
const DEFAULT_CHANNEL_BYTES: [u8; 13] = [
    0x0A, 0x09, // field 1 (settings), 9 bytes
    0x12, 0x07, b'D', b'e', b'f', b'a', b'u', b'l', b't', // settings.name = "Default"
    0x10, 0x01, // field 2 (role) = PRIMARY
];

/// Two-channel set: "Main" primary, "Alt" secondary, LONG_FAST preset, US.
const TWO_CHANNEL_SET_BYTES: [u8; 31] = [
    0x0A, 0x0A, // field 1 (channel), 10 bytes
    0x0A, 0x06, 0x12, 0x04, b'M', b'a', b'i', b'n', // settings.name = "Main"
    0x10, 0x01, // role = PRIMARY
    0x0A, 0x0B, // field 1 (channel), 11 bytes
    0x0A, 0x05, 0x12, 0x03, b'A', b'l', b't', // settings.name = "Alt"
    0x10, 0x02, // role = SECONDARY
    0x18, 0x01, // index = 1
    0x12, 0x04, // field 2 (lora_config), 4 bytes
    0x08, 0x01, // use_preset = true (LONG_FAST itself is the zero default)
    0x30, 0x01, // region = US
];

/// Sample string shipped in the upstream docs. Byte 5 carries wire type 3
/// (group start), which the restricted format rejects.
const GARBLED_UPSTREAM_B64: &str = "CgMSAQoLCgdEZWZhdWx0EAE";

fn two_channel_set() -> ChannelSet {
    ChannelSet {
        channels: vec![
            Channel {
                settings: ChannelSettings {
                    name: "Main".to_owned(),
                    ..ChannelSettings::default()
                },
                role: ChannelRole::Primary,
                index: 0,
            },
            Channel {
                settings: ChannelSettings {
                    name: "Alt".to_owned(),
                    ..ChannelSettings::default()
                },
                role: ChannelRole::Secondary,
                index: 1,
            },
        ],
        lora_config: LoRaConfig {
            use_preset: true,
            modem_preset: ModemPreset::LongFast,
            region: Region::Us,
            ..LoRaConfig::default()
        },
    }
}

// ============================================================================
// Bare payload → single channel
// ============================================================================

#[test]
fn bare_payload_decodes_to_primary_default_channel() {
    let decoded = decode_url(DEFAULT_CHANNEL_B64).expect("decode ok");
    match decoded {
        DecodedConfig::Channel(channel) => {
            assert_eq!(channel.role, ChannelRole::Primary);
            assert_eq!(channel.settings.name, "Default");
            assert_eq!(channel.index, 0);
        }
        DecodedConfig::ChannelSet(set) => panic!("decoded as channel set: {set:?}"),
    }
}

#[test]
fn default_channel_encodes_to_exact_bytes() {
    let channel = Channel {
        settings: ChannelSettings {
            name: "Default".to_owned(),
            ..ChannelSettings::default()
        },
        role: ChannelRole::Primary,
        index: 0,
    };
    let encoded = encode_channel(&channel).expect("encode ok");
    assert_eq!(encoded, DEFAULT_CHANNEL_BYTES);
    assert_eq!(
        url_for(&encoded),
        format!("https://meshtastic.org/e/#{DEFAULT_CHANNEL_B64}")
    );
}

#[test]
fn garbled_upstream_sample_fails_with_wire_error_not_panic() {
    let err = decode_url(GARBLED_UPSTREAM_B64).expect_err("should fail");
    match err {
        DecodeError::Message(MessageError::Wire(WireError::UnsupportedWireType {
            wire_type,
            ..
        })) => assert_eq!(wire_type, 3),
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Two-channel set golden vector
// ============================================================================

#[test]
fn two_channel_set_encodes_to_exact_bytes() {
    let encoded = encode_channel_set(&two_channel_set()).expect("encode ok");
    assert_eq!(encoded, TWO_CHANNEL_SET_BYTES);
}

#[test]
fn two_channel_set_roundtrips_with_resolved_preset() {
    let encoded = encode_channel_set(&two_channel_set()).expect("encode ok");
    let decoded = match decode_bytes(&encoded).expect("decode ok") {
        DecodedConfig::ChannelSet(set) => set,
        DecodedConfig::Channel(c) => panic!("decoded as single channel: {c:?}"),
    };

    assert_eq!(decoded.channels.len(), 2);
    assert_eq!(decoded.channels[0].settings.name, "Main");
    assert_eq!(decoded.channels[0].role, ChannelRole::Primary);
    assert_eq!(decoded.channels[1].settings.name, "Alt");
    assert_eq!(decoded.channels[1].role, ChannelRole::Secondary);

    let table = PresetTable::new();
    let params = resolve(&decoded.lora_config, &table).expect("resolve ok");
    assert_eq!(params.bandwidth_khz, 250);
    assert_eq!(params.spread_factor, 11);
    assert_eq!(params.coding_rate, 5);
}

#[test]
fn both_url_shapes_decode_to_the_same_config() {
    let encoded = encode_channel_set(&two_channel_set()).expect("encode ok");
    let fragment = url_for(&encoded);
    let payload = fragment
        .rsplit('#')
        .next()
        .expect("fragment URL has payload");
    let query = format!("https://meshtastic.org/e/?c={payload}");

    assert_eq!(
        decode_url(&fragment).expect("fragment decode ok"),
        decode_url(&query).expect("query decode ok")
    );
}

// ============================================================================
// Field layout details
// ============================================================================

#[test]
fn psk_occupies_field_one_of_settings() {
    let channel = Channel {
        settings: ChannelSettings {
            psk: vec![0x01],
            ..ChannelSettings::default()
        },
        role: ChannelRole::Primary,
        index: 0,
    };
    let encoded = encode_channel(&channel).expect("encode ok");
    // settings sub-message: tag 0x0A len 3, then psk: tag 0x0A len 1 value 1
    assert_eq!(&encoded[..5], &[0x0A, 0x03, 0x0A, 0x01, 0x01]);
}

#[test]
fn module_settings_nest_inside_settings_field_five() {
    let channel = Channel {
        settings: ChannelSettings {
            module_settings: ModuleSettings {
                position_precision: 32,
            },
            ..ChannelSettings::default()
        },
        role: ChannelRole::Primary,
        index: 0,
    };
    let encoded = encode_channel(&channel).expect("encode ok");
    // settings(4 bytes) → module_settings: tag 0x2A len 2 → precision: tag 0x08 value 32
    assert_eq!(&encoded[..6], &[0x0A, 0x04, 0x2A, 0x02, 0x08, 0x20]);
}

#[test]
fn frequency_offset_rides_fixed32() {
    let set = ChannelSet {
        channels: vec![Channel {
            settings: ChannelSettings {
                name: "f".to_owned(),
                ..ChannelSettings::default()
            },
            role: ChannelRole::Primary,
            index: 0,
        }],
        lora_config: LoRaConfig {
            frequency_offset_hz: 1.5,
            ..LoRaConfig::default()
        },
    };
    let encoded = encode_channel_set(&set).expect("encode ok");
    // lora_config trailer: tag 0x12 len 5, field 7 fixed32 (tag 0x3D), 1.5f32 LE
    let trailer = &encoded[encoded.len() - 7..];
    assert_eq!(trailer, &[0x12, 0x05, 0x3D, 0x00, 0x00, 0xC0, 0x3F]);

    let decoded = match decode_bytes(&encoded).expect("decode ok") {
        DecodedConfig::ChannelSet(set) => set,
        DecodedConfig::Channel(c) => panic!("decoded as single channel: {c:?}"),
    };
    assert_eq!(decoded.lora_config.frequency_offset_hz, 1.5);
}

// ============================================================================
// Forward compatibility and failure modes
// ============================================================================

#[test]
fn appended_unknown_field_does_not_change_known_fields() {
    let mut bytes = encode_channel_set(&two_channel_set()).expect("encode ok");
    let clean = decode_bytes(&bytes).expect("decode ok");

    // field 100, length-delimited, 4 opaque bytes
    bytes.extend_from_slice(&[0xA2, 0x06, 0x04, 0xDE, 0xAD, 0xBE, 0xEF]);
    let extended = decode_bytes(&bytes).expect("decode ok");

    assert_eq!(clean, extended);
}

#[test]
fn truncated_declared_length_fails_with_truncated_message() {
    let mut bytes = encode_channel_set(&two_channel_set()).expect("encode ok");
    bytes.truncate(7); // first channel declares 10 payload bytes

    let err = decode_bytes(&bytes).expect_err("should fail");
    match err {
        DecodeError::Message(MessageError::Wire(WireError::TruncatedMessage {
            needed,
            available,
            ..
        })) => {
            assert_eq!(needed, 10);
            assert_eq!(available, 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn json_form_renders_psk_as_hex_and_roles_as_names() {
    let set = ChannelSet {
        channels: vec![Channel {
            settings: ChannelSettings {
                name: "Sec".to_owned(),
                psk: vec![0xAA, 0xBB, 0xCC, 0xDD],
                ..ChannelSettings::default()
            },
            role: ChannelRole::Primary,
            index: 0,
        }],
        lora_config: LoRaConfig::default(),
    };
    let encoded = encode_channel_set(&set).expect("encode ok");
    let decoded = decode_bytes(&encoded).expect("decode ok");

    let json = serde_json::to_value(&decoded).expect("serialize ok");
    assert_eq!(json["channels"][0]["settings"]["psk"], "aabbccdd");
    assert_eq!(json["channels"][0]["role"], "PRIMARY");
    assert_eq!(json["lora_config"]["region"], "UNSET");
}

#[test]
fn random_text_payload_is_ambiguous_or_invalid() {
    // decodes as base64 fine but matches neither message shape
    let err = decode_url("aGVsbG8gd29ybGQh").expect_err("should fail");
    assert!(matches!(err, DecodeError::Message(_)), "got {err:?}");
}
