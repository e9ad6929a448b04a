//! `meshurl decode` - decode a channel URL and display its contents.

use clap::Args;
use meshurl_proto::{
    ChannelRole, ChannelSet, DecodedConfig, PresetTable, decode_bytes, decode_payload, display_key,
    extract_payload, resolve,
};
use serde_json::json;

#[derive(Args)]
pub struct DecodeArgs {
    /// Channel URL, or a bare base64url payload (as read from a QR code).
    pub url: String,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Print a human-readable summary instead of JSON.
    #[arg(long)]
    pub summary: bool,
}

pub fn run(args: &DecodeArgs) -> anyhow::Result<()> {
    // Decode stage by stage so failures can report how far the input got.
    let payload = match extract_payload(&args.url) {
        Ok(p) => p.to_owned(),
        Err(e) => return fail(args, &e.to_string(), None, None),
    };
    let bytes = match decode_payload(&payload) {
        Ok(b) => b,
        Err(e) => return fail(args, &e.to_string(), Some(&payload), None),
    };
    let config = match decode_bytes(&bytes) {
        Ok(c) => c,
        Err(e) => return fail(args, &e.to_string(), Some(&payload), Some(&bytes)),
    };

    if args.summary {
        print_summary(&config);
        return Ok(());
    }

    let kind = match &config {
        DecodedConfig::ChannelSet(_) => "channel_set",
        DecodedConfig::Channel(_) => "channel",
    };
    let envelope = json!({
        "success": true,
        "url": args.url,
        "kind": kind,
        "config": config,
    });
    print_json(&envelope, args.pretty)?;
    Ok(())
}

/// Emit the failure envelope with whatever diagnostics the input earned,
/// then exit nonzero. The hex dump is what makes wire-level offsets in the
/// error message actionable.
fn fail(
    args: &DecodeArgs,
    error: &str,
    payload: Option<&str>,
    bytes: Option<&[u8]>,
) -> anyhow::Result<()> {
    if args.summary {
        println!("Decoding failed: {error}");
    } else {
        let mut raw_data = serde_json::Map::new();
        if let Some(payload) = payload {
            raw_data.insert("encoded_data".into(), json!(payload));
            raw_data.insert("encoded_length".into(), json!(payload.len()));
        }
        if let Some(bytes) = bytes {
            raw_data.insert("decoded_length".into(), json!(bytes.len()));
            raw_data.insert("hex_data".into(), json!(hex::encode(bytes)));
        }
        let envelope = json!({
            "success": false,
            "url": args.url,
            "error": error,
            "raw_data": raw_data,
        });
        print_json(&envelope, args.pretty)?;
    }
    std::process::exit(1);
}

fn print_json(envelope: &serde_json::Value, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(envelope)?);
    } else {
        println!("{}", serde_json::to_string(envelope)?);
    }
    Ok(())
}

fn print_summary(config: &DecodedConfig) {
    match config {
        DecodedConfig::ChannelSet(set) => {
            println!("Channel set with {} channel(s)", set.channels.len());
            print_channels(set);
            print_radio(set);
        }
        DecodedConfig::Channel(channel) => {
            println!("Single channel");
            println!(
                "  [{}] {} ({}){}",
                channel.index,
                name_or_default(&channel.settings.name),
                role_label(channel.role),
                psk_suffix(&channel.settings.psk),
            );
        }
    }
}

fn print_channels(set: &ChannelSet) {
    for channel in &set.channels {
        println!(
            "  [{}] {} ({}){}",
            channel.index,
            name_or_default(&channel.settings.name),
            role_label(channel.role),
            psk_suffix(&channel.settings.psk),
        );
    }
}

fn print_radio(set: &ChannelSet) {
    let config = &set.lora_config;
    println!("Radio: region {:?}, hop limit {}", config.region, config.hop_limit);
    let table = PresetTable::new();
    match resolve(config, &table) {
        Ok(params) => println!(
            "  modem: {} kHz, SF{}, CR 4/{}{}",
            params.bandwidth_khz,
            params.spread_factor,
            params.coding_rate,
            if config.use_preset {
                format!(" (preset {:?})", config.modem_preset)
            } else {
                String::new()
            },
        ),
        Err(e) => println!("  modem: unresolved ({e})"),
    }
}

fn name_or_default(name: &str) -> &str {
    if name.is_empty() { "(default)" } else { name }
}

fn role_label(role: ChannelRole) -> String {
    match role {
        ChannelRole::Disabled => "disabled".to_owned(),
        ChannelRole::Primary => "primary".to_owned(),
        ChannelRole::Secondary => "secondary".to_owned(),
        ChannelRole::Unrecognized(value) => format!("unrecognized role {value}"),
    }
}

fn psk_suffix(psk: &[u8]) -> String {
    if psk.is_empty() {
        " psk=none".to_owned()
    } else if meshurl_proto::is_default_key(psk) {
        " psk=default".to_owned()
    } else {
        format!(" psk={}", display_key(psk))
    }
}
