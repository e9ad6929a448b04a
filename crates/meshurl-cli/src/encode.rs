//! `meshurl encode` - build a shareable channel URL from flags.

use anyhow::{Context, bail};
use clap::Args;
use meshurl_proto::{
    Channel, ChannelRole, ChannelSet, ChannelSettings, DEFAULT_PSK_SENTINEL, LoRaConfig,
    ModemPreset, ModuleSettings, PresetTable, Region, UrlStyle, build_url, encode_channel_set,
    encode_payload, parse_key, resolve,
};

#[derive(Args)]
pub struct EncodeArgs {
    /// Channel display name (empty selects the device default).
    #[arg(long, default_value = "")]
    pub name: String,

    /// Pre-shared key: hex (0x-prefixed or bare), base64, `default`, or
    /// `none`.
    #[arg(long, default_value = "default")]
    pub psk: String,

    /// Channel role: primary, secondary, or disabled.
    #[arg(long, default_value = "primary")]
    pub role: String,

    /// Enable MQTT uplink for this channel.
    #[arg(long)]
    pub uplink: bool,

    /// Enable MQTT downlink for this channel.
    #[arg(long)]
    pub downlink: bool,

    /// Bits of location precision shared on this channel (0 disables).
    #[arg(long, default_value_t = 0)]
    pub position_precision: u32,

    /// Regulatory region, e.g. us, eu-868, anz.
    #[arg(long, default_value = "unset")]
    pub region: String,

    /// Modem preset, e.g. long-fast. Mutually exclusive with the manual
    /// flags below.
    #[arg(long, conflicts_with_all = ["bandwidth", "spread_factor", "coding_rate"])]
    pub preset: Option<String>,

    /// Manual bandwidth in kHz (31, 62, 125, 250, or 500).
    #[arg(long)]
    pub bandwidth: Option<u32>,

    /// Manual spread factor (6-12).
    #[arg(long)]
    pub spread_factor: Option<u32>,

    /// Manual coding rate denominator (5-8).
    #[arg(long)]
    pub coding_rate: Option<u32>,

    /// URL shape to produce: fragment (canonical) or query.
    #[arg(long, default_value = "fragment")]
    pub style: String,
}

pub fn run(args: &EncodeArgs) -> anyhow::Result<()> {
    let psk = match args.psk.as_str() {
        "default" => vec![DEFAULT_PSK_SENTINEL],
        "none" => Vec::new(),
        other => parse_key(other).with_context(|| format!("bad --psk value {other:?}"))?,
    };

    let role = match args.role.to_ascii_lowercase().as_str() {
        "primary" => ChannelRole::Primary,
        "secondary" => ChannelRole::Secondary,
        "disabled" => ChannelRole::Disabled,
        other => bail!("unknown --role {other:?} (expected primary, secondary, or disabled)"),
    };

    let style = match args.style.to_ascii_lowercase().as_str() {
        "fragment" => UrlStyle::Fragment,
        "query" => UrlStyle::Query,
        other => bail!("unknown --style {other:?} (expected fragment or query)"),
    };

    let lora_config = lora_from_args(args)?;

    let set = ChannelSet {
        channels: vec![Channel {
            settings: ChannelSettings {
                name: args.name.clone(),
                psk,
                uplink_enabled: args.uplink,
                downlink_enabled: args.downlink,
                module_settings: ModuleSettings {
                    position_precision: args.position_precision,
                },
            },
            role,
            index: 0,
        }],
        lora_config,
    };

    // Resolve up front so a bad region or preset fails here, not on a device.
    let table = PresetTable::new();
    resolve(&set.lora_config, &table).context("radio configuration does not resolve")?;

    let bytes = encode_channel_set(&set).context("channel configuration failed validation")?;
    println!("{}", build_url(&encode_payload(&bytes), style));
    Ok(())
}

fn lora_from_args(args: &EncodeArgs) -> anyhow::Result<LoRaConfig> {
    let region = parse_region(&args.region)?;

    match (args.bandwidth, args.spread_factor, args.coding_rate) {
        (Some(bandwidth_khz), Some(spread_factor), Some(coding_rate)) => {
            return Ok(LoRaConfig {
                use_preset: false,
                bandwidth_khz,
                spread_factor,
                coding_rate,
                region,
                ..LoRaConfig::default()
            });
        }
        (None, None, None) => {}
        _ => bail!(
            "manual radio parameters need --bandwidth, --spread-factor, and --coding-rate together"
        ),
    }

    let modem_preset = match args.preset.as_deref() {
        None => ModemPreset::LongFast,
        Some(name) => parse_preset(name)?,
    };
    Ok(LoRaConfig {
        use_preset: true,
        modem_preset,
        region,
        ..LoRaConfig::default()
    })
}

fn parse_preset(name: &str) -> anyhow::Result<ModemPreset> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "long-fast" => ModemPreset::LongFast,
        "long-moderate" => ModemPreset::LongModerate,
        "long-slow" => ModemPreset::LongSlow,
        "very-long-slow" => ModemPreset::VeryLongSlow,
        "medium-fast" => ModemPreset::MediumFast,
        "medium-slow" => ModemPreset::MediumSlow,
        "short-fast" => ModemPreset::ShortFast,
        "short-slow" => ModemPreset::ShortSlow,
        "short-turbo" => ModemPreset::ShortTurbo,
        other => bail!("unknown --preset {other:?}"),
    })
}

fn parse_region(name: &str) -> anyhow::Result<Region> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "unset" => Region::Unset,
        "us" => Region::Us,
        "eu-433" => Region::Eu433,
        "eu-868" => Region::Eu868,
        "cn" => Region::Cn,
        "jp" => Region::Jp,
        "anz" => Region::Anz,
        "kr" => Region::Kr,
        "tw" => Region::Tw,
        "ru" => Region::Ru,
        "in" => Region::In,
        "nz-865" => Region::Nz865,
        "th" => Region::Th,
        "lora-24" => Region::Lora24,
        "ua-433" => Region::Ua433,
        "ua-868" => Region::Ua868,
        "my-433" => Region::My433,
        "my-919" => Region::My919,
        "sg-923" => Region::Sg923,
        other => bail!("unknown --region {other:?}"),
    })
}
