//! Channel-URL developer CLI entrypoint.
//!
//! - `meshurl decode` - decode a channel URL to JSON or a summary
//! - `meshurl encode` - build a shareable URL from channel/radio flags

#![forbid(unsafe_code)]

mod decode;
mod encode;

use clap::{Parser, Subcommand};

/// Decode and build Meshtastic channel URLs.
#[derive(Parser)]
#[command(name = "meshurl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a channel URL (or bare payload) and display its contents.
    ///
    /// Prints a machine-readable JSON envelope by default; `--summary`
    /// renders a human-readable digest instead.
    ///
    /// Example: meshurl decode https://meshtastic.org/e/#CgkSB0RlZmF1bHQQAQ
    Decode(decode::DecodeArgs),

    /// Build a shareable channel URL from channel and radio flags.
    ///
    /// Example: meshurl encode --name Default --psk default --region us
    Encode(encode::EncodeArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for JSON output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode(args) => decode::run(&args),
        Commands::Encode(args) => encode::run(&args),
    }
}
