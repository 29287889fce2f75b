//! NeuroStream CLI
//!
//! Decode and analyze hex-encoded telemetry frames from the command line.

use anyhow::Context;
use clap::{Parser, Subcommand};
use neurostream_core::{
    analysis::{preprocess_with_limit, ViewAssembler},
    buffer::StreamBuffer,
    config::CoreConfig,
    frame::{frame_header, parse_frame},
    VERSION,
};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "neurostream")]
#[command(version = VERSION)]
#[command(about = "Decode and analyze bio-signal telemetry frames", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one hex frame and print the assembled view as JSON
    Decode {
        /// File containing the hex frame; "-" or omitted reads stdin
        input: Option<PathBuf>,

        /// Print a frame header summary to stderr before decoding
        #[arg(long)]
        header: bool,

        /// Route the frame through a session buffer and report only the
        /// trailing window of this many seconds
        #[arg(long)]
        window: Option<f64>,
    },

    /// Show the active configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            input,
            header,
            window,
        } => cmd_decode(input, header, window).await,
        Commands::Config => cmd_config(),
    }
}

async fn cmd_decode(
    input: Option<PathBuf>,
    show_header: bool,
    window: Option<f64>,
) -> anyhow::Result<()> {
    let hex_data = read_input(input)?;

    let config = CoreConfig::load().unwrap_or_else(|e| {
        tracing::warn!("failed to load config, using defaults: {e}");
        CoreConfig::default()
    });

    if show_header {
        print_header_summary(&hex_data);
    }

    let (samples, events) = parse_frame(&hex_data);
    let samples = preprocess_with_limit(samples, config.saturation_limit);
    let assembler = ViewAssembler::from_config(&config);

    let view = match window {
        Some(duration) => {
            let buffer = StreamBuffer::new(config.max_samples);
            buffer.add(&samples, &events).await;
            let (window_samples, window_events) = buffer.window(duration).await;
            assembler.assemble(&window_samples, &window_events)
        }
        None => assembler.assemble(&samples, &events),
    };

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn print_header_summary(hex_data: &str) {
    match frame_header(hex_data) {
        Some(header) => {
            let start = header
                .start_datetime()
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| format!("{}", header.start_timestamp));
            eprintln!(
                "session {} v{}: {} channel(s), {} sample(s) at {} Hz, start {}",
                header.session_id,
                header.version,
                header.channel_count,
                header.total_samples,
                header.sampling_rate,
                start,
            );
        }
        None => eprintln!("input carries no decodable frame header"),
    }
}

fn read_input(input: Option<PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn cmd_config() -> anyhow::Result<()> {
    let config = CoreConfig::load()?;
    println!("Config file: {}", CoreConfig::config_path().display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
