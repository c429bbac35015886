//! CLI entry point for adv-daq.
//!
//! Provides command-line interface for:
//! - Acquiring live telemetry from a Vector over a serial port (`run`)
//! - Replaying a built-in synthetic byte stream with no hardware (`demo`)
//!
//! Decoded records go to stdout, one per line, either in the compact
//! `D:`/`S:` comma-separated form the original firmware emitted on its host
//! link or as JSON stamped with a UTC receive time. Logs go to stderr via
//! `tracing`.
//!
//! # Usage
//!
//! ```bash
//! adv-daq run --port /dev/ttyUSB0
//! adv-daq run --config vector.toml --format json
//! adv-daq demo
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use adv_daq::mock::MockTransport;
use adv_daq::transport::ByteTransport;
use adv_daq::vector::VectorDriver;
use adv_daq::{AdvConfig, SystemRecord, VelocityRecord};

#[derive(Parser)]
#[command(name = "adv-daq")]
#[command(about = "Nortek Vector ADV telemetry decoder", long_about = None)]
struct Cli {
    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire from a live instrument over a serial port
    Run {
        /// Serial port path (overrides the config file)
        #[arg(long)]
        port: Option<String>,

        /// Baud rate (overrides the config file)
        #[arg(long)]
        baud: Option<u32>,

        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format for decoded records
        #[arg(long, value_enum, default_value_t = Format::Line)]
        format: Format,
    },

    /// Decode a built-in synthetic byte stream (no hardware required)
    Demo {
        /// Output format for decoded records
        #[arg(long, value_enum, default_value_t = Format::Line)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Compact firmware-style lines: D:... / S:...
    Line,
    /// One JSON object per record
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    adv_daq::logging::init(&cli.log_level)?;

    match cli.command {
        Commands::Run {
            port,
            baud,
            config,
            format,
        } => {
            let mut settings = match config {
                Some(path) => AdvConfig::from_file(&path)?,
                None => AdvConfig::default(),
            };
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(baud) = baud {
                settings.baud_rate = baud;
            }
            settings.validate()?;
            run_acquisition(settings, format).await
        }
        Commands::Demo { format } => run_demo(format).await,
    }
}

#[cfg(feature = "instrument_serial")]
async fn run_acquisition(config: AdvConfig, format: Format) -> Result<()> {
    use adv_daq::serial::SerialTransport;

    info!(port = %config.port, baud = config.baud_rate, "opening instrument link");
    let transport = SerialTransport::from_config(&config)?;
    let mut adv = VectorDriver::new(transport);
    adv.begin().await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                let stats = adv.stats();
                info!(
                    frames = stats.frames_completed,
                    checksum_failures = stats.checksum_failures,
                    "shutting down"
                );
                return Ok(());
            }
            _ = tokio::time::sleep(config.poll_interval) => {
                adv.poll().await?;
                print_drained(&mut adv, format);
            }
        }
    }
}

#[cfg(not(feature = "instrument_serial"))]
async fn run_acquisition(_config: AdvConfig, _format: Format) -> Result<()> {
    Err(adv_daq::AdvError::SerialFeatureDisabled.into())
}

/// Replay a synthetic stream through the mock transport: line noise, a
/// velocity packet, more noise, a system packet.
async fn run_demo(format: Format) -> Result<()> {
    let mut stream = vec![0x00, 0x7F, 0xA5, 0x42, 0xFF]; // noise, incl. a false start
    stream.extend(demo_velocity_packet());
    stream.extend([0x01, 0x02]);

    let mut adv = VectorDriver::new(MockTransport::with_bytes(&stream));
    adv.poll().await?;
    print_drained(&mut adv, format);

    // The system packet only assembles once the velocity packet is drained.
    adv.transport_mut().feed(&demo_system_packet());
    adv.poll().await?;
    print_drained(&mut adv, format);

    let stats = adv.stats();
    info!(
        frames = stats.frames_completed,
        skipped = stats.bytes_skipped,
        aborted = stats.frames_aborted,
        "demo stream decoded"
    );
    Ok(())
}

fn print_drained<T: ByteTransport>(adv: &mut VectorDriver<T>, format: Format) {
    if let Some(record) = adv.take_velocity() {
        println!("{}", velocity_output(&record, format));
    }
    if let Some(record) = adv.take_system() {
        println!("{}", system_output(&record, format));
    }
}

fn velocity_output(record: &VelocityRecord, format: Format) -> String {
    match format {
        Format::Line => format!(
            "D:{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            record.count,
            record.pressure,
            record.velocity_x,
            record.velocity_y,
            record.velocity_z,
            record.amplitude[0],
            record.amplitude[1],
            record.amplitude[2],
            record.correlation[0],
            record.correlation[1],
            record.correlation[2],
            record.analog_in1,
            record.analog_in2,
            record.checksum,
        ),
        Format::Json => serde_json::json!({
            "kind": "velocity",
            "received_at": chrono::Utc::now(),
            "record": record,
        })
        .to_string(),
    }
}

fn system_output(record: &SystemRecord, format: Format) -> String {
    match format {
        Format::Line => format!(
            "S:{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            record.minute,
            record.second,
            record.day,
            record.hour,
            record.year,
            record.month,
            record.battery,
            record.sound_speed,
            record.heading,
            record.pitch,
            record.roll,
            record.temperature,
            record.error,
            record.status,
            record.analog_in,
            record.checksum,
        ),
        Format::Json => serde_json::json!({
            "kind": "system",
            "received_at": chrono::Utc::now(),
            "record": record,
        })
        .to_string(),
    }
}

fn demo_velocity_packet() -> Vec<u8> {
    use adv_daq::frame::{seal, START_MARKER, VVD_MARKER};
    let body = vec![
        START_MARKER,
        VVD_MARKER,
        0,
        5, // count
        1, // pressure MSB
        0,
        100, // pressure LSW -> 65636 total
        0,
        0,
        0,
        50, // velocity x = 50 mm/s
        0,
        0,
        0,
        0,
        0,
        10,
        20,
        30, // amplitude
        90,
        91,
        92, // correlation
    ];
    seal(body)
}

fn demo_system_packet() -> Vec<u8> {
    use adv_daq::frame::{seal, START_MARKER, VSD_MARKER};
    let mut body = vec![0u8; SystemRecord::WIRE_LEN - 2];
    body[0] = START_MARKER;
    body[1] = VSD_MARKER;
    body[4] = 0x34; // minute
    body[5] = 0x56; // second
    body[6] = 0x17; // day
    body[7] = 0x09; // hour
    body[8] = 0x25; // year
    body[9] = 0x08; // month
    body[10] = 0x7B; // battery = 12.3 V raw
    body[12] = 0x42; // sound speed
    body[13] = 0x3A;
    body[20] = 0xB2; // temperature = 19.70 C raw
    body[21] = 0x07;
    seal(body)
}
