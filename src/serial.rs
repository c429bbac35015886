//! Serial transport for live instruments.
//!
//! Binds the [`ByteTransport`](crate::transport::ByteTransport) capability
//! to a real RS-232 link via `tokio-serial`. The Vector speaks 9600 8N1
//! with no flow control out of the box.
//!
//! Compiled behind the `instrument_serial` feature (on by default) so the
//! protocol core builds on hosts without serial support.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};

use crate::config::AdvConfig;
use crate::transport::ByteTransport;

/// RS-232 byte link to a Vector instrument.
pub struct SerialTransport {
    port: SerialStream,
}

impl SerialTransport {
    /// Open a serial port with the Vector's line settings.
    ///
    /// # Arguments
    /// * `port_path` - Serial port path (e.g., "/dev/ttyUSB0", "COM3")
    /// * `baud_rate` - Communication speed (factory default 9600)
    ///
    /// # Errors
    /// Returns error if the serial port cannot be opened.
    pub fn open(port_path: &str, baud_rate: u32) -> Result<Self> {
        let port = tokio_serial::new(port_path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .context("Failed to open ADV serial port")?;

        Ok(Self { port })
    }

    /// Open the port described by a validated configuration.
    pub fn from_config(config: &AdvConfig) -> Result<Self> {
        Self::open(&config.port, config.baud_rate)
    }
}

#[async_trait]
impl ByteTransport for SerialTransport {
    async fn bytes_available(&mut self) -> Result<usize> {
        let queued = self
            .port
            .bytes_to_read()
            .context("Failed to query serial receive queue")?;
        Ok(queued as usize)
    }

    async fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.port
            .read_exact(&mut byte)
            .await
            .context("Serial read failed")?;
        Ok(byte[0])
    }

    async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        AsyncWriteExt::write_all(&mut self.port, bytes)
            .await
            .context("Serial write failed")?;
        Ok(())
    }
}
