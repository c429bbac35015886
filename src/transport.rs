//! Byte-stream transport capability.
//!
//! The framing and decoding logic never touches a serial port directly.
//! Instead it is written against a single small capability trait modeled on
//! how the instrument needs to be serviced:
//!
//! - `bytes_available` — how many bytes the link currently holds
//! - `read_byte` — take one byte that is known to be available
//! - `write_all` — push a command sequence to the instrument
//!
//! This keeps the protocol core testable with a synthetic byte source and
//! keeps the hardware binding (`crate::serial`) swappable.
//!
//! # Contract
//!
//! - All methods are async (uses `#[async_trait]`) but must not wait for
//!   *more* input: `read_byte` is only called after `bytes_available`
//!   reported a pending byte, so a conforming implementation never parks
//!   the poll loop.
//! - Implementations take `&mut self`; the driver owns its transport and
//!   runs on one task, so no interior locking is required.

use anyhow::Result;
use async_trait::async_trait;

/// Capability: raw byte-stream link to the instrument.
///
/// Implemented by [`crate::serial::SerialTransport`] for live hardware and
/// [`crate::mock::MockTransport`] for tests and the demo mode.
#[async_trait]
pub trait ByteTransport: Send {
    /// Number of bytes currently queued for reading.
    ///
    /// # Returns
    /// - Ok(0) when the link is idle (not an error)
    /// - Err on transport failure
    async fn bytes_available(&mut self) -> Result<usize>;

    /// Read one byte.
    ///
    /// Only called when `bytes_available` reported at least one byte, so
    /// this must complete promptly.
    async fn read_byte(&mut self) -> Result<u8>;

    /// Write a byte sequence to the instrument.
    ///
    /// Used by the bring-up sequence; the receive protocol itself never
    /// writes.
    async fn write_all(&mut self, bytes: &[u8]) -> Result<()>;
}
