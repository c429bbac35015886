//! Mock transport implementation.
//!
//! Provides a scripted byte source for exercising the framing and decoding
//! logic without physical hardware. Bytes pushed with [`MockTransport::feed`]
//! become available to the driver on its next poll; anything the driver
//! writes (the bring-up command strings) is recorded for inspection.
//!
//! Used by the unit and integration tests and by the CLI's `demo`
//! subcommand.

use std::collections::VecDeque;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::transport::ByteTransport;

/// Scripted in-memory byte link.
#[derive(Debug, Default)]
pub struct MockTransport {
    rx: VecDeque<u8>,
    written: Vec<u8>,
}

impl MockTransport {
    /// Create an empty mock link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock link preloaded with a byte stream.
    pub fn with_bytes(bytes: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.feed(bytes);
        transport
    }

    /// Queue bytes for the driver to read on subsequent polls.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Everything the driver has written so far, in order.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Bytes still queued and unread.
    pub fn unread(&self) -> usize {
        self.rx.len()
    }
}

#[async_trait]
impl ByteTransport for MockTransport {
    async fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.rx.len())
    }

    async fn read_byte(&mut self) -> Result<u8> {
        match self.rx.pop_front() {
            Some(byte) => Ok(byte),
            // The driver only reads after checking availability, so an
            // empty read indicates a broken test script.
            None => bail!("read from empty mock transport"),
        }
    }

    async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }
}
