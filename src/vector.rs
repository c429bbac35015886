//! Nortek Vector ADV Driver
//!
//! Reference: Nortek Vector Integration Manual (velocity data structure).
//!
//! Protocol Overview:
//! - Format: binary packets over RS-232, receive-only once sampling starts
//! - Framing: start byte 0xA5, kind marker, fixed length, 16-bit checksum
//! - Packet kinds: velocity data (24 bytes) and system data (28 bytes)
//! - Bring-up: `@@@@@@` (wake), `K1W%!Q` (confirm), `SR` (start sampling)
//!
//! The driver is poll-driven and never blocks: each [`VectorDriver::poll`]
//! drains only the bytes the transport currently holds and returns. At most
//! one validated packet is parked at a time; while it awaits draining,
//! arriving bytes are still read off the transport (so the hardware FIFO
//! cannot overflow) but are dropped from framing. A slow consumer loses
//! frames rather than building backlog — recency over completeness.
//!
//! # Example Usage
//!
//! ```no_run
//! use adv_daq::serial::SerialTransport;
//! use adv_daq::vector::VectorDriver;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let port = SerialTransport::open("/dev/ttyUSB0", 9600)?;
//!     let mut adv = VectorDriver::new(port);
//!     adv.begin().await?;
//!
//!     loop {
//!         adv.poll().await?;
//!         if let Some(record) = adv.take_velocity() {
//!             println!("vx = {} mm/s", record.velocity_x);
//!         }
//!     }
//! }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::frame::{validate, FrameReceiver, PacketKind, PushOutcome};
use crate::record::{SystemRecord, VelocityRecord};
use crate::transport::ByteTransport;

/// Wake-up sequence, sent before configuration commands.
const CMD_WAKE: &[u8] = b"@@@@@@";
/// Confirmation string acknowledging the wake-up.
const CMD_CONFIRM: &[u8] = b"K1W%!Q";
/// Start continuous sampling.
const CMD_START: &[u8] = b"SR";
/// Settling delay between bring-up commands.
const BRING_UP_DELAY: Duration = Duration::from_millis(200);

/// Running counters for the receive path.
///
/// Every byte the transport delivers lands in exactly one of the byte
/// counters; frames land in `frames_completed` and then either a ready
/// counter or `checksum_failures`.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct DriverStats {
    /// Bytes discarded while scanning for a start marker.
    pub bytes_skipped: u64,
    /// Bytes read but dropped because a packet was pending.
    pub bytes_dropped: u64,
    /// Captures aborted on an unrecognized kind marker.
    pub frames_aborted: u64,
    /// Frames assembled to their full wire length.
    pub frames_completed: u64,
    /// Completed frames rejected by checksum.
    pub checksum_failures: u64,
    /// Velocity frames validated and made ready.
    pub velocity_frames: u64,
    /// System frames validated and made ready.
    pub system_frames: u64,
}

/// Driver for the Nortek Vector acoustic doppler velocimeter.
///
/// Owns the transport and the framing state machine; single execution
/// context, so no interior locking. Construct once, call [`begin`] to start
/// the instrument sampling, then [`poll`] from the acquisition loop and
/// drain with [`take_velocity`] / [`take_system`].
///
/// [`begin`]: VectorDriver::begin
/// [`poll`]: VectorDriver::poll
/// [`take_velocity`]: VectorDriver::take_velocity
/// [`take_system`]: VectorDriver::take_system
pub struct VectorDriver<T: ByteTransport> {
    transport: T,
    receiver: FrameReceiver,
    velocity_ready: bool,
    system_ready: bool,
    stats: DriverStats,
}

impl<T: ByteTransport> VectorDriver<T> {
    /// Create a driver over an opened transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            receiver: FrameReceiver::new(),
            velocity_ready: false,
            system_ready: false,
            stats: DriverStats::default(),
        }
    }

    /// Place the instrument into continuous-sampling mode.
    ///
    /// Writes the fixed command sequence with the settling delays the
    /// instrument requires. Everything received afterwards is binary
    /// telemetry.
    pub async fn begin(&mut self) -> Result<()> {
        info!("starting ADV bring-up sequence");
        self.transport
            .write_all(CMD_WAKE)
            .await
            .context("ADV wake-up write failed")?;
        tokio::time::sleep(BRING_UP_DELAY).await;
        self.transport
            .write_all(CMD_CONFIRM)
            .await
            .context("ADV confirmation write failed")?;
        tokio::time::sleep(BRING_UP_DELAY).await;
        self.transport
            .write_all(CMD_START)
            .await
            .context("ADV start-sampling write failed")?;
        info!("ADV in continuous-sampling mode");
        Ok(())
    }

    /// Service the receive path once, without blocking.
    ///
    /// Consumes every byte the transport currently holds — possibly none —
    /// and returns. Corrupted input is counted and logged, never an error;
    /// only transport I/O failures propagate.
    pub async fn poll(&mut self) -> Result<()> {
        while self.transport.bytes_available().await? > 0 {
            let byte = self
                .transport
                .read_byte()
                .await
                .context("ADV serial read failed")?;
            match self.receiver.push(byte) {
                PushOutcome::Stored => {}
                PushOutcome::Skipped => self.stats.bytes_skipped += 1,
                PushOutcome::Dropped => self.stats.bytes_dropped += 1,
                PushOutcome::Aborted => {
                    self.stats.frames_aborted += 1;
                    trace!(byte, "capture aborted on unrecognized kind marker");
                }
                PushOutcome::Completed => {
                    self.stats.frames_completed += 1;
                    self.promote();
                }
            }
        }
        Ok(())
    }

    /// Validate the completed frame and raise the matching ready flag.
    fn promote(&mut self) {
        let Some(frame) = self.receiver.frame() else {
            return;
        };
        match validate(frame) {
            Ok(()) => match PacketKind::classify(frame) {
                PacketKind::Velocity => {
                    self.stats.velocity_frames += 1;
                    self.velocity_ready = true;
                    debug!("velocity packet ready");
                }
                PacketKind::System => {
                    self.stats.system_frames += 1;
                    self.system_ready = true;
                    debug!("system packet ready");
                }
            },
            Err(err) => {
                self.stats.checksum_failures += 1;
                warn!(%err, "packet discarded");
                self.receiver.reset();
            }
        }
    }

    /// Whether a validated velocity packet is waiting to be drained.
    pub fn velocity_ready(&self) -> bool {
        self.velocity_ready
    }

    /// Whether a validated system packet is waiting to be drained.
    pub fn system_ready(&self) -> bool {
        self.system_ready
    }

    /// Drain the pending velocity packet, if any.
    ///
    /// Returns `None` with no side effects when nothing is ready. Otherwise
    /// decodes the parked frame, clears the pending state so capture
    /// resumes on the next poll, and returns the record.
    pub fn take_velocity(&mut self) -> Option<VelocityRecord> {
        if !self.velocity_ready {
            return None;
        }
        let record = self.receiver.frame().map(VelocityRecord::decode)?;
        self.clear_pending();
        Some(record)
    }

    /// Drain the pending system packet, if any.
    pub fn take_system(&mut self) -> Option<SystemRecord> {
        if !self.system_ready {
            return None;
        }
        let record = self.receiver.frame().map(SystemRecord::decode)?;
        self.clear_pending();
        Some(record)
    }

    /// Drain the pending velocity packet as raw wire bytes.
    ///
    /// For host links that forward the packet unmodified.
    pub fn take_velocity_raw(&mut self) -> Option<Vec<u8>> {
        if !self.velocity_ready {
            return None;
        }
        let bytes = self.receiver.frame().map(<[u8]>::to_vec)?;
        self.clear_pending();
        Some(bytes)
    }

    /// Drain the pending system packet as raw wire bytes.
    pub fn take_system_raw(&mut self) -> Option<Vec<u8>> {
        if !self.system_ready {
            return None;
        }
        let bytes = self.receiver.frame().map(<[u8]>::to_vec)?;
        self.clear_pending();
        Some(bytes)
    }

    fn clear_pending(&mut self) {
        self.velocity_ready = false;
        self.system_ready = false;
        self.receiver.reset();
    }

    /// Receive-path counters.
    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    /// Access the underlying transport.
    ///
    /// Used by the demo mode and tests to script input mid-run.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{seal, START_MARKER, VVD_MARKER};
    use crate::mock::MockTransport;

    fn velocity_packet(velocity_x: i16) -> Vec<u8> {
        let mut body = vec![0u8; VelocityRecord::WIRE_LEN - 2];
        body[0] = START_MARKER;
        body[1] = VVD_MARKER;
        let [lo, hi] = velocity_x.to_le_bytes();
        body[10] = lo;
        body[11] = hi;
        seal(body)
    }

    #[tokio::test]
    async fn bring_up_writes_command_sequence_in_order() {
        let mut adv = VectorDriver::new(MockTransport::new());
        adv.begin().await.unwrap();
        assert_eq!(adv.transport_mut().written(), b"@@@@@@K1W%!QSR");
    }

    #[tokio::test]
    async fn poll_assembles_and_drains_a_velocity_packet() {
        let transport = MockTransport::with_bytes(&velocity_packet(50));
        let mut adv = VectorDriver::new(transport);
        adv.poll().await.unwrap();
        assert!(adv.velocity_ready());
        assert!(!adv.system_ready());

        let record = adv.take_velocity().unwrap();
        assert_eq!(record.velocity_x, 50);

        // Second drain with no new bytes is a defined no-op.
        assert!(adv.take_velocity().is_none());
        assert!(!adv.velocity_ready());
    }

    #[tokio::test]
    async fn drain_of_wrong_kind_has_no_side_effects() {
        let transport = MockTransport::with_bytes(&velocity_packet(7));
        let mut adv = VectorDriver::new(transport);
        adv.poll().await.unwrap();

        assert!(adv.take_system().is_none());
        assert!(adv.velocity_ready());
        assert_eq!(adv.take_velocity().unwrap().velocity_x, 7);
    }

    #[tokio::test]
    async fn raw_drain_returns_wire_bytes() {
        let packet = velocity_packet(-3);
        let transport = MockTransport::with_bytes(&packet);
        let mut adv = VectorDriver::new(transport);
        adv.poll().await.unwrap();

        assert_eq!(adv.take_velocity_raw().unwrap(), packet);
        assert!(adv.take_velocity_raw().is_none());
    }

    #[tokio::test]
    async fn checksum_failure_is_counted_and_never_promoted() {
        let mut packet = velocity_packet(50);
        packet[10] ^= 0x01; // corrupt the payload, keep the trailer
        let transport = MockTransport::with_bytes(&packet);
        let mut adv = VectorDriver::new(transport);
        adv.poll().await.unwrap();

        assert!(!adv.velocity_ready());
        assert!(!adv.system_ready());
        assert_eq!(adv.stats().checksum_failures, 1);

        // Reception continues: a good packet afterwards decodes normally.
        adv.transport_mut().feed(&velocity_packet(9));
        adv.poll().await.unwrap();
        assert_eq!(adv.take_velocity().unwrap().velocity_x, 9);
    }
}
