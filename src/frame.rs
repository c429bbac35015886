//! Packet framing for the Nortek Vector wire protocol.
//!
//! Every packet starts with the marker byte `0xA5`, followed by a kind
//! marker (`0x10` for velocity data, `0x11` for system/diagnostic data), a
//! fixed-length body, and a trailing big-endian 16-bit checksum. Velocity
//! packets are 24 bytes total, system packets 28.
//!
//! [`FrameReceiver`] is the byte-at-a-time state machine that reassembles
//! packets across repeated non-blocking polls. It owns a fixed buffer and an
//! explicit cursor; there is no hidden static state. A completed frame stays
//! parked in the receiver until the consumer drains it — new capture does
//! not begin while a frame is pending, so a slow consumer loses frames
//! rather than building backlog.
//!
//! Checksum validation and packet classification live here too, next to the
//! byte layout they depend on.

use crate::error::AdvError;

/// First byte of every packet.
pub const START_MARKER: u8 = 0xA5;
/// Kind marker for velocity data (VVD) packets.
pub const VVD_MARKER: u8 = 0x10;
/// Kind marker for system data (VSD) packets.
pub const VSD_MARKER: u8 = 0x11;
/// Total length of a velocity packet, checksum included.
pub const VVD_LEN: usize = 24;
/// Total length of a system packet, checksum included.
pub const VSD_LEN: usize = 28;
/// Seed for the running 16-bit checksum.
pub const CHECKSUM_SEED: u16 = 0xB58C;

/// Largest packet the receiver must hold.
const MAX_FRAME_LEN: usize = VSD_LEN;

/// Packet kind, from the marker byte at offset 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    /// Velocity data (VVD, 24 bytes).
    Velocity,
    /// System/diagnostic data (VSD, 28 bytes).
    System,
}

impl PacketKind {
    /// Classify a framed packet by its kind marker.
    ///
    /// Offset 1 equal to [`VVD_MARKER`] means velocity; any other value is
    /// treated as system data. No further marker values are distinguished.
    pub fn classify(packet: &[u8]) -> PacketKind {
        match packet.get(1) {
            Some(&VVD_MARKER) => PacketKind::Velocity,
            _ => PacketKind::System,
        }
    }

    /// Total wire length of packets of this kind.
    pub fn wire_len(self) -> usize {
        match self {
            PacketKind::Velocity => VVD_LEN,
            PacketKind::System => VSD_LEN,
        }
    }
}

/// Receiver state between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// Scanning for a start marker.
    Idle,
    /// Start marker seen; next byte selects the packet kind.
    AwaitingKind,
    /// Assembling the body up to the kind-specific length.
    Filling,
    /// A full frame is parked, waiting for the consumer to drain it.
    Complete,
}

/// Result of offering one byte to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Byte ignored while scanning for a start marker.
    Skipped,
    /// Byte stored into the frame in progress.
    Stored,
    /// Capture aborted: the kind marker was not a recognized packet kind.
    Aborted,
    /// Byte completed the frame; it is now parked until drained.
    Completed,
    /// A completed frame is pending; byte read but dropped from framing.
    Dropped,
}

/// Byte-stream framing state machine.
///
/// Holds `{state, buffer, cursor, expected_len}` explicitly. The buffer is
/// mutated only while a capture is in progress, and bounds are checked
/// against the kind-specific expected length rather than any terminator.
#[derive(Debug)]
pub struct FrameReceiver {
    state: ReceiverState,
    buffer: [u8; MAX_FRAME_LEN],
    cursor: usize,
    expected_len: usize,
}

impl FrameReceiver {
    /// Create a receiver in the idle (scanning) state.
    pub fn new() -> Self {
        Self {
            state: ReceiverState::Idle,
            buffer: [0; MAX_FRAME_LEN],
            cursor: 0,
            expected_len: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Offer one received byte to the state machine.
    ///
    /// Never blocks and never fails; corrupted input only ever resets the
    /// capture back to scanning.
    pub fn push(&mut self, byte: u8) -> PushOutcome {
        match self.state {
            ReceiverState::Idle => {
                if byte == START_MARKER {
                    self.buffer[0] = byte;
                    self.cursor = 1;
                    self.state = ReceiverState::AwaitingKind;
                    PushOutcome::Stored
                } else {
                    PushOutcome::Skipped
                }
            }
            ReceiverState::AwaitingKind => {
                // Only VVD and VSD frames exist on this link; any other
                // kind marker means the start marker was line noise.
                self.expected_len = match byte {
                    VVD_MARKER => VVD_LEN,
                    VSD_MARKER => VSD_LEN,
                    _ => {
                        self.reset();
                        return PushOutcome::Aborted;
                    }
                };
                self.buffer[1] = byte;
                self.cursor = 2;
                self.state = ReceiverState::Filling;
                PushOutcome::Stored
            }
            ReceiverState::Filling => {
                // A 0xA5 mid-frame is ordinary payload, not a resync signal;
                // a desynchronized frame is caught by its checksum.
                self.buffer[self.cursor] = byte;
                self.cursor += 1;
                if self.cursor == self.expected_len {
                    self.state = ReceiverState::Complete;
                    PushOutcome::Completed
                } else {
                    PushOutcome::Stored
                }
            }
            ReceiverState::Complete => PushOutcome::Dropped,
        }
    }

    /// The parked frame, if one is complete.
    pub fn frame(&self) -> Option<&[u8]> {
        match self.state {
            ReceiverState::Complete => Some(&self.buffer[..self.expected_len]),
            _ => None,
        }
    }

    /// Discard any capture in progress or parked frame and resume scanning.
    pub fn reset(&mut self) {
        self.state = ReceiverState::Idle;
        self.cursor = 0;
        self.expected_len = 0;
    }
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

/// Running 16-bit sum over a frame payload.
///
/// Seeded with [`CHECKSUM_SEED`], adding big-endian 16-bit words formed
/// from consecutive byte pairs, wrapping modulo 2^16.
pub fn checksum(payload: &[u8]) -> u16 {
    let mut sum = CHECKSUM_SEED;
    for pair in payload.chunks_exact(2) {
        sum = sum.wrapping_add(u16::from_be_bytes([pair[0], pair[1]]));
    }
    sum
}

/// Validate a complete frame against its trailing checksum word.
///
/// The running sum covers every byte before the final two; the final two
/// are the expected value, big-endian. Returns the mismatch details on
/// failure so the caller can log them.
pub fn validate(frame: &[u8]) -> Result<(), AdvError> {
    debug_assert!(frame.len() >= 4 && frame.len() % 2 == 0);
    let (payload, trailer) = frame.split_at(frame.len() - 2);
    let computed = checksum(payload);
    let embedded = u16::from_be_bytes([trailer[0], trailer[1]]);
    if computed == embedded {
        Ok(())
    } else {
        Err(AdvError::Checksum { computed, embedded })
    }
}

/// Append the checksum trailer to a frame body.
///
/// Test and demo helper for composing well-formed packets.
pub fn seal(mut body: Vec<u8>) -> Vec<u8> {
    let sum = checksum(&body);
    body.extend_from_slice(&sum.to_be_bytes());
    body
}
