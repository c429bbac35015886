//! # adv-daq
//!
//! Non-blocking decoder for Nortek Vector ADV (acoustic doppler
//! velocimeter) serial telemetry, built for poll-driven data-acquisition
//! loops. The instrument streams two fixed-length binary packet kinds —
//! velocity data (24 bytes) and system/diagnostic data (28 bytes) — each
//! framed by a start marker and protected by a 16-bit checksum.
//!
//! ## Crate Structure
//!
//! - **`transport`**: The `ByteTransport` capability trait abstracting the
//!   serial link (bytes available / read one byte / write bytes).
//! - **`serial`**: `tokio-serial` binding of the transport for live
//!   hardware (feature `instrument_serial`, on by default).
//! - **`mock`**: Scripted in-memory transport for tests and hardware-free
//!   demos.
//! - **`frame`**: The byte-at-a-time framing state machine, checksum
//!   validation, and packet classification.
//! - **`record`**: Decoded `VelocityRecord` / `SystemRecord` types and the
//!   field decoders (BCD clock, little-endian fixed-point fields).
//! - **`vector`**: The `VectorDriver` tying it together: instrument
//!   bring-up, the non-blocking `poll`, readiness flags, and the drain API.
//! - **`config`**: TOML-backed configuration value object with validation.
//! - **`error`**: The central `AdvError` enum.
//! - **`logging`**: Tracing subscriber setup for the binary.
//!
//! At most one validated packet is held at a time; while it awaits
//! draining, newly arriving bytes are read off the link but not assembled.
//! See `vector` for the rationale behind this recency-over-completeness
//! policy.

pub mod config;
pub mod error;
pub mod frame;
pub mod logging;
pub mod mock;
pub mod record;
pub mod transport;
pub mod vector;

#[cfg(feature = "instrument_serial")]
pub mod serial;

pub use config::AdvConfig;
pub use error::{AdvError, AdvResult};
pub use frame::{FrameReceiver, PacketKind, ReceiverState};
pub use record::{SystemRecord, VelocityRecord};
pub use transport::ByteTransport;
pub use vector::{DriverStats, VectorDriver};
