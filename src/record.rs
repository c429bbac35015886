//! Decoded measurement records and field decoding.
//!
//! Two record types mirror the two Nortek Vector packet kinds:
//!
//! - [`VelocityRecord`] — the 24-byte velocity data (VVD) packet
//! - [`SystemRecord`] — the 28-byte system/diagnostic data (VSD) packet
//!
//! Decoders take a checksum-validated frame and read fields at fixed byte
//! offsets (Vector Integration Manual, velocity data structure). All stored
//! fields are raw instrument integers; the documented scaling factors are
//! exposed as separate accessors so downstream storage keeps the exact wire
//! values.
//!
//! Two field compositions diverge across firmware revisions in the wild and
//! are fixed here canonically (covered by explicit tests):
//!
//! - pressure = `byte4 * 65536 + i16_le(bytes 6..8)` (units 0.001 dbar)
//! - analog input 2 = signed 16-bit from low byte 2 and high byte 5

use serde::{Deserialize, Serialize};

/// Signed 16-bit little-endian field.
fn i16_le(lo: u8, hi: u8) -> i16 {
    i16::from_le_bytes([lo, hi])
}

/// Unsigned 16-bit little-endian field.
fn u16_le(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}

/// Decode one BCD byte: two decimal digits packed one per nibble.
///
/// Out-of-range nibbles (>9) propagate as an out-of-range decimal value
/// rather than failing; `0x9F` decodes to 105.
pub fn bcd(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}

/// Decoded velocity data (VVD) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityRecord {
    /// Ensemble counter, wraps at 256.
    pub count: u8,
    /// Pressure in 0.001 dbar: `MSB * 65536 + signed LSW`.
    pub pressure: i32,
    /// Velocity X in mm/s.
    pub velocity_x: i16,
    /// Velocity Y in mm/s.
    pub velocity_y: i16,
    /// Velocity Z in mm/s.
    pub velocity_z: i16,
    /// Per-beam signal amplitude (counts).
    pub amplitude: [u8; 3],
    /// Per-beam correlation (0-100 %).
    pub correlation: [u8; 3],
    /// Analog input 1, unsigned.
    pub analog_in1: u16,
    /// Analog input 2, signed, from low byte 2 and high byte 5.
    pub analog_in2: i16,
    /// Wire checksum echo, raw.
    pub checksum: i16,
}

impl VelocityRecord {
    /// Total wire length of a velocity packet.
    pub const WIRE_LEN: usize = crate::frame::VVD_LEN;

    /// Decode a validated 24-byte velocity frame.
    pub fn decode(frame: &[u8]) -> Self {
        debug_assert_eq!(frame.len(), Self::WIRE_LEN);
        let pressure_msb = i32::from(frame[4]);
        let pressure_lsw = i32::from(i16_le(frame[6], frame[7]));
        Self {
            count: frame[3],
            pressure: pressure_msb * 65536 + pressure_lsw,
            velocity_x: i16_le(frame[10], frame[11]),
            velocity_y: i16_le(frame[12], frame[13]),
            velocity_z: i16_le(frame[14], frame[15]),
            amplitude: [frame[16], frame[17], frame[18]],
            correlation: [frame[19], frame[20], frame[21]],
            analog_in1: u16_le(frame[8], frame[9]),
            analog_in2: i16_le(frame[2], frame[5]),
            checksum: i16_le(frame[22], frame[23]),
        }
    }

    /// Pressure in dbar.
    pub fn pressure_dbar(&self) -> f64 {
        f64::from(self.pressure) * 0.001
    }

    /// Velocity vector in m/s.
    pub fn velocity_ms(&self) -> [f64; 3] {
        [
            f64::from(self.velocity_x) * 0.001,
            f64::from(self.velocity_y) * 0.001,
            f64::from(self.velocity_z) * 0.001,
        ]
    }
}

/// Decoded system/diagnostic data (VSD) packet.
///
/// Clock fields come from BCD bytes; everything else is raw instrument
/// integers with the scaling factor noted per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRecord {
    /// Clock minute (BCD).
    pub minute: u8,
    /// Clock second (BCD).
    pub second: u8,
    /// Clock day (BCD).
    pub day: u8,
    /// Clock hour (BCD).
    pub hour: u8,
    /// Clock year (BCD, two digits).
    pub year: u8,
    /// Clock month (BCD).
    pub month: u8,
    /// Battery voltage, raw x0.1 V.
    pub battery: i16,
    /// Speed of sound, raw x0.1 m/s.
    pub sound_speed: i16,
    /// Compass heading, raw x0.1 deg.
    pub heading: i16,
    /// Pitch, raw x0.1 deg.
    pub pitch: i16,
    /// Roll, raw x0.1 deg.
    pub roll: i16,
    /// Temperature, raw x0.01 degC.
    pub temperature: i16,
    /// Instrument error byte.
    pub error: u8,
    /// Instrument status byte.
    pub status: u8,
    /// Analog input, signed.
    pub analog_in: i16,
    /// Wire checksum echo, raw.
    pub checksum: i16,
}

impl SystemRecord {
    /// Total wire length of a system packet.
    pub const WIRE_LEN: usize = crate::frame::VSD_LEN;

    /// Decode a validated 28-byte system frame.
    pub fn decode(frame: &[u8]) -> Self {
        debug_assert_eq!(frame.len(), Self::WIRE_LEN);
        Self {
            minute: bcd(frame[4]),
            second: bcd(frame[5]),
            day: bcd(frame[6]),
            hour: bcd(frame[7]),
            year: bcd(frame[8]),
            month: bcd(frame[9]),
            battery: i16_le(frame[10], frame[11]),
            sound_speed: i16_le(frame[12], frame[13]),
            heading: i16_le(frame[14], frame[15]),
            pitch: i16_le(frame[16], frame[17]),
            roll: i16_le(frame[18], frame[19]),
            temperature: i16_le(frame[20], frame[21]),
            error: frame[22],
            status: frame[23],
            analog_in: i16_le(frame[24], frame[25]),
            checksum: i16_le(frame[26], frame[27]),
        }
    }

    /// Battery voltage in volts.
    pub fn battery_volts(&self) -> f64 {
        f64::from(self.battery) * 0.1
    }

    /// Speed of sound in m/s.
    pub fn sound_speed_ms(&self) -> f64 {
        f64::from(self.sound_speed) * 0.1
    }

    /// Heading in degrees.
    pub fn heading_deg(&self) -> f64 {
        f64::from(self.heading) * 0.1
    }

    /// Pitch in degrees.
    pub fn pitch_deg(&self) -> f64 {
        f64::from(self.pitch) * 0.1
    }

    /// Roll in degrees.
    pub fn roll_deg(&self) -> f64 {
        f64::from(self.roll) * 0.1
    }

    /// Temperature in degrees Celsius.
    pub fn temperature_celsius(&self) -> f64 {
        f64::from(self.temperature) * 0.01
    }
}
