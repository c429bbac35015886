//! Custom error types for the driver.
//!
//! This module defines the primary error type, `AdvError`, for the crate.
//! Using the `thiserror` crate, it provides a centralized and consistent way
//! to handle the few conditions the protocol can surface:
//!
//! - **`Io`**: Wraps standard `std::io::Error` from the serial transport.
//! - **`Checksum`**: A completed frame whose running 16-bit sum does not
//!   match the trailing checksum word. Never fatal; the frame is discarded
//!   and reception continues.
//! - **`Config`**: Semantic errors in the driver configuration, caught by
//!   the validation step rather than by TOML parsing.
//! - **`SerialFeatureDisabled`**: Raised when live acquisition is requested
//!   from a build without the `instrument_serial` feature.
//!
//! Note that "no record ready yet" is not represented here: the drain
//! operations return `Option` because an empty poll is a defined no-op, not
//! a failure.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type AdvResult<T> = std::result::Result<T, AdvError>;

/// Errors surfaced by the ADV driver.
#[derive(Error, Debug)]
pub enum AdvError {
    /// Transport-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completed frame failed checksum validation.
    #[error("checksum mismatch: computed {computed:#06x}, packet carries {embedded:#06x}")]
    Checksum {
        /// Running sum over the frame payload.
        computed: u16,
        /// Big-endian value of the frame's trailing two bytes.
        embedded: u16,
    },

    /// Configuration validation error.
    #[error("configuration validation error: {0}")]
    Config(String),

    /// Serial support not compiled in.
    #[error("serial support not enabled. Rebuild with --features instrument_serial")]
    SerialFeatureDisabled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_error_formats_both_values() {
        let err = AdvError::Checksum {
            computed: 0xB58C,
            embedded: 0x0010,
        };
        let message = err.to_string();
        assert!(message.contains("0xb58c"));
        assert!(message.contains("0x0010"));
    }
}
