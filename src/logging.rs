//! Tracing infrastructure for the acquisition binary.
//!
//! Structured logging via `tracing` and `tracing-subscriber`: a fmt layer
//! with an `EnvFilter`, so `RUST_LOG` overrides the level the CLI asks for.
//! The library itself only emits events; initialization belongs to the
//! binary.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber.
///
/// `default_directive` applies when `RUST_LOG` is unset (e.g. "info" or
/// "adv_daq=debug"). Fails if a subscriber is already installed.
pub fn init(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|err| anyhow!("invalid log filter directive: {err}"))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))?;

    Ok(())
}
