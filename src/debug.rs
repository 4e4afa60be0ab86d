//! Logging switches
//!
//! `QR_DEBUG` turns on verbose pipeline logging without having to spell
//! out a `RUST_LOG` filter. An explicit `RUST_LOG` always wins.

use crate::error::{QrError, Result};
use std::sync::OnceLock;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Whether `QR_DEBUG` is set in the environment
pub fn debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| std::env::var("QR_DEBUG").is_ok())
}

fn default_directive() -> &'static str {
    if debug_enabled() { "qr_master=debug,info" } else { "info" }
}

/// Install a `tracing` fmt subscriber for binaries and demos.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| QrError::Other(format!("Failed to initialize logging: {}", e)))?;

    debug!("logging initialized (QR_DEBUG={})", debug_enabled());
    Ok(())
}
