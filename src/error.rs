//! Typed adapter errors for the fridgemon firmware.
//!
//! One enum per adapter family.  All variants are `Copy` so they can be
//! logged and counted without allocation, and each implements
//! `std::error::Error` so startup code can `?` them into `anyhow`.  The
//! tick loop itself never fails; at runtime these only surface from
//! adapters and are logged.

use core::fmt;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Advertisement payload shorter than the expected frame.
    PayloadTooShort,
    /// Decoded value is outside the sensor's rated range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooShort => write!(f, "advertisement payload too short"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Outlet errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutletError {
    /// URL, API key or device name missing.
    NotConfigured,
    /// Connection, TLS or I/O failure before a status line was read.
    Transport,
    /// The outlet answered with a non-2xx status.
    HttpStatus(u16),
    /// The request body could not be encoded.
    Encode,
}

impl fmt::Display for OutletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "outlet endpoint not configured"),
            Self::Transport => write!(f, "transport failure"),
            Self::HttpStatus(code) => write!(f, "HTTP status {code}"),
            Self::Encode => write!(f, "request encoding failed"),
        }
    }
}

impl std::error::Error for OutletError {}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    BleInitFailed,
    BleScanFailed,
    WifiConnectFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BleInitFailed => write!(f, "BLE init failed"),
            Self::BleScanFailed => write!(f, "BLE scan failed"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
        }
    }
}

impl std::error::Error for CommsError {}
