//! Unified error types for the LeakSense firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform.  All variants are `Copy`
//! so they can be threaded through the update cycle without allocation.
//!
//! Note that cycle-time sensor failures are *not* propagated as `Err` — per
//! the failure policy they become status bits in the transmitted frame and
//! the cycle continues.  These types cover the init path and the link.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// The telemetry link rejected a frame write.
    Link(LinkError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The device did not respond on its bus at startup.
    NotResponding,
    /// An I²C transaction failed or the reply failed its CRC check.
    I2cReadFailed,
    /// An SPI transaction failed or the amplifier latched a fault.
    SpiReadFailed,
    /// ADC read returned an error.
    AdcReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotResponding => write!(f, "device not responding"),
            Self::I2cReadFailed => write!(f, "I2C read failed"),
            Self::SpiReadFailed => write!(f, "SPI read failed"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The UART driver accepted fewer bytes than the frame length.
    ShortWrite,
    /// The UART write call itself failed.
    WriteFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortWrite => write!(f, "short frame write"),
            Self::WriteFailed => write!(f, "UART write failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
