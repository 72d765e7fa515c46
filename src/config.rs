//! System configuration parameters
//!
//! All tunable parameters for the LeakSense board, fixed at boot.  Runtime
//! reconfiguration is deliberately unsupported — a variant board ships a
//! different `SystemConfig`, not a different codebase.

use serde::{Deserialize, Serialize};

/// Number of analog set-point channels (and threshold filters).
pub const NUM_SETPOINTS: usize = 4;
/// Number of external RTD temperature probes.
pub const NUM_PROBES: usize = 2;

/// One analog set-point channel: physical-unit range and comparator
/// hysteresis for the threshold filter that samples it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Logical name, used only for debug output.
    pub label: heapless::String<16>,
    /// Physical value at the bottom of the pot travel.
    pub min: f32,
    /// Physical value at the top of the pot travel.
    pub max: f32,
    /// Offset subtracted from the threshold while the channel is alarmed.
    pub hysteresis: f32,
}

impl ChannelConfig {
    pub fn new(label: &str, min: f32, max: f32, hysteresis: f32) -> Self {
        let mut l = heapless::String::new();
        let _ = l.push_str(&label[..label.len().min(16)]);
        Self {
            label: l,
            min,
            max,
            hysteresis,
        }
    }
}

/// Named positions within the transmitted status byte.
///
/// Board variants assign the probe-fault bits differently, so the mapping is
/// configuration data rather than a hardcoded constant — two variants differ
/// in this table, not in the cycle logic.  The default matches the reference
/// board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBitAssignment {
    pub board_sensor_init_error: u8,
    pub probe_sensor_init_error: u8,
    pub board_sensor_read_error: u8,
    pub probe_sensor_read_error: u8,
    pub board_temperature_warning: u8,
    pub board_humidity_warning: u8,
    /// One fault bit per RTD probe.
    pub probe_fault: [u8; NUM_PROBES],
}

impl Default for StatusBitAssignment {
    fn default() -> Self {
        Self {
            board_sensor_init_error: 0,
            probe_sensor_init_error: 1,
            board_sensor_read_error: 2,
            probe_sensor_read_error: 3,
            board_temperature_warning: 4,
            board_humidity_warning: 5,
            probe_fault: [6, 7],
        }
    }
}

impl StatusBitAssignment {
    /// Every assigned position, in declaration order.
    fn positions(&self) -> [u8; 8] {
        [
            self.board_sensor_init_error,
            self.probe_sensor_init_error,
            self.board_sensor_read_error,
            self.probe_sensor_read_error,
            self.board_temperature_warning,
            self.board_humidity_warning,
            self.probe_fault[0],
            self.probe_fault[1],
        ]
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Update cycle period (milliseconds).
    pub update_period_ms: u32,

    // --- Telemetry link ---
    /// RS-485 telemetry baud rate.
    pub telemetry_baud: u32,

    // --- Thresholds ---
    /// Per-channel set-point ranges, indexed by `SetpointChannel`.
    pub channels: [ChannelConfig; NUM_SETPOINTS],

    // --- Status byte ---
    /// Bit assignment for the transmitted status byte.
    pub status_bits: StatusBitAssignment,

    // --- Diagnostics ---
    /// Emit a human-readable dump of all derived values every cycle.
    pub debug_dump: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            update_period_ms: 500,
            telemetry_baud: 57_600,
            channels: [
                ChannelConfig::new("board_temp", 0.0, 100.0, 1.0),
                ChannelConfig::new("board_humidity", 0.0, 100.0, 1.0),
                ChannelConfig::new("probe_temp_1", 0.0, 100.0, 1.0),
                ChannelConfig::new("probe_temp_2", 0.0, 100.0, 1.0),
            ],
            status_bits: StatusBitAssignment::default(),
            debug_dump: false,
        }
    }
}

impl SystemConfig {
    /// Sanity-check the configuration.  Called once at boot; a bad config is
    /// a build/provisioning mistake, not a runtime condition.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        if self.update_period_ms == 0 {
            return Err(Error::Config("update period must be non-zero"));
        }
        if self.telemetry_baud == 0 {
            return Err(Error::Config("telemetry baud must be non-zero"));
        }
        for ch in &self.channels {
            if ch.max <= ch.min {
                return Err(Error::Config("channel range max must exceed min"));
            }
            if ch.hysteresis < 0.0 {
                return Err(Error::Config("hysteresis must be non-negative"));
            }
        }

        // The eight status bits must each fit in the byte and not collide.
        let mut seen: u8 = 0;
        for pos in self.status_bits.positions() {
            if pos > 7 {
                return Err(Error::Config("status bit position out of range"));
            }
            seen |= 1 << pos;
        }
        if seen.count_ones() != 8 {
            return Err(Error::Config("status bit positions must be distinct"));
        }

        Ok(())
    }
}
