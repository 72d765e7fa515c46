//! Shared mutable context threaded through every phase handler.
//!
//! `CycleContext` is the single struct that phase handlers read from and
//! write to.  It owns the threshold filters, the status word, the staged
//! telemetry frame and its encoded bytes, the latest sensor snapshot, and
//! the output line levels.  Think of it as the "blackboard" in a blackboard
//! architecture.  Everything here is created once at boot and mutated in
//! place for the process lifetime.

use crate::config::{SystemConfig, NUM_PROBES, NUM_SETPOINTS};
use crate::filter::{ThresholdFilter, SAMPLE_WINDOW};
use crate::status::StatusWord;
use crate::telemetry::{TelemetryFrame, FRAME_LEN};

// ---------------------------------------------------------------------------
// Set-point channel identity
// ---------------------------------------------------------------------------

/// Index of each set-point channel within the filter and config arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum SetpointChannel {
    BoardTemp = 0,
    BoardHumidity = 1,
    ProbeTemp1 = 2,
    ProbeTemp2 = 3,
}

impl SetpointChannel {
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Channel carrying the set-point for RTD probe `i`.
    pub const fn probe(i: usize) -> usize {
        Self::ProbeTemp1.index() + i
    }
}

// ---------------------------------------------------------------------------
// Sensor snapshot (written by the service; read by phase handlers)
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every input in the system, taken at the top
/// of each period.  Fault flags accompany their readings: a flagged value is
/// still carried through to the frame, marked via the status byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSnapshot {
    /// Raw set-point pot samples (already inverted to 10-bit scale).
    pub setpoint_raw: [u16; NUM_SETPOINTS],

    /// Board temperature (°C).
    pub board_temperature_c: f32,
    /// Board relative humidity (%).
    pub board_humidity_pct: f32,
    /// Board environmental sensor reported a read fault this period.
    pub board_env_fault: bool,

    /// RTD probe temperatures (°C).
    pub probe_temperature_c: [f32; NUM_PROBES],
    /// Per-probe amplifier fault flags.
    pub probe_fault: [bool; NUM_PROBES],

    /// Leak detection comparator input.
    pub leak_detected: bool,
    /// Leak continuity loop input (true = loop intact).
    pub leak_continuity: bool,
}

// ---------------------------------------------------------------------------
// Output line levels (written by Evaluating; applied by the service)
// ---------------------------------------------------------------------------

/// Levels for the two condition output lines, refreshed every cycle.
/// Pure level outputs — no latching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineLevels {
    pub warning: bool,
    pub error: bool,
}

// ---------------------------------------------------------------------------
// CycleContext
// ---------------------------------------------------------------------------

/// The shared context passed to every phase handler.
pub struct CycleContext {
    /// Armed by the service when the update period has elapsed; consumed on
    /// entering Sampling.
    pub period_due: bool,

    /// Latest input snapshot, written by the service before the revolution.
    pub sensors: SensorSnapshot,

    /// One rolling-average threshold filter per set-point channel.
    pub filters: [ThresholdFilter<SAMPLE_WINDOW>; NUM_SETPOINTS],

    /// Sensor status bits.  Init-error bits are set once by the service and
    /// persist; read-error and threshold bits are rewritten every cycle.
    pub status: StatusWord,

    /// Staged telemetry values for the current period.
    pub frame: TelemetryFrame,

    /// Encoded frame bytes, valid while `frame_ready` is set.
    pub tx_buf: [u8; FRAME_LEN],
    /// Set by Transmitting once `tx_buf` holds a freshly encoded frame;
    /// cleared by the service after the bytes are handed to the link.
    pub frame_ready: bool,

    /// Condition output levels derived this cycle.
    pub lines: LineLevels,

    /// System configuration (fixed at boot).
    pub config: SystemConfig,
}

impl CycleContext {
    /// Create a new context, building one filter per configured channel.
    pub fn new(config: SystemConfig) -> Self {
        let filters = core::array::from_fn(|i| {
            let ch = &config.channels[i];
            ThresholdFilter::with_range(ch.min, ch.max, ch.hysteresis)
        });

        Self {
            period_due: false,
            sensors: SensorSnapshot::default(),
            filters,
            status: StatusWord::new(),
            frame: TelemetryFrame::default(),
            tx_buf: [0; FRAME_LEN],
            frame_ready: false,
            lines: LineLevels::default(),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_pick_up_channel_config() {
        let mut config = SystemConfig::default();
        config.channels[1].min = 20.0;
        config.channels[1].max = 60.0;
        let mut ctx = CycleContext::new(config);

        // Mid-scale raw sample on a [20, 60] channel lands mid-range.
        for _ in 0..SAMPLE_WINDOW {
            ctx.filters[1].update(512);
        }
        let v = ctx.filters[1].value();
        assert!((39.0..=41.0).contains(&v), "unexpected value {v}");
    }

    #[test]
    fn probe_channel_indexing() {
        assert_eq!(SetpointChannel::probe(0), SetpointChannel::ProbeTemp1.index());
        assert_eq!(SetpointChannel::probe(1), SetpointChannel::ProbeTemp2.index());
    }
}
