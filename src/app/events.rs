//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — the production build logs them to the
//! debug console; tests record them.

use crate::config::{NUM_PROBES, NUM_SETPOINTS};
use crate::error::LinkError;

/// Structured events emitted by the monitoring core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started and the phase machine is armed.
    Started,

    /// One update cycle finished; carries the transmitted values.
    CycleCompleted(CycleReport),

    /// One of the derived conditions changed level.
    ConditionChanged {
        warning: bool,
        error: bool,
        fault: bool,
    },

    /// The telemetry link rejected this period's frame (frame lost; the
    /// next period transmits fresh values).
    LinkFailed(LinkError),
}

/// The values carried by the frame of one completed cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    pub setpoint: [f32; NUM_SETPOINTS],
    pub board_temperature_c: f32,
    pub board_humidity_pct: f32,
    pub probe_temperature_c: [f32; NUM_PROBES],
    pub leak_detected: bool,
    pub leak_continuity: bool,
    pub fault_condition: bool,
    pub warning_condition: bool,
    pub status: u8,
    pub checksum: u8,
}
