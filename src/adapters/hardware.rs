//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the output line driver, exposing them through
//! [`SensorPort`] and [`SignalPort`].  The RS-485 link stays a separate
//! object (it is its own port argument to the service), so [`LinkPort`] is
//! implemented directly on [`SerialLink`] here.  On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{LinkPort, SensorPort, SignalPort};
use crate::cycle::context::SensorSnapshot;
use crate::drivers::serial_link::SerialLink;
use crate::drivers::signal_lines::SignalLines;
use crate::error::LinkError;
use crate::sensors::SensorHub;

/// Concrete adapter that combines the input and output hardware behind the
/// port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    lines: SignalLines,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub, lines: SignalLines) -> Self {
        Self { sensor_hub, lines }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_all(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_all()
    }
}

// ── SignalPort implementation ─────────────────────────────────

impl SignalPort for HardwareAdapter {
    fn set_warning_line(&mut self, level: bool) {
        self.lines.set_warning(level);
    }

    fn set_error_line(&mut self, level: bool) {
        self.lines.set_error(level);
    }

    fn set_cycle_marker(&mut self, level: bool) {
        self.lines.set_marker(level);
    }
}

// ── LinkPort implementation ───────────────────────────────────

impl LinkPort for SerialLink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        SerialLink::write_frame(self, frame)
    }
}
