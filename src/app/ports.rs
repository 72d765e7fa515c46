//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensors, output lines, the RS-485 link, event sinks)
//! implement these traits.  The [`MonitorService`](super::service::MonitorService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and the whole cycle runs on the host under test mocks.

use crate::cycle::context::SensorSnapshot;
use crate::error::LinkError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per period to obtain every
/// input — set-point samples, environmental readings with their fault
/// flags, and the two leak-sense lines.
///
/// Implementations must be best-effort: a failed bus transaction is
/// reported through the snapshot's fault flags, never by panicking or
/// withholding the snapshot.
pub trait SensorPort {
    fn read_all(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Signal port (driven adapter: domain → condition outputs)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the condition output lines.  Levels are re-applied
/// every cycle whether or not they changed.
pub trait SignalPort {
    /// Drive the warning line (mirrors the derived warning condition).
    fn set_warning_line(&mut self, level: bool);

    /// Drive the error line (mirrors the derived error condition).
    fn set_error_line(&mut self, level: bool);

    /// Drive the scope-hook marker line bracketing one cycle's activity.
    fn set_cycle_marker(&mut self, level: bool);
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain → telemetry link)
// ───────────────────────────────────────────────────────────────

/// Push-side port for the telemetry link.  One fixed-length frame per
/// period, written contiguously; there is no acknowledgment and no retry —
/// a failed write is logged and the frame is simply lost.
pub trait LinkPort {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log in
/// production, a recording vec under test).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
