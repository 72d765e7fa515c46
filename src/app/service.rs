//! Monitor service — the hexagonal core.
//!
//! [`MonitorService`] owns the phase machine and its context.  It exposes a
//! clean, hardware-agnostic API; all I/O flows through port traits injected
//! at call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌─────────────────────────────┐ ──▶ SignalPort
//!                 │       MonitorService        │
//!                 │  filters · status · frame   │ ──▶ LinkPort
//!                 └─────────────────────────────┘ ──▶ EventSink
//! ```
//!
//! One `poll()` call per loop iteration; the service itself decides, with a
//! wraparound-safe comparison against the millisecond clock, whether the
//! update period has elapsed.  Everything between two periods costs one
//! integer subtraction.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::cycle::context::{CycleContext, LineLevels};
use crate::cycle::phases::build_phase_table;
use crate::cycle::{CycleEngine, PhaseId};
use crate::diagnostics;
use crate::telemetry::{TelemetryFrame, PAYLOAD_LEN};

use super::events::{AppEvent, CycleReport};
use super::ports::{EventSink, LinkPort, SensorPort, SignalPort};

/// A sensor collaborator that failed to come up at boot.
///
/// Init faults set their status bit once and keep it for the process
/// lifetime; the cycle keeps running degraded rather than halting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitFault {
    /// The board environmental sensor did not respond.
    BoardSensor,
    /// An RTD probe amplifier did not respond.
    ProbeSensor,
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// Orchestrates the periodic evaluate-and-transmit cycle.
pub struct MonitorService {
    engine: CycleEngine,
    ctx: CycleContext,
    /// Clock value at the start of the last executed cycle.
    last_cycle_ms: u32,
    cycle_count: u64,
    /// Previous condition levels, for change events.
    prev_lines: LineLevels,
    prev_fault: bool,
}

impl MonitorService {
    /// Construct the service from configuration.
    ///
    /// Does **not** arm the phase machine — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = CycleContext::new(config);
        let engine = CycleEngine::new(build_phase_table(), PhaseId::Idle);

        Self {
            engine,
            ctx,
            last_cycle_ms: 0,
            cycle_count: 0,
            prev_lines: LineLevels::default(),
            prev_fault: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Arm the phase machine and announce the service.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.engine.start(&mut self.ctx);
        sink.emit(&AppEvent::Started);
        info!(
            "monitor started: period={}ms, frame={}B",
            self.ctx.config.update_period_ms,
            crate::telemetry::FRAME_LEN
        );
    }

    /// Record a collaborator that failed to initialise.
    ///
    /// The matching init-error bit stays set in every transmitted frame for
    /// the process lifetime; the supervisory controller decides what to do
    /// with a board running degraded.
    pub fn flag_init_fault(&mut self, fault: InitFault) {
        let bits = &self.ctx.config.status_bits;
        match fault {
            InitFault::BoardSensor => self.ctx.status.set(bits.board_sensor_init_error),
            InitFault::ProbeSensor => self.ctx.status.set(bits.probe_sensor_init_error),
        }
        warn!("running degraded: {fault:?} failed to initialise");
    }

    // ── Per-period orchestration ──────────────────────────────

    /// Run one update cycle if the period has elapsed.
    ///
    /// `now_ms` is a wrapping millisecond uptime counter; the elapsed-time
    /// check uses modular unsigned arithmetic so a counter wrap neither
    /// stalls nor double-fires the cycle.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`SignalPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    ///
    /// Returns `true` if a cycle ran.
    pub fn poll(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + SignalPort),
        link: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if now_ms.wrapping_sub(self.last_cycle_ms) <= self.ctx.config.update_period_ms {
            return false;
        }
        self.last_cycle_ms = now_ms;

        // Marker high for the duration of the cycle (scope hook).
        hw.set_cycle_marker(true);

        // 1. One snapshot of every input via SensorPort.
        self.ctx.sensors = hw.read_all();

        // 2. One revolution of the phase machine:
        //    Idle → Sampling → Evaluating → Transmitting → Idle.
        self.ctx.period_due = true;
        for _ in 0..PhaseId::COUNT {
            self.engine.tick(&mut self.ctx);
        }
        debug_assert_eq!(self.engine.current_phase(), PhaseId::Idle);

        // 3. Refresh the condition lines — pure level outputs, re-applied
        //    every cycle.
        hw.set_warning_line(self.ctx.lines.warning);
        hw.set_error_line(self.ctx.lines.error);

        // 4. Hand the encoded frame to the link.  No retry: a lost frame is
        //    superseded by the next period's.
        if self.ctx.frame_ready {
            if let Err(e) = link.write_frame(&self.ctx.tx_buf) {
                warn!("telemetry frame dropped: {e}");
                sink.emit(&AppEvent::LinkFailed(e));
            }
            self.ctx.frame_ready = false;
        }

        // 5. Events + optional human-readable dump.
        self.emit_condition_change(sink);
        sink.emit(&AppEvent::CycleCompleted(self.report()));
        if self.ctx.config.debug_dump {
            diagnostics::dump_cycle(&self.ctx);
        }

        hw.set_cycle_marker(false);
        self.cycle_count += 1;
        true
    }

    // ── Queries ───────────────────────────────────────────────

    /// Values transmitted in the most recent cycle.
    pub fn report(&self) -> CycleReport {
        let f = &self.ctx.frame;
        CycleReport {
            setpoint: f.setpoint,
            board_temperature_c: f.board_temperature,
            board_humidity_pct: f.board_humidity,
            probe_temperature_c: f.probe_temperature,
            leak_detected: f.leak_detected,
            leak_continuity: f.leak_continuity,
            fault_condition: f.fault_condition,
            warning_condition: f.warning_condition,
            status: f.status.as_byte(),
            checksum: self.ctx.tx_buf[PAYLOAD_LEN],
        }
    }

    /// The staged telemetry frame.
    pub fn frame(&self) -> &TelemetryFrame {
        &self.ctx.frame
    }

    /// Current condition line levels.
    pub fn lines(&self) -> LineLevels {
        self.ctx.lines
    }

    /// Status byte as it will appear in the next frame.
    pub fn status_byte(&self) -> u8 {
        self.ctx.status.as_byte()
    }

    /// Total update cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn emit_condition_change(&mut self, sink: &mut impl EventSink) {
        let fault = self.ctx.frame.fault_condition;
        if self.ctx.lines != self.prev_lines || fault != self.prev_fault {
            sink.emit(&AppEvent::ConditionChanged {
                warning: self.ctx.lines.warning,
                error: self.ctx.lines.error,
                fault,
            });
            self.prev_lines = self.ctx.lines;
            self.prev_fault = fault;
        }
    }
}
