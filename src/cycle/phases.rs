//! Phase handler implementations and the phase table.
//!
//! Handlers are pure functions over [`CycleContext`] — all bus and GPIO I/O
//! happens in the service, which stages its results in the context before
//! driving the machine.  That keeps every derivation here testable on the
//! host without mock hardware.

use super::context::{CycleContext, SetpointChannel};
use super::{PhaseDescriptor, PhaseId};
use crate::config::NUM_PROBES;

/// Build the phase table.  Order must match `PhaseId` discriminants.
pub fn build_phase_table() -> [PhaseDescriptor; PhaseId::COUNT] {
    [
        PhaseDescriptor {
            id: PhaseId::Idle,
            name: "IDLE",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        PhaseDescriptor {
            id: PhaseId::Sampling,
            name: "SAMPLING",
            on_enter: Some(sampling_enter),
            on_exit: None,
            on_update: sampling_update,
        },
        PhaseDescriptor {
            id: PhaseId::Evaluating,
            name: "EVALUATING",
            on_enter: None,
            on_exit: None,
            on_update: evaluating_update,
        },
        PhaseDescriptor {
            id: PhaseId::Transmitting,
            name: "TRANSMITTING",
            on_enter: None,
            on_exit: None,
            on_update: transmitting_update,
        },
    ]
}

// ---------------------------------------------------------------------------
// Idle
// ---------------------------------------------------------------------------

/// Wait for the service to arm the period trigger.
fn idle_update(ctx: &mut CycleContext) -> Option<PhaseId> {
    ctx.period_due.then_some(PhaseId::Sampling)
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Consume the period trigger on entry.
fn sampling_enter(ctx: &mut CycleContext) {
    ctx.period_due = false;
}

/// Feed every threshold filter from its set-point sample and stage the
/// measured values into the frame.
fn sampling_update(ctx: &mut CycleContext) -> Option<PhaseId> {
    for (i, filter) in ctx.filters.iter_mut().enumerate() {
        filter.update(ctx.sensors.setpoint_raw[i]);
        ctx.frame.setpoint[i] = filter.value();
    }

    ctx.frame.board_temperature = ctx.sensors.board_temperature_c;
    ctx.frame.board_humidity = ctx.sensors.board_humidity_pct;
    ctx.frame.probe_temperature = ctx.sensors.probe_temperature_c;
    ctx.frame.leak_detected = ctx.sensors.leak_detected;
    ctx.frame.leak_continuity = ctx.sensors.leak_continuity;

    Some(PhaseId::Evaluating)
}

// ---------------------------------------------------------------------------
// Evaluating
// ---------------------------------------------------------------------------

/// Derive read-error bits, threshold outcomes, the three condition flags and
/// the output line levels.
///
/// A flagged or NaN reading marks the matching read-error bit but never
/// aborts the cycle — the value (stale or out of range as it may be) still
/// rides along in the frame.
fn evaluating_update(ctx: &mut CycleContext) -> Option<PhaseId> {
    let snap = ctx.sensors;
    let bits = &ctx.config.status_bits;

    // Read-error bits, rewritten every cycle from this period's flags.
    let board_read_err =
        snap.board_env_fault || snap.board_temperature_c.is_nan() || snap.board_humidity_pct.is_nan();
    ctx.status.set_to(bits.board_sensor_read_error, board_read_err);

    let mut probe_read_err = false;
    for i in 0..NUM_PROBES {
        probe_read_err |= snap.probe_fault[i] || snap.probe_temperature_c[i].is_nan();
    }
    ctx.status.set_to(bits.probe_sensor_read_error, probe_read_err);

    // Threshold comparisons against the live physical readings.  A NaN
    // reading compares as not-OK, which is the failsafe direction.
    let board_temp_ok = ctx.filters[SetpointChannel::BoardTemp.index()]
        .compare(snap.board_temperature_c);
    let board_humidity_ok = ctx.filters[SetpointChannel::BoardHumidity.index()]
        .compare(snap.board_humidity_pct);

    let mut probes_ok = true;
    for i in 0..NUM_PROBES {
        let ok = ctx.filters[SetpointChannel::probe(i)].compare(snap.probe_temperature_c[i]);
        ctx.status.set_to(bits.probe_fault[i], !ok);
        probes_ok &= ok;
    }

    ctx.status.set_to(bits.board_temperature_warning, !board_temp_ok);
    ctx.status.set_to(bits.board_humidity_warning, !board_humidity_ok);

    // Warning: either board environmental reading above its set-point.
    let warning = !(board_temp_ok && board_humidity_ok);
    // Error: continuity loop broken, or any probe above its set-point.
    let error = !(snap.leak_continuity && probes_ok);
    // Fault (to the controller): a detected leak or any error condition.
    let fault = snap.leak_detected || error;

    ctx.frame.warning_condition = warning;
    ctx.frame.fault_condition = fault;
    ctx.lines.warning = warning;
    ctx.lines.error = error;

    Some(PhaseId::Transmitting)
}

// ---------------------------------------------------------------------------
// Transmitting
// ---------------------------------------------------------------------------

/// Fold the status word into the frame, recompute the checksum and encode.
fn transmitting_update(ctx: &mut CycleContext) -> Option<PhaseId> {
    ctx.frame.status = ctx.status;
    ctx.frame.encode(&mut ctx.tx_buf);
    ctx.frame_ready = true;

    Some(PhaseId::Idle)
}
