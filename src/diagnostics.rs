//! Human-readable diagnostics dump.
//!
//! When `SystemConfig::debug_dump` is set, every cycle logs a multi-line
//! rendering of the values that went out in the frame.  This output is for
//! bench bring-up only — it is not part of the wire contract and nothing
//! downstream parses it.

use core::fmt::Write;

use log::info;

use crate::cycle::context::CycleContext;
use crate::telemetry::PAYLOAD_LEN;

/// Log one cycle's derived values.
pub fn dump_cycle(ctx: &CycleContext) {
    let f = &ctx.frame;

    info!(
        "leak={} cont={} fault={} warning={}",
        u8::from(f.leak_detected),
        u8::from(f.leak_continuity),
        u8::from(f.fault_condition),
        u8::from(f.warning_condition),
    );

    // Set-points on one line: "0:board_temp 29.0  1:board_humidity 31.5 ..."
    let mut line: heapless::String<128> = heapless::String::new();
    for (i, value) in f.setpoint.iter().enumerate() {
        let label = &ctx.config.channels[i].label;
        let _ = write!(line, "{i}:{label} {value:.1}  ");
    }
    info!("set-points: {}", line.trim_end());

    info!(
        "board: temp {:.1} C rel humidity {:.1} %",
        f.board_temperature, f.board_humidity
    );
    info!(
        "probe temps: 1: {:.1} C 2: {:.1} C",
        f.probe_temperature[0], f.probe_temperature[1]
    );
    info!(
        "status: 0b{:08b} checksum: 0x{:02X}",
        f.status.as_byte(),
        ctx.tx_buf[PAYLOAD_LEN]
    );
}
