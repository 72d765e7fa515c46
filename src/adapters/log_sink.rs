//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).  The
//! telemetry link itself carries only the binary frame; this output is
//! purely for humans.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the debug console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::CycleCompleted(r) => {
                // Once per period — debug level keeps the console usable.
                debug!(
                    "CYCLE | T={:.1}\u{00b0}C RH={:.1}% | probes={:.1}/{:.1}\u{00b0}C | \
                     leak={} cont={} | warn={} fault={} | status=0b{:08b} chk=0x{:02X}",
                    r.board_temperature_c,
                    r.board_humidity_pct,
                    r.probe_temperature_c[0],
                    r.probe_temperature_c[1],
                    u8::from(r.leak_detected),
                    u8::from(r.leak_continuity),
                    u8::from(r.warning_condition),
                    u8::from(r.fault_condition),
                    r.status,
                    r.checksum,
                );
            }
            AppEvent::ConditionChanged {
                warning,
                error,
                fault,
            } => {
                info!(
                    "CONDITION | warning={} error={} fault={}",
                    warning, error, fault
                );
            }
            AppEvent::LinkFailed(e) => {
                warn!("LINK | frame dropped: {}", e);
            }
            AppEvent::Started => {
                info!("START | monitor cycle armed");
            }
        }
    }
}
