//! LeakSense Firmware — Main Entry Point
//!
//! Hexagonal architecture around a synchronous polling loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter        SerialLink       LogEventSink        │
//! │  (Sensor+SignalPort)    (LinkPort)       (EventSink)         │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ───────────────────     │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │            MonitorService (pure logic)             │      │
//! │  │  phase machine · filters · status word · frame     │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  ClockAdapter (wrapping ms uptime, gates the period)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use leaksense::adapters::hardware::HardwareAdapter;
use leaksense::adapters::log_sink::LogEventSink;
use leaksense::adapters::time::ClockAdapter;
use leaksense::app::service::{InitFault, MonitorService};
use leaksense::config::SystemConfig;
use leaksense::drivers::serial_link::SerialLink;
use leaksense::drivers::signal_lines::SignalLines;
use leaksense::drivers::hw_init;
use leaksense::pins;
use leaksense::sensors::board_env::BoardEnvSensor;
use leaksense::sensors::leak::LeakInputs;
use leaksense::sensors::probe::ProbeSensor;
use leaksense::sensors::setpoint::SetpointInput;
use leaksense::sensors::SensorHub;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("LeakSense v{} startup", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    if let Err(e) = config.validate() {
        return Err(anyhow::anyhow!("bad configuration: {e}"));
    }

    // ── 3. Peripheral bring-up ────────────────────────────────
    if let Err(e) = hw_init::init_peripherals(config.telemetry_baud) {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 4. Sensor collaborators (degraded mode on failure) ────
    //
    // A sensor that fails to come up latches its init-error status bit and
    // the board keeps cycling — the supervisory controller sees the bit in
    // every frame and decides what to do.
    let mut service = MonitorService::new(config.clone());
    let mut sink = LogEventSink::new();

    let mut board_env = BoardEnvSensor::new();
    if let Err(e) = board_env.init() {
        warn!("board environmental sensor init failed: {e}");
        service.flag_init_fault(InitFault::BoardSensor);
    }

    let mut probes =
        core::array::from_fn::<_, 2, _>(|i| ProbeSensor::new(i, pins::PROBE_CS_GPIOS[i]));
    for (i, probe) in probes.iter_mut().enumerate() {
        if let Err(e) = probe.init() {
            warn!("probe {} amplifier init failed: {e}", i + 1);
            service.flag_init_fault(InitFault::ProbeSensor);
        }
    }

    let setpoints =
        core::array::from_fn(|i| SetpointInput::new(i, pins::SETPOINT_ADC_CHANNELS[i]));

    // ── 5. Adapters ───────────────────────────────────────────
    let hub = SensorHub::new(board_env, probes, setpoints, LeakInputs::new());
    let mut hw = HardwareAdapter::new(hub, SignalLines::new());
    let mut link = SerialLink::new();
    let clock = ClockAdapter::new();

    // ── 6. Polling loop ───────────────────────────────────────
    service.start(&mut sink);
    info!("entering polling loop");

    loop {
        let now_ms = clock.uptime_ms();
        service.poll(now_ms, &mut hw, &mut link, &mut sink);

        // Yield between polls; the period gate inside poll() does the real
        // pacing.  On target this also keeps the idle task (and with it the
        // TWDT) serviced.
        #[cfg(target_os = "espidf")]
        esp_idf_hal::delay::FreeRtos::delay_ms(2);
        #[cfg(not(target_os = "espidf"))]
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
}
