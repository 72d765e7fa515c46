//! Analog set-point inputs (front-panel potentiometers).
//!
//! One pot per threshold channel, read through the 10-bit ADC.  The raw
//! sample is inverted before it reaches the threshold filter so that
//! clockwise rotation raises the set-point.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the ADC1 oneshot channel configured by hw_init.
//! On host/test: reads from per-channel static atomics for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use crate::config::NUM_SETPOINTS;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Top of the 10-bit ADC scale; keep in step with
/// [`FULL_SCALE`](crate::filter::FULL_SCALE).
const ADC_MAX: u16 = 1023;

// Mid-travel default so host runs start with plausible thresholds.
static SIM_SETPOINT_RAW: [AtomicU16; NUM_SETPOINTS] = [
    AtomicU16::new(512),
    AtomicU16::new(512),
    AtomicU16::new(512),
    AtomicU16::new(512),
];

/// Inject the *inverted* (post-conversion) raw sample for a channel.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_setpoint_raw(index: usize, raw: u16) {
    SIM_SETPOINT_RAW[index].store(raw, Ordering::Relaxed);
}

pub struct SetpointInput {
    #[allow(dead_code)]
    index: usize,
    #[allow(dead_code)]
    adc_channel: u32,
}

impl SetpointInput {
    pub fn new(index: usize, adc_channel: u32) -> Self {
        Self { index, adc_channel }
    }

    /// One raw sample, inverted to make clockwise = higher threshold.
    pub fn read(&self) -> u16 {
        ADC_MAX.saturating_sub(self.read_adc())
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        // The sim stores the post-inversion value; undo it here so read()
        // returns exactly what was injected.
        ADC_MAX.saturating_sub(SIM_SETPOINT_RAW[self.index].load(Ordering::Relaxed))
    }
}
