//! RTD probe temperature sensors (MAX31865-class SPI amplifiers).
//!
//! Each external PT100 probe hangs off its own amplifier on the shared SPI
//! bus, selected by chip-select line.  The amplifier latches wiring faults
//! (open RTD, shorted leads) into a fault bit that rides along with every
//! conversion; a latched fault raises the probe's fault flag while the
//! previous good temperature is retained.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the RTD ratio registers via hw_init SPI helpers.
//! On host/test: reads from per-probe static atomics for injection.

use core::sync::atomic::{AtomicBool, AtomicU32};
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use crate::config::NUM_PROBES;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::{Result, SensorError};

/// Reference resistor on the amplifier board (Ω).
const R_REF: f32 = 400.0;
/// Nominal RTD resistance at 0 °C (PT100).
const R_NOMINAL: f32 = 100.0;

/// Callendar–Van Dusen coefficients for a standard PT100 element.
const RTD_A: f32 = 3.9083e-3;
const RTD_B: f32 = -5.775e-7;

// f32 bit patterns: 20.0 °C each.
static SIM_PROBE_TEMP: [AtomicU32; NUM_PROBES] =
    [AtomicU32::new(0x41A0_0000), AtomicU32::new(0x41A0_0000)];
static SIM_PROBE_FAULT: [AtomicBool; NUM_PROBES] =
    [AtomicBool::new(false), AtomicBool::new(false)];

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_probe_temp(index: usize, temperature_c: f32) {
    SIM_PROBE_TEMP[index].store(temperature_c.to_bits(), Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_probe_fault(index: usize, fault: bool) {
    SIM_PROBE_FAULT[index].store(fault, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
pub struct ProbeReading {
    pub temperature_c: f32,
    /// Amplifier fault latched this period; the value is stale.
    pub fault: bool,
}

pub struct ProbeSensor {
    // One of the two identity fields idles per target: `index` selects the
    // simulation slot on the host, `cs_gpio` selects the device on the bus.
    #[allow(dead_code)]
    index: usize,
    #[allow(dead_code)]
    cs_gpio: i32,
    last_temperature_c: f32,
}

impl ProbeSensor {
    pub fn new(index: usize, cs_gpio: i32) -> Self {
        Self {
            index,
            cs_gpio,
            last_temperature_c: 0.0,
        }
    }

    /// Configure the amplifier at boot: bias on, auto conversion, 4-wire
    /// RTD, 50 Hz mains filter.
    #[cfg(target_os = "espidf")]
    pub fn init(&mut self) -> Result<()> {
        const CONFIG: u8 = 0b1101_0001;
        hw_init::spi_write_reg(self.cs_gpio, 0x00, CONFIG)
            .map_err(|_| SensorError::NotResponding)?;

        let mut readback = [0u8; 1];
        hw_init::spi_read_regs(self.cs_gpio, 0x00, &mut readback)
            .map_err(|_| SensorError::NotResponding)?;
        if readback[0] != CONFIG {
            return Err(SensorError::NotResponding.into());
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Read one conversion, falling back to the previous good temperature
    /// when the transaction fails or the amplifier reports a fault.
    pub fn read(&mut self) -> ProbeReading {
        match self.conversion() {
            Ok(t) => {
                self.last_temperature_c = t;
                ProbeReading {
                    temperature_c: t,
                    fault: false,
                }
            }
            Err(_) => ProbeReading {
                temperature_c: self.last_temperature_c,
                fault: true,
            },
        }
    }

    #[cfg(target_os = "espidf")]
    fn conversion(&mut self) -> core::result::Result<f32, SensorError> {
        // RTD MSB/LSB registers; the LSB's bit 0 is the fault latch.
        let mut regs = [0u8; 2];
        hw_init::spi_read_regs(self.cs_gpio, 0x01, &mut regs)?;

        if regs[1] & 0x01 != 0 {
            return Err(SensorError::SpiReadFailed);
        }

        let ratio = u16::from_be_bytes(regs) >> 1;
        let resistance = f32::from(ratio) / 32768.0 * R_REF;
        Ok(resistance_to_celsius(resistance))
    }

    #[cfg(not(target_os = "espidf"))]
    fn conversion(&mut self) -> core::result::Result<f32, SensorError> {
        if SIM_PROBE_FAULT[self.index].load(Ordering::Relaxed) {
            return Err(SensorError::SpiReadFailed);
        }
        Ok(f32::from_bits(SIM_PROBE_TEMP[self.index].load(Ordering::Relaxed)))
    }
}

/// Convert RTD resistance to temperature via the Callendar–Van Dusen
/// quadratic.  Exact above 0 °C and within a few hundredths of a degree
/// down to −60 °C, which covers the installation envelope.
fn resistance_to_celsius(resistance: f32) -> f32 {
    let discriminant = RTD_A * RTD_A - 4.0 * RTD_B * (1.0 - resistance / R_NOMINAL);
    (-RTD_A + discriminant.sqrt()) / (2.0 * RTD_B)
}
