//! Board environmental sensor (SHT3x-class, I²C).
//!
//! Reports board temperature and relative humidity in one transaction.
//! Each word in the reply carries a CRC-8; a failed transaction or CRC
//! mismatch raises the fault flag while the previous good values are
//! retained — a flaky sensor must not take down the cycle.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: single-shot measurement over the I²C master via hw_init.
//! On host/test: reads from static atomics for injection.

use core::sync::atomic::{AtomicBool, AtomicU32};
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::{Result, SensorError};
#[cfg(target_os = "espidf")]
use crate::pins;

// f32 bit patterns: 25.0 °C, 40.0 %RH.
static SIM_BOARD_TEMP: AtomicU32 = AtomicU32::new(0x41C8_0000);
static SIM_BOARD_HUMIDITY: AtomicU32 = AtomicU32::new(0x4220_0000);
static SIM_BOARD_FAULT: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_board_env(temperature_c: f32, humidity_pct: f32) {
    SIM_BOARD_TEMP.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_BOARD_HUMIDITY.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_board_fault(fault: bool) {
    SIM_BOARD_FAULT.store(fault, Ordering::Relaxed);
}

/// Single-shot high-repeatability measurement command (clock stretching off).
#[cfg(target_os = "espidf")]
const CMD_MEASURE: [u8; 2] = [0x24, 0x00];

#[derive(Debug, Clone, Copy)]
pub struct BoardEnvReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// Transaction or CRC failure this period; the values are stale.
    pub fault: bool,
}

pub struct BoardEnvSensor {
    last_temperature_c: f32,
    last_humidity_pct: f32,
}

impl BoardEnvSensor {
    pub fn new() -> Self {
        Self {
            last_temperature_c: 0.0,
            last_humidity_pct: 0.0,
        }
    }

    /// Probe the device once at boot.
    pub fn init(&mut self) -> Result<()> {
        self.probe_device()
    }

    /// Take one measurement, falling back to the previous good values on
    /// failure.
    pub fn read(&mut self) -> BoardEnvReading {
        match self.measure() {
            Ok((t, rh)) => {
                self.last_temperature_c = t;
                self.last_humidity_pct = rh;
                BoardEnvReading {
                    temperature_c: t,
                    humidity_pct: rh,
                    fault: false,
                }
            }
            Err(_) => BoardEnvReading {
                temperature_c: self.last_temperature_c,
                humidity_pct: self.last_humidity_pct,
                fault: true,
            },
        }
    }

    #[cfg(target_os = "espidf")]
    fn probe_device(&mut self) -> Result<()> {
        // A status-register read doubles as a presence check.
        let mut reply = [0u8; 3];
        hw_init::i2c_write_read(pins::BOARD_ENV_I2C_ADDR, &[0xF3, 0x2D], &mut reply)
            .map_err(|_| SensorError::NotResponding)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn probe_device(&mut self) -> Result<()> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn measure(&mut self) -> core::result::Result<(f32, f32), SensorError> {
        let mut reply = [0u8; 6];
        hw_init::i2c_write_read(pins::BOARD_ENV_I2C_ADDR, &CMD_MEASURE, &mut reply)?;

        if crc8(&reply[0..2]) != reply[2] || crc8(&reply[3..5]) != reply[5] {
            return Err(SensorError::I2cReadFailed);
        }

        let t_raw = u16::from_be_bytes([reply[0], reply[1]]);
        let rh_raw = u16::from_be_bytes([reply[3], reply[4]]);

        let temperature_c = -45.0 + 175.0 * f32::from(t_raw) / 65535.0;
        let humidity_pct = 100.0 * f32::from(rh_raw) / 65535.0;
        Ok((temperature_c, humidity_pct))
    }

    #[cfg(not(target_os = "espidf"))]
    fn measure(&mut self) -> core::result::Result<(f32, f32), SensorError> {
        if SIM_BOARD_FAULT.load(Ordering::Relaxed) {
            return Err(SensorError::I2cReadFailed);
        }
        Ok((
            f32::from_bits(SIM_BOARD_TEMP.load(Ordering::Relaxed)),
            f32::from_bits(SIM_BOARD_HUMIDITY.load(Ordering::Relaxed)),
        ))
    }
}

impl Default for BoardEnvSensor {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC-8 over a sensor reply word (poly 0x31, init 0xFF).
#[cfg(target_os = "espidf")]
fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}
