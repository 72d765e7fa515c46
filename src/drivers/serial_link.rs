//! RS-485 telemetry link driver.
//!
//! Push-only: one fixed-length frame per update period, written to the
//! UART in a single contiguous call.  The transceiver's DE//RE lines were
//! driven to the transmit-enabled state during `hw_init` and never change,
//! so there is no turnaround to sequence here.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes through the UART driver installed by hw_init.
//! On host/test: captures the last frame for inspection.

#[cfg(not(target_os = "espidf"))]
use std::sync::Mutex;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::LinkError;

#[cfg(not(target_os = "espidf"))]
static SIM_LAST_FRAME: Mutex<Vec<u8>> = Mutex::new(Vec::new());

/// Take the most recently written frame (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_take_frame() -> Vec<u8> {
    core::mem::take(&mut SIM_LAST_FRAME.lock().unwrap())
}

pub struct SerialLink {
    frames_sent: u32,
}

impl SerialLink {
    pub fn new() -> Self {
        Self { frames_sent: 0 }
    }

    /// Write one complete frame.  No retry on failure — the next period's
    /// frame supersedes this one.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.write_bytes(frame)?;
        self.frames_sent = self.frames_sent.wrapping_add(1);
        Ok(())
    }

    /// Frames accepted by the driver since boot (wraps).
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    #[cfg(target_os = "espidf")]
    fn write_bytes(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        let written = hw_init::uart_write(frame);
        if written < 0 {
            return Err(LinkError::WriteFailed);
        }
        if written as usize != frame.len() {
            return Err(LinkError::ShortWrite);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_bytes(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        *SIM_LAST_FRAME.lock().unwrap() = frame.to_vec();
        Ok(())
    }
}

impl Default for SerialLink {
    fn default() -> Self {
        Self::new()
    }
}
