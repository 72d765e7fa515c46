//! Condition output line driver.
//!
//! Drives the warning and error lines to the supervisory controller plus
//! the cycle-marker scope hook.  Levels are cached so queries never touch
//! the hardware.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real GPIO levels via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct SignalLines {
    warning: bool,
    error: bool,
}

impl SignalLines {
    pub fn new() -> Self {
        Self {
            warning: false,
            error: false,
        }
    }

    pub fn set_warning(&mut self, level: bool) {
        hw_init::gpio_write(pins::WARNING_LINE_GPIO, level);
        self.warning = level;
    }

    pub fn set_error(&mut self, level: bool) {
        hw_init::gpio_write(pins::ERROR_LINE_GPIO, level);
        self.error = level;
    }

    /// Scope hook bracketing one cycle's activity; not cached.
    pub fn set_marker(&mut self, level: bool) {
        hw_init::gpio_write(pins::CYCLE_MARKER_GPIO, level);
    }

    pub fn warning(&self) -> bool {
        self.warning
    }

    pub fn error(&self) -> bool {
        self.error
    }
}

impl Default for SignalLines {
    fn default() -> Self {
        Self::new()
    }
}
