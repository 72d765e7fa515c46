//! Leak-sense digital inputs.
//!
//! Two lines from the leak-sensing cable interface: the detection
//! comparator (HIGH = moisture bridging the sense tracks) and the
//! continuity loop (HIGH = cable present and unbroken).  A missing or cut
//! cable drops continuity, which the cycle treats as an error condition.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads real GPIO levels via hw_init helpers.
//! On host/test: defaults to no-leak, loop-intact (safe defaults).

use core::sync::atomic::AtomicBool;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

static SIM_LEAK_DETECT: AtomicBool = AtomicBool::new(false);
static SIM_LEAK_CONTINUITY: AtomicBool = AtomicBool::new(true);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_leak_detect(detected: bool) {
    SIM_LEAK_DETECT.store(detected, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_leak_continuity(intact: bool) {
    SIM_LEAK_CONTINUITY.store(intact, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
pub struct LeakReading {
    pub detected: bool,
    pub continuity: bool,
}

pub struct LeakInputs;

impl LeakInputs {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self) -> LeakReading {
        LeakReading {
            detected: self.read_detect(),
            continuity: self.read_continuity(),
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_detect(&self) -> bool {
        hw_init::gpio_read(pins::LEAK_DETECT_GPIO)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_detect(&self) -> bool {
        SIM_LEAK_DETECT.load(Ordering::Relaxed)
    }

    #[cfg(target_os = "espidf")]
    fn read_continuity(&self) -> bool {
        hw_init::gpio_read(pins::LEAK_CONTINUITY_GPIO)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_continuity(&self) -> bool {
        SIM_LEAK_CONTINUITY.load(Ordering::Relaxed)
    }
}

impl Default for LeakInputs {
    fn default() -> Self {
        Self::new()
    }
}
