//! Hardware drivers: peripheral bring-up, the RS-485 link, and the
//! condition output lines.
//!
//! Everything that touches ESP-IDF lives behind
//! `#[cfg(target_os = "espidf")]`; host builds get in-memory stand-ins.

pub mod hw_init;
pub mod serial_link;
pub mod signal_lines;
