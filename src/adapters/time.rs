//! Monotonic clock adapter.
//!
//! The update cycle is gated on a wrapping `u32` millisecond counter.  The
//! wrap (every ~49.7 days) is harmless: the service compares elapsed time
//! with modular unsigned arithmetic, so the period trigger neither stalls
//! nor double-fires across it.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side runs.

/// Millisecond uptime source.
pub struct ClockAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for ClockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot, truncated to `u32` (wraps).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
    }

    /// Milliseconds since construction, truncated to `u32` (wraps).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
