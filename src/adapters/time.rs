//! ESP32 time adapter.
//!
//! Provides wall-clock timestamps for log entries and a monotonic
//! millisecond counter for the scheduler loop.
//!
//! - **`target_os = "espidf"`**: wall clock from `gettimeofday()` +
//!   `localtime_r()`, monotonic time from `esp_timer_get_time()`.
//! - **`not(target_os = "espidf")`**: `std::time::SystemTime` and
//!   `std::time::Instant` for host-side testing and simulation.

use crate::app::ports::ClockPort;
use crate::log_buffer::Timestamp;

/// Clock adapter for the ESP32-S3 panel.
pub struct PanelClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for PanelClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Local time of day.  Before the RTC is set this reads as time since
    /// boot, which is still a usable log stamp.
    #[cfg(target_os = "espidf")]
    fn time_of_day(&self) -> Timestamp {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return Timestamp::from_secs_of_day(self.uptime_ms() / 1000);
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return Timestamp::from_secs_of_day(self.uptime_ms() / 1000);
        }
        Timestamp::from_hms(tm.tm_hour as u8, tm.tm_min as u8, tm.tm_sec as u8)
    }

    /// UTC time of day from the host clock.
    #[cfg(not(target_os = "espidf"))]
    fn time_of_day(&self) -> Timestamp {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Timestamp::from_secs_of_day(secs)
    }
}

impl ClockPort for PanelClock {
    fn now(&self) -> Timestamp {
        self.time_of_day()
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn uptime_is_monotonic() {
        let clock = PanelClock::new();
        let a = clock.uptime_ms();
        let b = clock.uptime_ms();
        assert!(b >= a);
    }

    #[test]
    fn time_of_day_is_within_one_day() {
        let ts = PanelClock::new().now();
        assert!(ts.hour() < 24);
        assert!(ts.minute() < 60);
        assert!(ts.second() < 60);
    }
}
