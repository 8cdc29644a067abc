//! SNTP wall-clock adapter.
//!
//! Implements [`ClockPort`]:
//!
//! - **`target_os = "espidf"`** — starts the ESP-IDF SNTP client once
//!   and reads the synced system clock via `gettimeofday`; uptime comes
//!   from the high-resolution monotonic timer.
//! - **`not(target_os = "espidf")`** — a settable epoch base plus
//!   `std::time::Instant` for host-side testing and simulation.
//!
//! A failed or pending sync is reported as "not synced", never an
//! error: the schedule executor simply stays dormant until time exists.

use crate::app::ports::ClockPort;

/// Reject obviously unsynced clocks (anything before 2020-01-01).
#[cfg(target_os = "espidf")]
const EPOCH_2020: i64 = 1_577_836_800;

pub struct SntpClock {
    #[cfg(target_os = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_epoch_base: Option<u64>,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl SntpClock {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            sntp: None,
            #[cfg(not(target_os = "espidf"))]
            sim_epoch_base: None,
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Set the simulated wall clock (host/test builds only).  The epoch
    /// then advances with host uptime.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_epoch(&mut self, epoch_secs: u64) {
        self.sim_epoch_base = Some(epoch_secs);
        self.start = std::time::Instant::now();
    }
}

impl ClockPort for SntpClock {
    #[cfg(target_os = "espidf")]
    fn epoch_secs(&self) -> Option<u64> {
        let mut tv = esp_idf_svc::sys::timeval { tv_sec: 0, tv_usec: 0 };
        // SAFETY: gettimeofday writes into the provided struct; no
        // shared state is touched.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        if tv.tv_sec < EPOCH_2020 {
            return None;
        }
        Some(tv.tv_sec as u64)
    }

    #[cfg(not(target_os = "espidf"))]
    fn epoch_secs(&self) -> Option<u64> {
        self.sim_epoch_base
            .map(|base| base + self.start.elapsed().as_secs())
    }

    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a monotonic read.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_os = "espidf")]
    fn resynchronize(&mut self) -> bool {
        if self.sntp.is_none() {
            match esp_idf_svc::sntp::EspSntp::new_default() {
                Ok(sntp) => {
                    log::info!("SNTP client started");
                    self.sntp = Some(sntp);
                }
                Err(e) => {
                    log::warn!("SNTP start failed: {e}");
                    return false;
                }
            }
        }
        // The client re-syncs on its own schedule; report whether the
        // system clock currently looks sane.
        self.epoch_secs().is_some()
    }

    #[cfg(not(target_os = "espidf"))]
    fn resynchronize(&mut self) -> bool {
        self.sim_epoch_base.is_some()
    }
}
