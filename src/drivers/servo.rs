//! Hopper gate servo driver (SG90 class).
//!
//! One dispense = open the gate, hold, close, settle.  The hold and
//! settle delays are intentional bounded busy-waits: a feed action runs
//! to completion before control returns to the loop.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC servo channel via hw_init helpers.
//! On host/test: tracks state and counts dispenses in-memory only.

use crate::config::SystemConfig;
use crate::drivers::hw_init;
use log::info;

/// Minimum servo pulse width (0°), microseconds.
const PULSE_MIN_US: u32 = 500;
/// Maximum servo pulse width (180°), microseconds.
const PULSE_MAX_US: u32 = 2400;
/// LEDC frame period at 50 Hz, microseconds.
const FRAME_US: u32 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Closed,
    Open,
}

pub struct FeedServo {
    open_angle: u8,
    close_angle: u8,
    hold_ms: u32,
    settle_ms: u32,
    state: GateState,
    dispense_count: u32,
}

impl FeedServo {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            open_angle: config.servo_open_angle,
            close_angle: config.servo_close_angle,
            hold_ms: config.dispense_hold_ms,
            settle_ms: config.dispense_settle_ms,
            state: GateState::Closed,
            dispense_count: 0,
        }
    }

    /// Park the gate closed.  Call once at boot before the first dispense.
    pub fn park(&mut self) {
        self.write_angle(self.close_angle);
        self.state = GateState::Closed;
    }

    /// Run one full dispense motion.  Blocks for hold + settle.
    pub fn dispense_once(&mut self) {
        info!("Servo: dispensing (open {}ms)", self.hold_ms);
        self.write_angle(self.open_angle);
        self.state = GateState::Open;
        Self::sleep_ms(self.hold_ms);

        self.write_angle(self.close_angle);
        self.state = GateState::Closed;
        Self::sleep_ms(self.settle_ms);

        self.dispense_count += 1;
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Dispenses performed since boot.
    pub fn dispense_count(&self) -> u32 {
        self.dispense_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn write_angle(&self, angle: u8) {
        hw_init::ledc_set_servo(duty_for_angle(angle));
    }

    #[cfg(target_os = "espidf")]
    fn sleep_ms(ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep_ms(_ms: u32) {}
}

/// Map a 0–180° angle onto the 14-bit LEDC duty for a 50 Hz frame.
pub fn duty_for_angle(angle: u8) -> u32 {
    let angle = u32::from(angle.min(180));
    let pulse_us = PULSE_MIN_US + (PULSE_MAX_US - PULSE_MIN_US) * angle / 180;
    // duty = pulse / frame scaled to 2^14 counts
    pulse_us * (1 << 14) / FRAME_US
}
