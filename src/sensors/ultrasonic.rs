//! HC-SR04 ultrasonic level sensing for the food hopper and water
//! reservoir.
//!
//! A container's fill level is inferred from the echo distance to the
//! surface: close = full, far = empty.  Readings outside the calibrated
//! range (or a missing echo) are treated as empty rather than an error —
//! a flaky sensor must not crash the control loop.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: fires the trigger pulse and times the echo via hw_init
//! helpers.  On host/test: returns an injectable simulated distance.

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Echo timeout: ~5 m round trip, bounds the busy-wait.
#[cfg(target_os = "espidf")]
const ECHO_TIMEOUT_US: u64 = 30_000;

/// Speed of sound, cm per microsecond, halved for the round trip.
#[cfg(target_os = "espidf")]
const CM_PER_US_HALVED: f32 = 0.0343 / 2.0;

pub struct UltrasonicSensor {
    trig_gpio: i32,
    echo_gpio: i32,
    /// Distance reading when the container is empty (cm).
    empty_distance_cm: f32,
    /// Distance reading when the container is full (cm).
    full_distance_cm: f32,
    last_percent: u8,
    #[cfg(not(target_os = "espidf"))]
    sim_distance_cm: f32,
}

impl UltrasonicSensor {
    pub fn new(trig_gpio: i32, echo_gpio: i32, empty_distance_cm: f32, full_distance_cm: f32) -> Self {
        Self {
            trig_gpio,
            echo_gpio,
            empty_distance_cm,
            full_distance_cm,
            last_percent: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_distance_cm: empty_distance_cm,
        }
    }

    /// Fire one ranging cycle and return the fill level (0–100 %).
    pub fn read(&mut self) -> u8 {
        let distance = self.measure_distance_cm();
        self.last_percent =
            percent_from_distance(distance, self.empty_distance_cm, self.full_distance_cm);
        self.last_percent
    }

    /// Most recent fill level without a new ranging cycle.
    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }

    /// Inject a simulated surface distance (host/test builds only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_distance(&mut self, cm: f32) {
        self.sim_distance_cm = cm;
    }

    // ── Internal ──────────────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn measure_distance_cm(&self) -> f32 {
        // 10 µs trigger pulse, then time the echo.
        hw_init::gpio_write(self.trig_gpio, false);
        hw_init::delay_us(2);
        hw_init::gpio_write(self.trig_gpio, true);
        hw_init::delay_us(10);
        hw_init::gpio_write(self.trig_gpio, false);

        match hw_init::pulse_in_us(self.echo_gpio, ECHO_TIMEOUT_US) {
            Some(us) => us as f32 * CM_PER_US_HALVED,
            // No echo — report empty distance (container reads 0 %).
            None => self.empty_distance_cm,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn measure_distance_cm(&self) -> f32 {
        let _ = (self.trig_gpio, self.echo_gpio);
        self.sim_distance_cm
    }
}

/// Linear map from surface distance to fill percent, clamped to 0–100.
/// Distances at or beyond `empty` read 0 %; at or inside `full` read 100 %.
/// Non-positive distances are sensor glitches and also read 0 %.
pub fn percent_from_distance(distance_cm: f32, empty_cm: f32, full_cm: f32) -> u8 {
    if distance_cm <= 0.0 || distance_cm > empty_cm {
        return 0;
    }
    let span = empty_cm - full_cm;
    if span <= 0.0 {
        return 0;
    }
    let fraction = (empty_cm - distance_cm) / span;
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}
