//! System configuration parameters
//!
//! All tunable parameters for the PetFeeder system.
//! Values can be overridden at build time or via persistent storage.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Food level thresholds (percent) ---
    /// Food level at or below this raises a warning alert
    pub food_warning_percent: u8,
    /// Food level at or below this raises a critical alert
    pub food_critical_percent: u8,
    /// Absolute floor: dispensing is refused below this level
    pub feed_floor_percent: u8,

    // --- Water level thresholds (percent) ---
    /// Water level at or below this raises a warning alert
    pub water_warning_percent: u8,
    /// Water level at or below this raises a critical alert
    pub water_critical_percent: u8,

    // --- Battery thresholds (percent) ---
    /// Battery below this raises a warning and blocks scheduled feeds
    pub battery_low_percent: f32,
    /// Battery below this raises a critical alert
    pub battery_critical_percent: f32,

    // --- Alert behaviour ---
    /// Recovery margin above the warning threshold for food/water flags
    pub level_hysteresis_percent: u8,
    /// Recovery margin above the low threshold for battery flags
    pub battery_hysteresis_percent: f32,
    /// Minimum spacing between any two emitted alerts (seconds)
    pub alert_cooldown_secs: u32,

    // --- Dispense actuation ---
    /// Servo angle for the open (dispensing) hopper gate
    pub servo_open_angle: u8,
    /// Servo angle for the closed hopper gate
    pub servo_close_angle: u8,
    /// How long the gate stays open per dispense (milliseconds)
    pub dispense_hold_ms: u32,
    /// Settle delay after closing the gate (milliseconds)
    pub dispense_settle_ms: u32,

    // --- Persistence ---
    /// Minimum delay between feed-record writes (seconds)
    pub record_quiescence_secs: u32,

    // --- Timing ---
    /// Driver loop period: sensor poll + decision pipeline (milliseconds)
    pub poll_interval_ms: u32,
    /// Status display refresh interval (milliseconds)
    pub display_update_interval_ms: u32,
    /// Wall-clock resynchronisation interval (seconds)
    pub time_sync_interval_secs: u32,
    /// Chat inactivity before the radio is idled (seconds)
    pub idle_timeout_secs: u32,

    // --- Locale ---
    /// Fixed offset from UTC applied to the synced epoch (hours)
    pub timezone_offset_hours: i8,

    // --- Battery calibration ---
    /// Pack voltage considered 0%
    pub battery_min_volts: f32,
    /// Pack voltage considered 100%
    pub battery_max_volts: f32,
    /// Divider ratio: pack volts per ADC-pin volt
    pub battery_divider_scale: f32,
    /// Raw ADC counts read with the pin grounded
    pub battery_adc_offset: u16,

    // --- Level sensor calibration (ultrasonic) ---
    /// Echo distance when the food hopper is empty (cm)
    pub food_empty_distance_cm: f32,
    /// Echo distance when the water reservoir is empty (cm)
    pub water_empty_distance_cm: f32,
    /// Echo distance when a container is full (cm)
    pub full_distance_cm: f32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Food
            food_warning_percent: 30,
            food_critical_percent: 15,
            feed_floor_percent: 10,

            // Water
            water_warning_percent: 25,
            water_critical_percent: 10,

            // Battery
            battery_low_percent: 15.0,
            battery_critical_percent: 10.0,

            // Alerts
            level_hysteresis_percent: 10,
            battery_hysteresis_percent: 5.0,
            alert_cooldown_secs: 1800, // 30 min

            // Dispense
            servo_open_angle: 0,
            servo_close_angle: 180,
            dispense_hold_ms: 1000,
            dispense_settle_ms: 500,

            // Persistence
            record_quiescence_secs: 10,

            // Timing
            poll_interval_ms: 5000,
            display_update_interval_ms: 2000,
            time_sync_interval_secs: 3600,
            idle_timeout_secs: 300,

            // Locale (UTC+8)
            timezone_offset_hours: 8,

            // Battery calibration (2S pack behind a resistive divider)
            battery_min_volts: 6.0,
            battery_max_volts: 8.4,
            battery_divider_scale: 3.8365,
            battery_adc_offset: 17,

            // Level sensors
            food_empty_distance_cm: 13.6,
            water_empty_distance_cm: 6.3,
            full_distance_cm: 2.0,
        }
    }
}
