#![allow(dead_code)] // Consumed by cfg(espidf) driver paths and the binary

//! GPIO / peripheral pin assignments for the PetFeeder main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Feed servo (SG90 on the hopper gate)
// ---------------------------------------------------------------------------

/// LEDC PWM channel driving the hopper gate servo.
pub const SERVO_PWM_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Ultrasonic level sensors (HC-SR04)
// ---------------------------------------------------------------------------

/// Trigger output for the food hopper sensor.
pub const FOOD_TRIG_GPIO: i32 = 12;
/// Echo input for the food hopper sensor.
pub const FOOD_ECHO_GPIO: i32 = 13;

/// Trigger output for the water reservoir sensor.
pub const WATER_TRIG_GPIO: i32 = 14;
/// Echo input for the water reservoir sensor.
pub const WATER_ECHO_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Battery monitor (resistive divider into ADC1)
// ---------------------------------------------------------------------------

/// Battery voltage sense — ADC1 channel 0 (GPIO 36 on ESP32).
pub const BATTERY_ADC_GPIO: i32 = 36;
/// ADC attenuation for the battery divider (11 dB → 0 – 3.1 V range).
pub const BATTERY_ADC_ATTEN: u32 = 3; // esp_idf_hal::adc::attenuation::DB_11

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 status display)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// 7-bit I²C address of the SSD1306 OLED.
pub const DISPLAY_I2C_ADDR: u8 = 0x3C;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  14-bit gives fine servo pulse control.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Standard analog-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 1;
pub const UART_RX_GPIO: i32 = 3;
