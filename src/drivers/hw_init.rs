//! One-shot hardware peripheral initialization.
//!
//! Configures the battery ADC channel, ultrasonic trigger/echo GPIOs, and
//! the servo LEDC timer using raw ESP-IDF sys calls. Called once from
//! `main()` before the control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed => write!(f, "LEDC timer/channel config failed"),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio()?;
        init_servo_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the control loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    // GPIO 36 = ADC1 channel 0 on ESP32.
    let ret =
        unsafe { adc_oneshot_config_channel(adc1_handle(), adc_channel_t_ADC_CHANNEL_0, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH0=battery)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio() -> Result<(), HwInitError> {
    let input_pins = [pins::FOOD_ECHO_GPIO, pins::WATER_ECHO_GPIO];
    for &pin in &input_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    let output_pins = [pins::FOOD_TRIG_GPIO, pins::WATER_TRIG_GPIO];
    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO configured (trig/echo pairs)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    false
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio(). Main-loop only.
    unsafe {
        gpio_set_level(pin, if high { 1 } else { 0 });
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Pulse measurement (ultrasonic echo) ──────────────────────

/// Busy-wait measure of a HIGH pulse width on `pin`, in microseconds.
/// Returns `None` if the pulse never starts or never ends within
/// `timeout_us`, so the control loop cannot stall on a disconnected
/// sensor.
#[cfg(target_os = "espidf")]
pub fn pulse_in_us(pin: i32, timeout_us: u64) -> Option<u64> {
    // SAFETY: esp_timer_get_time is a monotonic read. Main-loop only.
    let now_us = || (unsafe { esp_timer_get_time() }) as u64;

    let deadline = now_us() + timeout_us;
    while !gpio_read(pin) {
        if now_us() > deadline {
            return None;
        }
    }
    let start = now_us();
    while gpio_read(pin) {
        if now_us() > deadline {
            return None;
        }
    }
    Some(now_us() - start)
}

#[cfg(not(target_os = "espidf"))]
pub fn pulse_in_us(_pin: i32, _timeout_us: u64) -> Option<u64> {
    None
}

// ── Microsecond delay (trigger pulse shaping) ─────────────────

#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: busy-wait ROM delay; bounded by the caller (≤ 10 µs).
    unsafe { esp_rom_delay_us(us) };
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(_us: u32) {}

// ── Servo LEDC ────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_servo_ledc() -> Result<(), HwInitError> {
    // 50 Hz, 14-bit: standard analog-servo frame with fine pulse control.
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    if unsafe { ledc_timer_config(&timer) } != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed);
    }

    let channel = ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: ledc_channel_t_LEDC_CHANNEL_0,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        gpio_num: pins::SERVO_PWM_GPIO,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    if unsafe { ledc_channel_config(&channel) } != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed);
    }

    info!("hw_init: servo LEDC configured (50 Hz, 14-bit)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set_servo(duty: u32) {
    // SAFETY: channel 0 was configured during init_servo_ledc(); duty
    // updates from the single main-loop context only.
    unsafe {
        ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_channel_t_LEDC_CHANNEL_0,
            duty,
        );
        ledc_update_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_channel_t_LEDC_CHANNEL_0,
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set_servo(_duty: u32) {}
