//! PetFeeder Firmware — Main Entry Point
//!
//! Hexagonal architecture around a fixed-period polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   TelegramAdapter   SntpClock   RtcStore      │
//! │  (Sensor+Dispense) (ChatPort)        (ClockPort) (StoragePort) │
//! │  WifiAdapter       LogEventSink                                │
//! │  (Connectivity)    (EventSink)                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Schedule · Alerts · FeedLog · Conversation            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  PowerPolicy (radio modes) · display panel (status lines)      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each iteration runs to completion: sensor refresh → alert
//! evaluation → schedule evaluation → command processing → record
//! flush.  Nothing blocks except the dispense motion and bounded
//! network retries.
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod alerts;
pub mod app;
pub mod clock;
pub mod config;
pub mod datalog;
pub mod power;
pub mod schedule;

pub mod error;
mod pins;

mod adapters;
mod drivers;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use adapters::rtc_store::RtcStore;
use adapters::sntp::SntpClock;
use adapters::telegram::TelegramAdapter;
use adapters::wifi::{ConnectivityPort, WifiAdapter};
use app::messages;
use app::ports::ClockPort;
use app::service::{AppService, SystemRequest};
use config::SystemConfig;
use drivers::servo::FeedServo;
use power::PowerPolicy;
use sensors::battery::BatteryMonitor;
use sensors::ultrasonic::UltrasonicSensor;
use sensors::SensorHub;

// ── Build-time provisioning ───────────────────────────────────
//
// Credentials are injected at build time; an unset variable leaves the
// device in offline mode (sensors and schedule still run once time
// syncs, but no chat).

const WIFI_SSID: &str = match option_env!("PETFEEDER_WIFI_SSID") {
    Some(v) => v,
    None => "",
};
const WIFI_PASSWORD: &str = match option_env!("PETFEEDER_WIFI_PASSWORD") {
    Some(v) => v,
    None => "",
};
const BOT_TOKEN: &str = match option_env!("PETFEEDER_BOT_TOKEN") {
    Some(v) => v,
    None => "",
};
const OPERATOR_CHAT_ID: &str = match option_env!("PETFEEDER_CHAT_ID") {
    Some(v) => v,
    None => "",
};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PetFeeder v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let config = SystemConfig::default();

    let hub = SensorHub::new(
        UltrasonicSensor::new(
            pins::FOOD_TRIG_GPIO,
            pins::FOOD_ECHO_GPIO,
            config.food_empty_distance_cm,
            config.full_distance_cm,
        ),
        UltrasonicSensor::new(
            pins::WATER_TRIG_GPIO,
            pins::WATER_ECHO_GPIO,
            config.water_empty_distance_cm,
            config.full_distance_cm,
        ),
        BatteryMonitor::new(0, &config), // ADC1 channel 0 = GPIO 36
    );
    let mut hw = HardwareAdapter::new(hub, FeedServo::new(&config));
    hw.park_servo();

    // ── 3. Connectivity ───────────────────────────────────────
    let mut wifi = WifiAdapter::new();
    {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::hal::peripherals::Peripherals;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;
        use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        let driver = BlockingWifi::wrap(
            EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
            sysloop,
        )?;
        wifi.attach(driver);
    }

    let online = if WIFI_SSID.is_empty() {
        warn!("No WiFi credentials baked in — running offline");
        false
    } else {
        match wifi
            .set_credentials(WIFI_SSID, WIFI_PASSWORD)
            .and_then(|()| wifi.connect())
        {
            Ok(()) => true,
            Err(e) => {
                warn!("WiFi bring-up failed ({e}), continuing offline");
                false
            }
        }
    };

    // ── 4. Clock, storage, service ────────────────────────────
    let mut clock = SntpClock::new();
    if online && !clock.resynchronize() {
        warn!("Initial time sync pending — schedules dormant until synced");
    }

    let mut storage = RtcStore::new();
    let mut chat = TelegramAdapter::new(BOT_TOKEN);
    let mut sink = LogEventSink::new();
    let mut power = PowerPolicy::new(&config);

    let mut service = AppService::new(config.clone(), OPERATOR_CHAT_ID);
    service.load_persisted(&storage);
    service.set_link_up(online);
    if online && !OPERATOR_CHAT_ID.is_empty() {
        service.announce_startup(&mut hw, &clock, &mut chat, &mut sink);
    }
    power.note_activity(clock.uptime_ms());

    // ── 5. Driver loop ────────────────────────────────────────
    let poll_ms = u64::from(config.poll_interval_ms);
    let display_every = (u64::from(config.display_update_interval_ms) / poll_ms).max(1);
    let resync_every_ms = u64::from(config.time_sync_interval_secs) * 1000;
    let mut last_resync_ms = clock.uptime_ms();
    let mut iteration: u64 = 0;

    loop {
        let loop_start_ms = clock.uptime_ms();
        iteration += 1;

        service.set_link_up(wifi.is_connected());
        let outcome = service.tick(&mut hw, &clock, &mut chat, &mut storage, &mut sink);

        // Operator traffic re-arms the activity window (and wakes the
        // radio if the policy had idled it).
        if outcome.inbound_messages > 0 && power.note_activity(loop_start_ms) {
            if let Err(e) = wifi.connect() {
                warn!("WiFi wake failed: {e}");
            }
        }

        if let Some(mode) = power.evaluate(service.snapshot().battery_percent, loop_start_ms) {
            wifi.apply_power_mode(mode);
        }

        // Status panel on its own cadence.
        if iteration % display_every == 0 {
            for line in messages::display_panel(&service.snapshot(), wifi.is_connected()).lines() {
                info!("PANEL | {line}");
            }
        }

        // Hourly wall-clock resync, non-blocking on failure.
        if loop_start_ms.saturating_sub(last_resync_ms) >= resync_every_ms {
            last_resync_ms = loop_start_ms;
            if !clock.resynchronize() {
                warn!("Time resync failed, will retry next interval");
            }
        }

        if outcome.system_request == Some(SystemRequest::Reboot) {
            info!("Rebooting on operator request");
            service.flush_before_shutdown(&clock, &mut storage);
            std::thread::sleep(std::time::Duration::from_secs(1));
            // SAFETY: esp_restart never returns; all state was flushed.
            unsafe { esp_idf_svc::sys::esp_restart() };
        }

        // Sleep out the remainder of the fixed period.
        let elapsed = clock.uptime_ms().saturating_sub(loop_start_ms);
        let remaining = poll_ms.saturating_sub(elapsed);
        if remaining > 0 {
            std::thread::sleep(std::time::Duration::from_millis(remaining));
        }
    }
}
