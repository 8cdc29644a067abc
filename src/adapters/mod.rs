//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to                   |
//! |-------------|-------------------|-------------------------------|
//! | `hardware`  | SensorPort        | ultrasonic + battery ADC      |
//! |             | DispenserPort     | hopper gate servo             |
//! | `telegram`  | ChatPort          | Telegram bot HTTP API         |
//! | `sntp`      | ClockPort         | SNTP / system clock           |
//! | `rtc_store` | StoragePort       | RTC slow memory               |
//! | `log_sink`  | EventSink         | Serial log output             |
//! | `wifi`      | ConnectivityPort  | ESP-IDF WiFi STA              |

pub mod hardware;
pub mod log_sink;
pub mod rtc_store;
pub mod sntp;
pub mod telegram;
pub mod wifi;
