//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production).  A future MQTT or
//! telemetry adapter would implement the same trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("EVENT | started"),
            AppEvent::FeedExecuted { kind, food_percent } => {
                info!("EVENT | feed executed ({:?}, food {}%)", kind, food_percent);
            }
            AppEvent::FeedBlocked { kind, blocked } => {
                info!("EVENT | feed blocked ({:?}: {})", kind, blocked);
            }
            AppEvent::ScheduleAdded(at) => info!("EVENT | schedule added {}", at),
            AppEvent::AlertRaised(alert) => info!("EVENT | alert {:?}", alert),
            AppEvent::RecordFlushed { total_feeds } => {
                info!("EVENT | record flushed (total {})", total_feeds);
            }
            AppEvent::RebootRequested => info!("EVENT | reboot requested"),
        }
    }
}
