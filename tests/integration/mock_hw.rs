//! Mock port adapters for integration tests.
//!
//! Every adapter records its calls so tests can assert on the full
//! history without touching real GPIO, radio, or storage.

use std::collections::VecDeque;

use petfeeder::app::events::AppEvent;
use petfeeder::app::ports::{
    ChatError, ChatPort, ClockPort, DispenserPort, EventSink, InboundMessage, SensorPort,
    StorageError, StoragePort, TextFormat,
};
use petfeeder::sensors::SensorSnapshot;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub food_percent: u8,
    pub water_percent: u8,
    pub battery_percent: f32,
    pub battery_volts: f32,
    pub dispenses: u32,
}

impl MockHardware {
    pub fn healthy() -> Self {
        Self {
            food_percent: 80,
            water_percent: 80,
            battery_percent: 90.0,
            battery_volts: 8.1,
            dispenses: 0,
        }
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            food_percent: self.food_percent,
            water_percent: self.water_percent,
            battery_percent: self.battery_percent,
            battery_volts: self.battery_volts,
        }
    }
}

impl DispenserPort for MockHardware {
    fn dispense_once(&mut self) {
        self.dispenses += 1;
    }
}

// ── MockChat ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: String,
    pub text: String,
    #[allow(dead_code)]
    pub format: TextFormat,
}

pub struct MockChat {
    pub sent: Vec<SentMessage>,
    inbound: VecDeque<Vec<InboundMessage>>,
    pub fail_sends: bool,
}

impl MockChat {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            inbound: VecDeque::new(),
            fail_sends: false,
        }
    }

    /// Queue one inbound message as its own poll batch.
    pub fn push_inbound(&mut self, chat_id: &str, text: &str) {
        self.inbound.push_back(vec![InboundMessage {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        }]);
    }

    /// True if any sent message to `chat_id` contains `needle`.
    pub fn sent_to_contains(&self, chat_id: &str, needle: &str) -> bool {
        self.sent
            .iter()
            .any(|m| m.chat_id == chat_id && m.text.contains(needle))
    }
}

impl ChatPort for MockChat {
    fn send_text(
        &mut self,
        chat_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<(), ChatError> {
        if self.fail_sends {
            return Err(ChatError::SendFailed);
        }
        self.sent.push(SentMessage {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            format,
        });
        Ok(())
    }

    fn poll_inbound(&mut self) -> Vec<InboundMessage> {
        self.inbound.pop_front().unwrap_or_default()
    }
}

// ── MockClock ─────────────────────────────────────────────────

pub struct MockClock {
    pub epoch_secs: Option<u64>,
    pub uptime_ms: u64,
}

/// Default config timezone (UTC+8) baked into the helper.
const TZ_OFFSET_SECS: u64 = 8 * 3600;

/// Epoch seconds that render as `day` of January 1970, `hh:mm` local
/// time under the default timezone offset.
pub fn epoch_for(day: u8, hh: u8, mm: u8) -> u64 {
    u64::from(day - 1) * 86_400 + u64::from(hh) * 3600 + u64::from(mm) * 60 - TZ_OFFSET_SECS
}

impl MockClock {
    pub fn unsynced() -> Self {
        Self {
            epoch_secs: None,
            uptime_ms: 0,
        }
    }

    pub fn synced_at(day: u8, hh: u8, mm: u8) -> Self {
        Self {
            epoch_secs: Some(epoch_for(day, hh, mm)),
            uptime_ms: 0,
        }
    }

    pub fn set_local(&mut self, day: u8, hh: u8, mm: u8) {
        self.epoch_secs = Some(epoch_for(day, hh, mm));
    }
}

impl ClockPort for MockClock {
    fn epoch_secs(&self) -> Option<u64> {
        self.epoch_secs
    }

    fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }

    fn resynchronize(&mut self) -> bool {
        self.epoch_secs.is_some()
    }
}

// ── MockStorage ───────────────────────────────────────────────

pub struct MockStorage {
    pub record: Option<Vec<u8>>,
    pub fail_writes: bool,
    pub writes: usize,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            record: None,
            fail_writes: false,
            writes: 0,
        }
    }
}

impl StoragePort for MockStorage {
    fn write_record(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.record = Some(bytes.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn read_record(&self, buf: &mut [u8]) -> Result<usize, StorageError> {
        match &self.record {
            Some(r) => {
                if r.len() > buf.len() {
                    return Err(StorageError::TooLarge);
                }
                buf[..r.len()].copy_from_slice(r);
                Ok(r.len())
            }
            None => Err(StorageError::NotFound),
        }
    }
}

// ── CollectingSink ────────────────────────────────────────────

pub struct CollectingSink {
    pub events: Vec<AppEvent>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
