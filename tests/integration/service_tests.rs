//! End-to-end service flows: scheduling, feeding, alerting, persistence.

use petfeeder::app::events::AppEvent;
use petfeeder::app::service::{AppService, SystemRequest};
use petfeeder::config::SystemConfig;
use petfeeder::datalog::FeedKind;

use crate::mock_hw::{CollectingSink, MockChat, MockClock, MockHardware, MockStorage};

const OPERATOR: &str = "777";
const COOLDOWN_MS: u64 = 1800 * 1000;
const QUIESCENCE_MS: u64 = 10 * 1000;

fn service() -> AppService {
    AppService::new(SystemConfig::default(), OPERATOR)
}

struct Rig {
    hw: MockHardware,
    chat: MockChat,
    clock: MockClock,
    storage: MockStorage,
    sink: CollectingSink,
}

impl Rig {
    fn new() -> Self {
        Self {
            hw: MockHardware::healthy(),
            chat: MockChat::new(),
            clock: MockClock::unsynced(),
            storage: MockStorage::new(),
            sink: CollectingSink::new(),
        }
    }

    fn tick(&mut self, svc: &mut AppService) -> petfeeder::app::service::TickOutcome {
        svc.tick(
            &mut self.hw,
            &self.clock,
            &mut self.chat,
            &mut self.storage,
            &mut self.sink,
        )
    }
}

// ── Scheduling ────────────────────────────────────────────────

#[test]
fn scheduled_feed_fires_once_per_day_and_rearms() {
    let mut svc = service();
    let mut rig = Rig::new();
    rig.clock = MockClock::synced_at(5, 8, 0);

    rig.chat.push_inbound(OPERATOR, "/tambah_jadwal 08:00");
    rig.tick(&mut svc);
    assert!(rig.chat.sent_to_contains(OPERATOR, "added successfully"));
    assert_eq!(rig.hw.dispenses, 0, "entry added after this tick's schedule pass");

    // Next ticks, still 08:00 on day 5: exactly one fire.
    rig.clock.uptime_ms += 5000;
    rig.tick(&mut svc);
    assert_eq!(rig.hw.dispenses, 1);
    assert!(rig.chat.sent_to_contains(OPERATOR, "Auto Feed Executed"));

    rig.clock.uptime_ms += 5000;
    rig.tick(&mut svc);
    assert_eq!(rig.hw.dispenses, 1, "same minute, same day — no refire");

    // Day 6, same minute: fires again.
    rig.clock.set_local(6, 8, 0);
    rig.clock.uptime_ms += 5000;
    rig.tick(&mut svc);
    assert_eq!(rig.hw.dispenses, 2);
    assert_eq!(svc.total_feeds(), 2);
}

#[test]
fn schedule_stays_dormant_without_time_sync() {
    let mut svc = service();
    let mut rig = Rig::new(); // clock unsynced

    rig.chat.push_inbound(OPERATOR, "/tambah_jadwal 08:00");
    rig.tick(&mut svc);
    for _ in 0..5 {
        rig.clock.uptime_ms += 5000;
        rig.tick(&mut svc);
    }
    assert_eq!(rig.hw.dispenses, 0);
}

#[test]
fn scheduled_feed_gate_blocks_on_low_food() {
    let mut svc = service();
    let mut rig = Rig::new();
    rig.clock = MockClock::synced_at(5, 8, 0);

    rig.chat.push_inbound(OPERATOR, "/tambah_jadwal 08:00");
    rig.tick(&mut svc);

    rig.hw.food_percent = 12; // below the schedule gate (15), above the floor
    rig.clock.uptime_ms += 5000;
    rig.tick(&mut svc);
    assert_eq!(rig.hw.dispenses, 0);

    // Refill within the same minute: the entry was left armed.
    rig.hw.food_percent = 80;
    rig.clock.uptime_ms += 5000;
    rig.tick(&mut svc);
    assert_eq!(rig.hw.dispenses, 1);
}

// ── Manual feeding ────────────────────────────────────────────

#[test]
fn feed_now_dispenses_and_replies() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.chat.push_inbound(OPERATOR, "/makan");
    let outcome = rig.tick(&mut svc);

    assert_eq!(outcome.inbound_messages, 1);
    assert_eq!(rig.hw.dispenses, 1);
    assert_eq!(svc.total_feeds(), 1);
    assert!(rig.chat.sent_to_contains(OPERATOR, "Feeding Successful"));
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::FeedExecuted { kind: FeedKind::Manual, .. })));
}

#[test]
fn feed_now_blocked_below_floor() {
    let mut svc = service();
    let mut rig = Rig::new();
    rig.hw.food_percent = 5;

    rig.chat.push_inbound(OPERATOR, "/makan");
    rig.tick(&mut svc);

    assert_eq!(rig.hw.dispenses, 0);
    assert_eq!(svc.total_feeds(), 0);
    assert!(rig.chat.sent_to_contains(OPERATOR, "Feeding Failed"));
    assert!(rig.chat.sent_to_contains(OPERATOR, "Food level too low"));
}

// ── Alerts through the chat channel ───────────────────────────

#[test]
fn warning_alert_reaches_operator_chat() {
    let mut svc = service();
    let mut rig = Rig::new();
    rig.clock.uptime_ms = COOLDOWN_MS; // past the boot suppression window
    rig.hw.food_percent = 20;

    rig.tick(&mut svc);

    assert!(rig.chat.sent_to_contains(OPERATOR, "Food Warning"));
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::AlertRaised(_))));
}

#[test]
fn cooldown_spaces_alerts_across_metrics() {
    let mut svc = service();
    let mut rig = Rig::new();
    rig.hw.food_percent = 5;
    rig.hw.water_percent = 5;

    rig.clock.uptime_ms = COOLDOWN_MS;
    rig.tick(&mut svc);
    let alerts_after_first: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::AlertRaised(_)))
        .collect();
    assert_eq!(alerts_after_first.len(), 1);

    // Second metric emits only after the cooldown elapses.
    rig.clock.uptime_ms = COOLDOWN_MS * 2;
    rig.tick(&mut svc);
    let total_alerts = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::AlertRaised(_)))
        .count();
    assert_eq!(total_alerts, 2);
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn feed_record_flushes_after_quiescence_and_reloads() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.chat.push_inbound(OPERATOR, "/makan");
    rig.clock.uptime_ms = 1000;
    rig.tick(&mut svc);
    assert_eq!(rig.storage.writes, 0, "inside the quiescence window");

    rig.clock.uptime_ms = QUIESCENCE_MS + 1000;
    rig.tick(&mut svc);
    assert_eq!(rig.storage.writes, 1);
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::RecordFlushed { total_feeds: 1 })));

    // A fresh boot restores the counters.
    let mut restored = service();
    restored.load_persisted(&rig.storage);
    assert_eq!(restored.total_feeds(), 1);
}

#[test]
fn corrupted_record_restores_as_zero() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.chat.push_inbound(OPERATOR, "/makan");
    rig.clock.uptime_ms = QUIESCENCE_MS;
    rig.tick(&mut svc);
    assert_eq!(rig.storage.writes, 1);

    rig.storage.record.as_mut().unwrap()[0] ^= 0xFF;

    let mut restored = service();
    restored.load_persisted(&rig.storage);
    assert_eq!(restored.total_feeds(), 0);
}

#[test]
fn failed_write_retries_next_cycle() {
    let mut svc = service();
    let mut rig = Rig::new();
    rig.storage.fail_writes = true;

    rig.chat.push_inbound(OPERATOR, "/makan");
    rig.clock.uptime_ms = QUIESCENCE_MS;
    rig.tick(&mut svc);
    assert_eq!(rig.storage.writes, 0);

    rig.storage.fail_writes = false;
    rig.clock.uptime_ms += 5000;
    rig.tick(&mut svc);
    assert_eq!(rig.storage.writes, 1);
}

// ── Reboot ────────────────────────────────────────────────────

#[test]
fn reboot_request_surfaces_to_driver_loop() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.chat.push_inbound(OPERATOR, "/reboot");
    let outcome = rig.tick(&mut svc);

    assert_eq!(outcome.system_request, Some(SystemRequest::Reboot));
    assert!(rig.chat.sent_to_contains(OPERATOR, "Rebooting"));
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::RebootRequested)));
}
