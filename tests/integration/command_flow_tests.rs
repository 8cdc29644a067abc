//! Command interpreter flows: authorization, dispatch, and the two-step
//! schedule entry conversation.

use petfeeder::app::messages;
use petfeeder::app::service::AppService;
use petfeeder::config::SystemConfig;

use crate::mock_hw::{CollectingSink, MockChat, MockClock, MockHardware, MockStorage};

const OPERATOR: &str = "777";
const STRANGER: &str = "999";

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
            clock: MockClock::synced_at(5, 8, 0),
            storage: MockStorage::new(),
            sink: CollectingSink::new(),
        }
    }

    fn send(&mut self, svc: &mut AppService, from: &str, text: &str) {
        self.chat.push_inbound(from, text);
        svc.tick(
            &mut self.hw,
            &self.clock,
            &mut self.chat,
            &mut self.storage,
            &mut self.sink,
        );
    }
}

// ── Authorization ─────────────────────────────────────────────

#[test]
fn unauthorized_chat_gets_rejection_and_no_mutation() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.send(&mut svc, STRANGER, "/makan");
    assert!(rig.chat.sent_to_contains(STRANGER, messages::UNAUTHORIZED));
    assert_eq!(rig.hw.dispenses, 0);
    assert_eq!(svc.total_feeds(), 0);

    rig.send(&mut svc, STRANGER, "/tambah_jadwal 08:00");
    assert!(svc.schedule().is_empty());
}

#[test]
fn pending_input_survives_stranger_traffic() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.send(&mut svc, OPERATOR, "/tambah_jadwal");
    assert!(svc.conversation().is_awaiting());

    // A stranger's message is rejected and does not clear the pending
    // input.
    rig.send(&mut svc, STRANGER, "10:00");
    assert!(rig.chat.sent_to_contains(STRANGER, messages::UNAUTHORIZED));
    assert!(svc.conversation().is_awaiting());
    assert!(svc.schedule().is_empty());

    // The operator's next message is still captured as time input.
    rig.send(&mut svc, OPERATOR, "10:00");
    assert_eq!(svc.schedule().len(), 1);
    assert!(!svc.conversation().is_awaiting());
}

// ── Two-step schedule entry ───────────────────────────────────

#[test]
fn prompted_add_accepts_padded_time() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.send(&mut svc, OPERATOR, "/tambah_jadwal");
    assert!(rig.chat.sent_to_contains(OPERATOR, "Send time in HH:MM"));

    rig.send(&mut svc, OPERATOR, "8:30");
    assert!(rig.chat.sent_to_contains(OPERATOR, "Schedule 08:30 added"));
    assert_eq!(svc.schedule().entries()[0].time.to_string(), "08:30");
}

#[test]
fn prompted_add_rejects_garbage_and_returns_to_idle() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.send(&mut svc, OPERATOR, "/tambah_jadwal");
    rig.send(&mut svc, OPERATOR, "banana");

    assert!(rig.chat.sent_to_contains(OPERATOR, "Invalid time format"));
    assert!(!svc.conversation().is_awaiting());
    assert!(svc.schedule().is_empty());

    // No retry loop: the next message is an ordinary command again.
    rig.send(&mut svc, OPERATOR, "/status");
    assert!(rig.chat.sent_to_contains(OPERATOR, "SYSTEM STATUS"));
}

#[test]
fn inline_add_rejects_duplicates_and_overflow() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.send(&mut svc, OPERATOR, "/tambah_jadwal 08:00");
    rig.send(&mut svc, OPERATOR, "/tambah_jadwal 08:00");
    assert!(rig.chat.sent_to_contains(OPERATOR, "already exists"));
    assert_eq!(svc.schedule().len(), 1);

    for h in 9..18u8 {
        rig.send(&mut svc, OPERATOR, &format!("/tambah_jadwal {h:02}:00"));
    }
    assert_eq!(svc.schedule().len(), 10);

    rig.send(&mut svc, OPERATOR, "/tambah_jadwal 20:00");
    assert!(rig.chat.sent_to_contains(OPERATOR, "full"));
    assert_eq!(svc.schedule().len(), 10);
}

// ── Listing and removal ───────────────────────────────────────

#[test]
fn list_remove_and_clear() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.send(&mut svc, OPERATOR, "/tambah_jadwal 08:00");
    rig.send(&mut svc, OPERATOR, "/tambah_jadwal 18:00");

    rig.send(&mut svc, OPERATOR, "/jadwal");
    assert!(rig.chat.sent_to_contains(OPERATOR, "1. 08:00 ✅"));
    assert!(rig.chat.sent_to_contains(OPERATOR, "2. 18:00 ✅"));

    rig.send(&mut svc, OPERATOR, "/hapus_jadwal 08:00");
    assert!(rig.chat.sent_to_contains(OPERATOR, "Schedule 08:00 removed"));
    assert_eq!(svc.schedule().len(), 1);

    rig.send(&mut svc, OPERATOR, "/hapus_jadwal 23:00");
    assert!(rig.chat.sent_to_contains(OPERATOR, "not found"));

    rig.send(&mut svc, OPERATOR, "/hapus_jadwal");
    assert!(rig.chat.sent_to_contains(OPERATOR, "All schedules cleared"));
    assert!(svc.schedule().is_empty());
}

// ── Reports ───────────────────────────────────────────────────

#[test]
fn status_reports_levels_time_and_totals() {
    let mut svc = service();
    let mut rig = Rig::new();
    svc.set_link_up(true);

    rig.send(&mut svc, OPERATOR, "/makan");
    rig.send(&mut svc, OPERATOR, "/status");

    assert!(rig.chat.sent_to_contains(OPERATOR, "Food: 80%"));
    assert!(rig.chat.sent_to_contains(OPERATOR, "Water: 80%"));
    assert!(rig.chat.sent_to_contains(OPERATOR, "Total feeds: 1"));
    assert!(rig.chat.sent_to_contains(OPERATOR, "08:00:00 05/01/1970"));
    assert!(rig.chat.sent_to_contains(OPERATOR, "Connected"));
}

#[test]
fn info_and_data_reports() {
    let mut svc = service();
    let mut rig = Rig::new();
    rig.hw.food_percent = 20;

    rig.send(&mut svc, OPERATOR, "/info_makan");
    assert!(rig.chat.sent_to_contains(OPERATOR, "Food Status"));
    assert!(rig.chat.sent_to_contains(OPERATOR, "LOW"));

    rig.send(&mut svc, OPERATOR, "/info_minum");
    assert!(rig.chat.sent_to_contains(OPERATOR, "Water Status"));
    assert!(rig.chat.sent_to_contains(OPERATOR, "Level OK"));

    rig.send(&mut svc, OPERATOR, "/data");
    assert!(rig.chat.sent_to_contains(OPERATOR, "DATA SUMMARY"));

    rig.send(&mut svc, OPERATOR, "/sysinfo");
    assert!(rig.chat.sent_to_contains(OPERATOR, "SYSTEM INFORMATION"));
}

// ── Dispatch details ──────────────────────────────────────────

#[test]
fn commands_are_case_insensitive() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.send(&mut svc, OPERATOR, "  /STATUS  ");
    assert!(rig.chat.sent_to_contains(OPERATOR, "SYSTEM STATUS"));
}

#[test]
fn emoji_labels_dispatch_like_slash_commands() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.send(&mut svc, OPERATOR, "🍽 Feed Now");
    assert_eq!(rig.hw.dispenses, 1);
}

#[test]
fn unknown_command_points_to_menu() {
    let mut svc = service();
    let mut rig = Rig::new();

    rig.send(&mut svc, OPERATOR, "what's up");
    assert!(rig.chat.sent_to_contains(OPERATOR, "Unknown command"));

    rig.send(&mut svc, OPERATOR, "/menu");
    assert!(rig.chat.sent_to_contains(OPERATOR, "HAMSTER FEEDER MENU"));

    rig.send(&mut svc, OPERATOR, "/help");
    assert!(rig.chat.sent_to_contains(OPERATOR, "USAGE GUIDE"));
}

#[test]
fn dropped_replies_do_not_stall_processing() {
    let mut svc = service();
    let mut rig = Rig::new();
    rig.chat.fail_sends = true;

    // The reply is lost but the feed still happens.
    rig.send(&mut svc, OPERATOR, "/makan");
    assert_eq!(rig.hw.dispenses, 1);
    assert_eq!(svc.total_feeds(), 1);
}
