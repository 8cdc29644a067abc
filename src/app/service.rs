//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the schedule executor, alert engine, feed log,
//! and conversation state.  It exposes a clean, hardware-agnostic API.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!    ChatPort ◀──▶ │        AppService          │
//! DispenserPort ◀──│ Schedule · Alerts · Log    │
//!  StoragePort ◀──▶│ Conversation · Feed action │
//!                  └────────────────────────────┘
//! ```
//!
//! One `tick()` runs the full decision pipeline in a fixed order —
//! sensor refresh, alert evaluation, schedule evaluation, command
//! processing, record flush — so all three decision components observe
//! the same sensor snapshot for the iteration.

use log::{info, warn};

use crate::alerts::{Alert, AlertEngine, AlertSink};
use crate::app::commands::{self, Command};
use crate::app::conversation::ConversationState;
use crate::app::events::AppEvent;
use crate::app::messages;
use crate::app::ports::{
    ChatPort, ClockPort, DispenserPort, EventSink, InboundMessage, SensorPort, StoragePort,
    TextFormat,
};
use crate::clock::{LocalTime, TimeOfDay};
use crate::config::SystemConfig;
use crate::datalog::{FeedKind, FeedLog};
use crate::error::FeedBlocked;
use crate::schedule::{FeedDelegate, FeedScheduler, ScheduleError};
use crate::sensors::SensorSnapshot;

// ───────────────────────────────────────────────────────────────
// Outcomes
// ───────────────────────────────────────────────────────────────

/// Actions only the driver loop may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemRequest {
    /// Operator-requested restart.
    Reboot,
}

/// What one tick produced, for the driver loop.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub system_request: Option<SystemRequest>,
    /// Inbound messages processed this tick (drives the activity-based
    /// power policy).
    pub inbound_messages: usize,
}

// ───────────────────────────────────────────────────────────────
// Shared feed action
// ───────────────────────────────────────────────────────────────

/// The shared feed action, invoked by both the schedule executor and
/// the command interpreter.
///
/// Guard: refuses below the absolute food floor, with no side effect.
/// On success the dispense and the counter increment are inseparable —
/// there is no path where one happens without the other.
pub fn execute_feed(
    kind: FeedKind,
    snap: &SensorSnapshot,
    config: &SystemConfig,
    dispenser: &mut impl DispenserPort,
    log: &mut FeedLog,
    at_label: &str,
) -> Result<(), FeedBlocked> {
    if snap.food_percent < config.feed_floor_percent {
        return Err(FeedBlocked::FoodTooLow);
    }
    dispenser.dispense_once();
    log.record_feed(kind, at_label);
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Internal port adapters
// ───────────────────────────────────────────────────────────────

/// Routes engine alerts to the operator chat and the event sink.
struct ChatAlertSink<'a, C: ChatPort, E: EventSink> {
    chat: &'a mut C,
    events: &'a mut E,
    operator: &'a str,
}

impl<C: ChatPort, E: EventSink> AlertSink for ChatAlertSink<'_, C, E> {
    fn raise(&mut self, alert: Alert) {
        let text = messages::alert_text(&alert);
        if let Err(e) = self.chat.send_text(self.operator, &text, TextFormat::Markdown) {
            warn!("Alert delivery failed: {e}");
        }
        self.events.emit(&AppEvent::AlertRaised(alert));
    }
}

/// Runs the shared feed action for due schedule entries.
struct ScheduledFeedDelegate<'a, D: DispenserPort, C: ChatPort, E: EventSink> {
    dispenser: &'a mut D,
    chat: &'a mut C,
    events: &'a mut E,
    log: &'a mut FeedLog,
    config: &'a SystemConfig,
    operator: &'a str,
    snap: SensorSnapshot,
}

impl<D: DispenserPort, C: ChatPort, E: EventSink> FeedDelegate
    for ScheduledFeedDelegate<'_, D, C, E>
{
    fn scheduled_feed(&mut self, at: TimeOfDay) -> bool {
        match execute_feed(
            FeedKind::Auto,
            &self.snap,
            self.config,
            self.dispenser,
            self.log,
            &at.to_string(),
        ) {
            Ok(()) => {
                info!("Auto feed executed for schedule {at}");
                self.events.emit(&AppEvent::FeedExecuted {
                    kind: FeedKind::Auto,
                    food_percent: self.snap.food_percent,
                });
                let text = messages::auto_feed_notification(at, self.snap.food_percent);
                if let Err(e) = self.chat.send_text(self.operator, &text, TextFormat::Markdown) {
                    warn!("Auto feed notification failed: {e}");
                }
                true
            }
            Err(blocked) => {
                warn!("Auto feed blocked: {blocked}");
                self.events.emit(&AppEvent::FeedBlocked {
                    kind: FeedKind::Auto,
                    blocked,
                });
                false
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    authorized_chat: String,
    schedule: FeedScheduler,
    alerts: AlertEngine,
    log: FeedLog,
    conversation: ConversationState,
    last_snapshot: SensorSnapshot,
    link_up: bool,
}

impl AppService {
    /// Construct the service.  Call [`load_persisted`](Self::load_persisted)
    /// next, before the first tick.
    pub fn new(config: SystemConfig, authorized_chat: &str) -> Self {
        let alerts = AlertEngine::new(&config);
        let log = FeedLog::new(config.record_quiescence_secs);
        Self {
            config,
            authorized_chat: authorized_chat.to_string(),
            schedule: FeedScheduler::new(),
            alerts,
            log,
            conversation: ConversationState::new(),
            last_snapshot: SensorSnapshot::default(),
            link_up: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Restore the feed counters from storage.  Called exactly once at
    /// startup, before any other component reads them.
    pub fn load_persisted(&mut self, storage: &impl StoragePort) {
        self.log.load(storage);
    }

    /// Read sensors and announce the device to the operator chat.
    pub fn announce_startup(
        &mut self,
        hw: &mut impl SensorPort,
        clock: &impl ClockPort,
        chat: &mut impl ChatPort,
        sink: &mut impl EventSink,
    ) {
        self.last_snapshot = hw.read_all();
        let text = messages::startup_notification(
            &self.time_string(clock),
            self.last_snapshot.battery_percent,
        );
        reply(chat, &self.authorized_chat, &text, TextFormat::Markdown);
        sink.emit(&AppEvent::Started);
        info!("AppService started");
    }

    /// Driver loop reports the network link state for status texts.
    pub fn set_link_up(&mut self, up: bool) {
        self.link_up = up;
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full decision cycle: sensors → alerts → schedule →
    /// commands → flush.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + DispenserPort),
        clock: &impl ClockPort,
        chat: &mut impl ChatPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        let now_ms = clock.uptime_ms();

        // 1. Sensor refresh — the snapshot every component sees this tick.
        let snap = hw.read_all();
        self.last_snapshot = snap;

        // 2. Alert evaluation.
        {
            let Self {
                alerts,
                authorized_chat,
                ..
            } = self;
            let mut alert_sink = ChatAlertSink {
                chat: &mut *chat,
                events: &mut *sink,
                operator: authorized_chat,
            };
            alerts.evaluate(&snap, now_ms, &mut alert_sink);
        }

        // 3. Schedule evaluation — needs a synced wall clock.
        if let Some(local) = self.local_time(clock) {
            let Self {
                schedule,
                log,
                config,
                authorized_chat,
                ..
            } = self;
            let config: &SystemConfig = config;
            let mut delegate = ScheduledFeedDelegate {
                dispenser: &mut *hw,
                chat: &mut *chat,
                events: &mut *sink,
                log,
                config,
                operator: authorized_chat,
                snap,
            };
            schedule.tick(local.time_of_day(), local.day, &snap, config, &mut delegate);
        }

        // 4. Command processing — drain the channel completely.
        let mut outcome = TickOutcome::default();
        loop {
            let batch = chat.poll_inbound();
            if batch.is_empty() {
                break;
            }
            for msg in &batch {
                outcome.inbound_messages += 1;
                if let Some(req) = self.handle_message(msg, hw, clock, chat, sink) {
                    outcome.system_request = Some(req);
                }
            }
        }

        // 5. Opportunistic record flush.
        if self.log.flush(now_ms, storage) {
            sink.emit(&AppEvent::RecordFlushed {
                total_feeds: self.log.total_feeds(),
            });
        }

        outcome
    }

    // ── Message handling ──────────────────────────────────────

    /// Route one inbound message: authorization, then either the
    /// pending-input capture or the command dispatch table.
    pub fn handle_message(
        &mut self,
        msg: &InboundMessage,
        hw: &mut (impl SensorPort + DispenserPort),
        clock: &impl ClockPort,
        chat: &mut impl ChatPort,
        sink: &mut impl EventSink,
    ) -> Option<SystemRequest> {
        if msg.chat_id != self.authorized_chat {
            warn!("Unauthorized message from chat {}", msg.chat_id);
            reply(chat, &msg.chat_id, messages::UNAUTHORIZED, TextFormat::Plain);
            return None;
        }

        info!("Command from operator: [{}]", msg.text.trim());

        // A pending time entry captures the bound chat's next message,
        // whatever it says.
        if self.conversation.claims(&msg.chat_id) {
            self.conversation.reset();
            self.add_schedule_and_reply(&msg.text, &msg.chat_id, chat, sink);
            return None;
        }

        match commands::parse(&msg.text) {
            Command::Menu => {
                reply(chat, &msg.chat_id, &messages::menu_text(), TextFormat::Markdown);
            }
            Command::Status => {
                self.last_snapshot = hw.read_all();
                let text = messages::status_text(
                    &self.last_snapshot,
                    &self.time_string(clock),
                    self.link_up,
                    self.log.total_feeds(),
                    &self.config,
                );
                reply(chat, &msg.chat_id, &text, TextFormat::Markdown);
            }
            Command::FeedNow => {
                // Fresh read: never dispense on a stale cached level.
                self.last_snapshot = hw.read_all();
                let label = self.time_label(clock);
                let result = execute_feed(
                    FeedKind::Manual,
                    &self.last_snapshot,
                    &self.config,
                    hw,
                    &mut self.log,
                    &label,
                );
                let text = match result {
                    Ok(()) => {
                        sink.emit(&AppEvent::FeedExecuted {
                            kind: FeedKind::Manual,
                            food_percent: self.last_snapshot.food_percent,
                        });
                        messages::feeding_result(true, None, self.last_snapshot.food_percent)
                    }
                    Err(blocked) => {
                        sink.emit(&AppEvent::FeedBlocked {
                            kind: FeedKind::Manual,
                            blocked,
                        });
                        messages::feeding_result(
                            false,
                            Some(blocked.reason()),
                            self.last_snapshot.food_percent,
                        )
                    }
                };
                reply(chat, &msg.chat_id, &text, TextFormat::Markdown);
            }
            Command::FoodInfo => {
                self.last_snapshot = hw.read_all();
                let text = messages::food_info(&self.last_snapshot, &self.config);
                reply(chat, &msg.chat_id, &text, TextFormat::Markdown);
            }
            Command::WaterInfo => {
                self.last_snapshot = hw.read_all();
                let text = messages::water_info(&self.last_snapshot, &self.config);
                reply(chat, &msg.chat_id, &text, TextFormat::Markdown);
            }
            Command::ListSchedule => {
                reply(chat, &msg.chat_id, &self.schedule.list(), TextFormat::Plain);
            }
            Command::AddSchedule(Some(raw)) => {
                self.add_schedule_and_reply(&raw, &msg.chat_id, chat, sink);
            }
            Command::AddSchedule(None) => {
                self.conversation.begin_time_entry(&msg.chat_id);
                reply(chat, &msg.chat_id, &messages::prompt_time_input(), TextFormat::Markdown);
            }
            Command::RemoveSchedule(Some(raw)) => {
                let text = match TimeOfDay::parse_normalized(&raw) {
                    Some(t) => {
                        if self.schedule.remove_time(t) {
                            messages::schedule_removed(t)
                        } else {
                            messages::schedule_remove_failed()
                        }
                    }
                    None => messages::invalid_time_reply(),
                };
                reply(chat, &msg.chat_id, &text, TextFormat::Plain);
            }
            Command::RemoveSchedule(None) => {
                self.schedule.clear();
                reply(chat, &msg.chat_id, &messages::schedules_cleared(), TextFormat::Plain);
            }
            Command::Logs => {
                let text = self.log.summary(&self.last_snapshot);
                reply(chat, &msg.chat_id, &text, TextFormat::Markdown);
            }
            Command::SystemInfo => {
                let text =
                    messages::system_info(clock.uptime_ms() / 1000, self.schedule.len());
                reply(chat, &msg.chat_id, &text, TextFormat::Plain);
            }
            Command::Reboot => {
                reply(chat, &msg.chat_id, &messages::reboot_farewell(), TextFormat::Plain);
                sink.emit(&AppEvent::RebootRequested);
                return Some(SystemRequest::Reboot);
            }
            Command::Help => {
                reply(chat, &msg.chat_id, &messages::help_text(), TextFormat::Markdown);
            }
            Command::Unknown => {
                reply(chat, &msg.chat_id, &messages::unknown_command(), TextFormat::Plain);
            }
        }

        None
    }

    // ── Queries ───────────────────────────────────────────────

    /// The snapshot every decision component saw this iteration.
    pub fn snapshot(&self) -> SensorSnapshot {
        self.last_snapshot
    }

    pub fn schedule(&self) -> &FeedScheduler {
        &self.schedule
    }

    pub fn total_feeds(&self) -> u32 {
        self.log.total_feeds()
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Persist the record now, ignoring quiescence.  Driver loop calls
    /// this before a deliberate reboot.
    pub fn flush_before_shutdown(&mut self, clock: &impl ClockPort, storage: &mut impl StoragePort) {
        if self.log.force_flush(clock.uptime_ms(), storage) {
            info!("Feed record force-flushed before shutdown");
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn add_schedule_and_reply(
        &mut self,
        raw: &str,
        chat_id: &str,
        chat: &mut impl ChatPort,
        sink: &mut impl EventSink,
    ) {
        let text = match self.schedule.add(raw, true) {
            Ok(t) => {
                sink.emit(&AppEvent::ScheduleAdded(t));
                messages::schedule_added(t)
            }
            Err(ScheduleError::InvalidTime) => messages::invalid_time_reply(),
            Err(e) => messages::schedule_add_failed(&e.to_string()),
        };
        reply(chat, chat_id, &text, TextFormat::Markdown);
    }

    fn local_time(&self, clock: &impl ClockPort) -> Option<LocalTime> {
        clock
            .epoch_secs()
            .map(|e| LocalTime::from_epoch(e, self.config.timezone_offset_hours))
    }

    /// Full timestamp, or a placeholder before the first sync.
    fn time_string(&self, clock: &impl ClockPort) -> String {
        match self.local_time(clock) {
            Some(lt) => lt.to_string(),
            None => "time not synced".to_string(),
        }
    }

    /// Minute-resolution label for feed records.
    fn time_label(&self, clock: &impl ClockPort) -> String {
        match self.local_time(clock) {
            Some(lt) => lt.time_of_day().to_string(),
            None => "--:--".to_string(),
        }
    }
}

/// Send a reply, demoting transport failures to a log line — a dropped
/// reply must never take down the control loop.
fn reply(chat: &mut impl ChatPort, chat_id: &str, text: &str, format: TextFormat) {
    if let Err(e) = chat.send_text(chat_id, text, format) {
        warn!("Reply to {chat_id} failed: {e}");
    }
}
