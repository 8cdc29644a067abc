//! Feed schedule executor.
//!
//! Holds the ordered set of time-of-day entries and fires each one at
//! most once per calendar day.  The executor notifies a [`FeedDelegate`]
//! when an entry is due; the application service implements the delegate
//! to run the shared feed action.  The executor itself never touches
//! hardware, which keeps it independently testable.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  FeedScheduler.tick(now, today, snapshot)               │
//! │                                                         │
//! │  entry.time == now  ──▶  gate: food + battery  ──▶      │
//! │                          FeedDelegate.scheduled_feed()  │
//! │                                                         │
//! │  entry.last_run_day != today  ──▶  re-arm for the day   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The once-per-day guarantee rests on comparing a stored day-of-month
//! against the current one — no midnight timer.  This assumes the day
//! value is monotonically non-decreasing during normal operation; a
//! large backward clock correction can re-fire an entry within the same
//! nominal day.

use heapless::Vec;
use log::{info, warn};

use crate::clock::TimeOfDay;
use crate::config::SystemConfig;
use crate::sensors::SensorSnapshot;

/// Maximum number of schedule entries (stack-allocated).
pub const MAX_SCHEDULES: usize = 10;

// ═══════════════════════════════════════════════════════════════
//  Entry and error types
// ═══════════════════════════════════════════════════════════════

/// A single feed schedule entry.
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    /// Minute-resolution firing time.
    pub time: TimeOfDay,
    /// Whether this entry is currently enabled.
    pub enabled: bool,
    /// Set when the entry has fired on the current calendar day.
    executed_today: bool,
    /// Day-of-month of the last successful fire (0 = never).
    last_run_day: u8,
}

impl ScheduleEntry {
    pub fn executed_today(&self) -> bool {
        self.executed_today
    }
}

/// Why an add was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// Input did not normalize to a valid `HH:MM` time.
    InvalidTime,
    /// An entry with the same time already exists.
    Duplicate,
    /// The schedule table is at capacity.
    Full,
}

impl core::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidTime => write!(f, "invalid time format"),
            Self::Duplicate => write!(f, "schedule already exists"),
            Self::Full => write!(f, "schedule table full ({MAX_SCHEDULES} max)"),
        }
    }
}

/// Callback trait the executor invokes when an entry is due.
///
/// The implementation runs the shared feed action and reports whether
/// the feed actually happened.  A `false` return leaves the entry
/// un-marked, so it is retried on every tick within the matching minute
/// and then missed for the day.
pub trait FeedDelegate {
    fn scheduled_feed(&mut self, at: TimeOfDay) -> bool;
}

// ═══════════════════════════════════════════════════════════════
//  Executor
// ═══════════════════════════════════════════════════════════════

/// The schedule executor.
pub struct FeedScheduler {
    entries: Vec<ScheduleEntry, MAX_SCHEDULES>,
}

impl FeedScheduler {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry from operator input.  The raw text is normalized
    /// (trimmed, single-digit hour padded) and validated before the
    /// duplicate and capacity checks.
    pub fn add(&mut self, raw: &str, enabled: bool) -> Result<TimeOfDay, ScheduleError> {
        let time = TimeOfDay::parse_normalized(raw).ok_or(ScheduleError::InvalidTime)?;

        if self.entries.iter().any(|e| e.time == time) {
            warn!("Schedule {time} already present, not added");
            return Err(ScheduleError::Duplicate);
        }

        self.entries
            .push(ScheduleEntry {
                time,
                enabled,
                executed_today: false,
                last_run_day: 0,
            })
            .map_err(|_| ScheduleError::Full)?;

        info!("Schedule {time} added (enabled={enabled})");
        Ok(time)
    }

    /// Remove the entry at `index` (0-based), compacting the table.
    pub fn remove_at(&mut self, index: usize) -> Option<TimeOfDay> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        info!("Schedule {} removed", entry.time);
        Some(entry.time)
    }

    /// Remove the entry with the given time.  Returns whether one existed.
    pub fn remove_time(&mut self, time: TimeOfDay) -> bool {
        match self.entries.iter().position(|e| e.time == time) {
            Some(i) => {
                self.entries.remove(i);
                info!("Schedule {time} removed");
                true
            }
            None => false,
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        info!("All schedules cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Operator-facing listing: one numbered line per entry.
    pub fn list(&self) -> String {
        let mut out = String::from("📆 Feed Schedule:\n");
        if self.entries.is_empty() {
            out.push_str("- No schedule -\n");
            return out;
        }
        for (i, entry) in self.entries.iter().enumerate() {
            let marker = if entry.enabled { "✅" } else { "❌" };
            out.push_str(&format!("{}. {} {}\n", i + 1, entry.time, marker));
        }
        out
    }

    /// Evaluate every entry against the current minute and calendar day.
    ///
    /// Entries are visited in insertion order; every entry matching the
    /// current minute fires independently.  The feed is gated on minimum
    /// food and battery levels — a failed gate leaves the entry un-marked
    /// so it retries while the minute lasts.
    pub fn tick(
        &mut self,
        now: TimeOfDay,
        today: u8,
        snap: &SensorSnapshot,
        config: &SystemConfig,
        delegate: &mut dyn FeedDelegate,
    ) {
        for entry in self.entries.iter_mut() {
            if entry.enabled
                && entry.time == now
                && (!entry.executed_today || entry.last_run_day != today)
            {
                let gate_ok = snap.food_percent > config.food_critical_percent
                    && snap.battery_percent > config.battery_low_percent;

                if gate_ok {
                    if delegate.scheduled_feed(entry.time) {
                        entry.executed_today = true;
                        entry.last_run_day = today;
                    }
                } else {
                    warn!(
                        "Schedule {}: gate blocked (food {}%, battery {:.0}%)",
                        entry.time, snap.food_percent, snap.battery_percent
                    );
                }
            }

            // Re-arm once the stored day falls behind the calendar.
            if entry.last_run_day != today {
                entry.executed_today = false;
            }
        }
    }
}

impl Default for FeedScheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
