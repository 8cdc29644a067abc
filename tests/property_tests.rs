//! Property and fuzz-style tests for robustness of the core state machines.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use petfeeder::alerts::{Alert, AlertEngine, AlertSink};
use petfeeder::clock::{LocalTime, TimeOfDay};
use petfeeder::config::SystemConfig;
use petfeeder::schedule::FeedScheduler;
use petfeeder::sensors::battery::percent_from_volts;
use petfeeder::sensors::ultrasonic::percent_from_distance;
use petfeeder::sensors::SensorSnapshot;
use proptest::prelude::*;

// ── Time parsing ──────────────────────────────────────────────

proptest! {
    /// `HH:MM` strings parse exactly when both fields are in range.
    #[test]
    fn time_parse_matches_field_ranges(hour in 0u8..=99, minute in 0u8..=99) {
        let s = format!("{hour:02}:{minute:02}");
        let parsed = TimeOfDay::parse(&s);
        if hour <= 23 && minute <= 59 {
            let t = parsed.expect("in-range time must parse");
            prop_assert_eq!((t.hour, t.minute), (hour, minute));
            // Display round-trips.
            prop_assert_eq!(TimeOfDay::parse(&t.to_string()), Some(t));
        } else {
            prop_assert!(parsed.is_none());
        }
    }

    /// Arbitrary input never panics and never yields out-of-range fields.
    #[test]
    fn time_parse_total_on_arbitrary_input(s in ".{0,12}") {
        if let Some(t) = TimeOfDay::parse_normalized(&s) {
            prop_assert!(t.hour <= 23 && t.minute <= 59);
        }
    }

    /// Civil conversion always yields calendar-plausible fields.
    #[test]
    fn civil_conversion_stays_in_range(epoch in 0u64..=4_102_444_800, tz in -12i8..=14) {
        let lt = LocalTime::from_epoch(epoch, tz);
        prop_assert!((1..=12).contains(&lt.month));
        prop_assert!((1..=31).contains(&lt.day));
        prop_assert!(lt.hour <= 23 && lt.minute <= 59 && lt.second <= 59);
    }
}

// ── Sensor conversions ────────────────────────────────────────

proptest! {
    #[test]
    fn level_percent_is_always_bounded(d in -50.0f32..200.0, empty in 1.0f32..50.0, full in 0.0f32..10.0) {
        let p = percent_from_distance(d, empty, full);
        prop_assert!(p <= 100);
    }

    #[test]
    fn battery_percent_is_always_bounded(v in -5.0f32..20.0) {
        let p = percent_from_volts(v, 6.0, 8.4);
        prop_assert!((0.0..=100.0).contains(&p));
    }
}

// ── Schedule invariants ───────────────────────────────────────

proptest! {
    /// Whatever the operator types, the table never exceeds capacity,
    /// never holds duplicates, and never holds an invalid time.
    #[test]
    fn schedule_table_invariants(inputs in proptest::collection::vec(".{0,8}", 0..40)) {
        let mut sched = FeedScheduler::new();
        for raw in &inputs {
            let _ = sched.add(raw, true);
        }
        prop_assert!(sched.len() <= 10);
        let times: Vec<_> = sched.entries().iter().map(|e| e.time).collect();
        let mut deduped = times.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(times.len(), deduped.len(), "duplicate entries stored");
    }
}

// ── Alert pacing ──────────────────────────────────────────────

struct StampingSink<'a> {
    now_ms: u64,
    emitted: &'a mut Vec<u64>,
}

impl AlertSink for StampingSink<'_> {
    fn raise(&mut self, _alert: Alert) {
        self.emitted.push(self.now_ms);
    }
}

proptest! {
    /// However the levels move, no two alerts are ever emitted closer
    /// together than the cooldown.
    #[test]
    fn alerts_never_violate_cooldown(
        steps in proptest::collection::vec((0u8..=100, 0u8..=100, 0u16..=100, 1u64..=600_000), 1..60)
    ) {
        let config = SystemConfig::default();
        let cooldown_ms = u64::from(config.alert_cooldown_secs) * 1000;
        let mut engine = AlertEngine::new(&config);
        let mut emitted = Vec::new();
        let mut now_ms = 0u64;

        for (food, water, battery, dt) in steps {
            now_ms += dt;
            let snap = SensorSnapshot {
                food_percent: food,
                water_percent: water,
                battery_percent: f32::from(battery),
                battery_volts: 7.4,
            };
            let mut sink = StampingSink { now_ms, emitted: &mut emitted };
            engine.evaluate(&snap, now_ms, &mut sink);
        }

        for pair in emitted.windows(2) {
            prop_assert!(
                pair[1] - pair[0] >= cooldown_ms,
                "alerts {}ms apart, cooldown is {}ms",
                pair[1] - pair[0],
                cooldown_ms
            );
        }
    }
}
