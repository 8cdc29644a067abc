//! Threshold alert engine.
//!
//! Runs **every tick after the sensor refresh** and turns noisy level
//! crossings into de-duplicated, rate-limited notifications.  Per
//! monitored metric (food, water, battery) the engine keeps a
//! warning/critical flag pair; a notification is emitted only on the
//! first crossing into a severity band, and the flags clear only once
//! the metric recovers past the threshold plus a hysteresis margin.
//!
//! ## Alert lifecycle
//!
//! 1. A level crosses into warning or critical territory.
//! 2. The engine emits one [`Alert`] through the [`AlertSink`] and
//!    latches the band flag.
//! 3. Repeat crossings are silent while the flag is latched.
//! 4. Recovery past threshold + margin unlatches both flags, silently.
//!
//! A single timestamp is shared across all metrics: only one alert of
//! any kind can be emitted per cooldown period.  The timestamp starts
//! at zero, so nothing can alert during the first cooldown window after
//! boot.

use log::info;

use crate::config::SystemConfig;
use crate::sensors::SensorSnapshot;

// ═══════════════════════════════════════════════════════════════
//  Classification and alert types
// ═══════════════════════════════════════════════════════════════

/// Severity band for a container level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelBand {
    Normal,
    Warning,
    Critical,
}

/// Band classification for food/water levels (inclusive thresholds).
pub fn classify(level: u8, warning: u8, critical: u8) -> LevelBand {
    if level <= critical {
        LevelBand::Critical
    } else if level <= warning {
        LevelBand::Warning
    } else {
        LevelBand::Normal
    }
}

/// A notification-worthy threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    Food { percent: u8, critical: bool },
    Water { percent: u8, critical: bool },
    Battery { percent: f32, critical: bool },
}

/// Receives emitted alerts.  The application service implements this to
/// forward alerts to the chat channel and the event sink.
pub trait AlertSink {
    fn raise(&mut self, alert: Alert);
}

// ═══════════════════════════════════════════════════════════════
//  Engine
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default)]
struct MetricFlags {
    warning: bool,
    critical: bool,
}

impl MetricFlags {
    fn clear(&mut self) {
        self.warning = false;
        self.critical = false;
    }
}

/// The alert engine.  Flags are never persisted — a restart starts clean.
pub struct AlertEngine {
    food: MetricFlags,
    water: MetricFlags,
    battery: MetricFlags,
    /// Shared across all metrics; 0 = no alert emitted since boot.
    last_alert_ms: u64,
    cooldown_ms: u64,

    food_warning: u8,
    food_critical: u8,
    water_warning: u8,
    water_critical: u8,
    battery_low: f32,
    battery_critical: f32,
    level_hysteresis: u8,
    battery_hysteresis: f32,
}

impl AlertEngine {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            food: MetricFlags::default(),
            water: MetricFlags::default(),
            battery: MetricFlags::default(),
            last_alert_ms: 0,
            cooldown_ms: u64::from(config.alert_cooldown_secs) * 1000,
            food_warning: config.food_warning_percent,
            food_critical: config.food_critical_percent,
            water_warning: config.water_warning_percent,
            water_critical: config.water_critical_percent,
            battery_low: config.battery_low_percent,
            battery_critical: config.battery_critical_percent,
            level_hysteresis: config.level_hysteresis_percent,
            battery_hysteresis: config.battery_hysteresis_percent,
        }
    }

    /// Evaluate all metrics against the latest snapshot.
    ///
    /// Skipped entirely while the cooldown is active — including the
    /// recovery clearing, which matches the per-tick cadence the flags
    /// were designed around.
    pub fn evaluate(&mut self, snap: &SensorSnapshot, now_ms: u64, sink: &mut dyn AlertSink) {
        if self.cooldown_active(now_ms) {
            return;
        }

        self.check_food(snap.food_percent, now_ms, sink);
        self.check_water(snap.water_percent, now_ms, sink);
        self.check_battery(snap.battery_percent, now_ms, sink);
    }

    /// True while a previously emitted alert still blocks new ones.
    fn cooldown_active(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_alert_ms) < self.cooldown_ms
    }

    // ── Per-metric checks ─────────────────────────────────────

    fn check_food(&mut self, level: u8, now_ms: u64, sink: &mut dyn AlertSink) {
        let band = classify(level, self.food_warning, self.food_critical);

        if band == LevelBand::Critical && !self.food.critical {
            if self.cooldown_active(now_ms) {
                return;
            }
            sink.raise(Alert::Food {
                percent: level,
                critical: true,
            });
            self.food.critical = true;
            self.last_alert_ms = now_ms;
        } else if band == LevelBand::Warning && !self.food.warning && !self.food.critical {
            if self.cooldown_active(now_ms) {
                return;
            }
            sink.raise(Alert::Food {
                percent: level,
                critical: false,
            });
            self.food.warning = true;
            self.last_alert_ms = now_ms;
        } else if u16::from(level) > u16::from(self.food_warning) + u16::from(self.level_hysteresis)
        {
            if self.food.warning || self.food.critical {
                info!("Food level recovered ({level}%), alert flags cleared");
            }
            self.food.clear();
        }
    }

    fn check_water(&mut self, level: u8, now_ms: u64, sink: &mut dyn AlertSink) {
        let band = classify(level, self.water_warning, self.water_critical);

        if band == LevelBand::Critical && !self.water.critical {
            if self.cooldown_active(now_ms) {
                return;
            }
            sink.raise(Alert::Water {
                percent: level,
                critical: true,
            });
            self.water.critical = true;
            self.last_alert_ms = now_ms;
        } else if band == LevelBand::Warning && !self.water.warning && !self.water.critical {
            if self.cooldown_active(now_ms) {
                return;
            }
            sink.raise(Alert::Water {
                percent: level,
                critical: false,
            });
            self.water.warning = true;
            self.last_alert_ms = now_ms;
        } else if u16::from(level)
            > u16::from(self.water_warning) + u16::from(self.level_hysteresis)
        {
            if self.water.warning || self.water.critical {
                info!("Water level recovered ({level}%), alert flags cleared");
            }
            self.water.clear();
        }
    }

    /// Battery uses strict `<` comparisons, and critical latches the
    /// warning flag too — unlike food/water, where the critical flag
    /// stands alone.
    fn check_battery(&mut self, percent: f32, now_ms: u64, sink: &mut dyn AlertSink) {
        if percent < self.battery_critical && !self.battery.critical {
            if self.cooldown_active(now_ms) {
                return;
            }
            sink.raise(Alert::Battery {
                percent,
                critical: true,
            });
            self.battery.critical = true;
            self.battery.warning = true;
            self.last_alert_ms = now_ms;
        } else if percent < self.battery_low && !self.battery.warning && !self.battery.critical {
            if self.cooldown_active(now_ms) {
                return;
            }
            sink.raise(Alert::Battery {
                percent,
                critical: false,
            });
            self.battery.warning = true;
            self.last_alert_ms = now_ms;
        } else if percent > self.battery_low + self.battery_hysteresis {
            if self.battery.warning || self.battery.critical {
                info!("Battery recovered ({percent:.0}%), alert flags cleared");
            }
            self.battery.clear();
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
