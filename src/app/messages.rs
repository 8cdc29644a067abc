//! Operator-facing message texts.
//!
//! Pure builders: every reply and notification the device sends is
//! assembled here from plain values, so the wording is testable without
//! a chat transport.

use crate::alerts::Alert;
use crate::clock::TimeOfDay;
use crate::config::SystemConfig;
use crate::sensors::SensorSnapshot;

pub const UNAUTHORIZED: &str = "❌ Unauthorized access";

pub fn menu_text() -> String {
    "🐹 HAMSTER FEEDER MENU\n\n\
     📊 /status - Full system status\n\
     🍽 /info_makan - Food information\n\
     💧 /info_minum - Water information\n\
     🥄 /makan - Feed now\n\
     ⏰ /jadwal - View feed schedule\n\
     ➕ /tambah_jadwal HH:MM - Add schedule\n\
     ➖ /hapus_jadwal HH:MM - Remove schedule\n\
     📈 /data - Data summary\n\
     🔄 /reboot - Restart system\n\
     🆘 /help - Usage guide\n\
     📋 /menu - This menu"
        .to_string()
}

pub fn help_text() -> String {
    "🆘 USAGE GUIDE\n\n\
     📋 Basics:\n\
     • /menu - Show the menu\n\
     • /status - Full system status\n\n\
     🍽 Food & water:\n\
     • /info_makan - Check food level\n\
     • /info_minum - Check water level\n\
     • /makan - Manual feed\n\n\
     ⏰ Schedule:\n\
     • /jadwal - List all schedules\n\
     • /tambah_jadwal HH:MM - Add a schedule\n\
     • /tambah_jadwal - Add via prompt\n\
     • /hapus_jadwal HH:MM - Remove one schedule\n\
     • /hapus_jadwal - Clear all schedules\n\n\
     📊 Data:\n\
     • /data - Feeding data summary\n\
     • /sysinfo - Uptime and firmware info\n\
     • /reboot - Restart the system"
        .to_string()
}

pub fn status_text(
    snap: &SensorSnapshot,
    time_str: &str,
    link_up: bool,
    total_feeds: u32,
    cfg: &SystemConfig,
) -> String {
    let mut status = String::from("📊 SYSTEM STATUS\n\n");

    status.push_str(&format!("🕐 Time: {time_str}\n"));
    status.push_str(&format!(
        "⚡ WiFi: {}\n\n",
        if link_up { "Connected" } else { "❌ Disconnected" }
    ));

    status.push_str(&format!(
        "🔋 Battery: {:.1}V ({:.0}%)\n",
        snap.battery_volts, snap.battery_percent
    ));
    status.push_str(&format!("🍽 Food: {}%\n", snap.food_percent));
    status.push_str(&format!("💧 Water: {}%\n\n", snap.water_percent));

    status.push_str(&format!("📈 Total feeds: {total_feeds}\n"));

    if snap.battery_percent < cfg.battery_critical_percent {
        status.push_str("\n⚠ CRITICAL: Battery very low!");
    } else if snap.battery_percent < cfg.battery_low_percent {
        status.push_str("\n⚠ WARNING: Battery low");
    }
    if snap.food_percent < cfg.food_critical_percent {
        status.push_str("\n⚠ CRITICAL: Food very low!");
    }
    if snap.water_percent < cfg.water_critical_percent {
        status.push_str("\n⚠ CRITICAL: Water very low!");
    }

    status
}

pub fn food_info(snap: &SensorSnapshot, cfg: &SystemConfig) -> String {
    let mut msg = String::from("📦 Food Status\n");
    msg.push_str(&format!("Level: {}%\n", snap.food_percent));
    if snap.food_percent < cfg.food_critical_percent {
        msg.push_str("⚠ CRITICAL - Refill needed!");
    } else if snap.food_percent < cfg.food_warning_percent {
        msg.push_str("⚠ LOW - Consider refilling");
    } else {
        msg.push_str("✅ Level OK");
    }
    msg
}

pub fn water_info(snap: &SensorSnapshot, cfg: &SystemConfig) -> String {
    let mut msg = String::from("💧 Water Status\n");
    msg.push_str(&format!("Level: {}%\n", snap.water_percent));
    if snap.water_percent < cfg.water_critical_percent {
        msg.push_str("⚠ CRITICAL - Refill needed!");
    } else if snap.water_percent < cfg.water_warning_percent {
        msg.push_str("⚠ LOW - Consider refilling");
    } else {
        msg.push_str("✅ Level OK");
    }
    msg
}

pub fn system_info(uptime_secs: u64, schedule_count: usize) -> String {
    format!(
        "ℹ SYSTEM INFORMATION\n\n\
         🔄 Uptime: {} minutes\n\
         ⏰ Schedules: {}\n\
         🔧 Firmware: v{}",
        uptime_secs / 60,
        schedule_count,
        env!("CARGO_PKG_VERSION")
    )
}

pub fn feeding_result(success: bool, reason: Option<&str>, food_percent: u8) -> String {
    if success {
        format!(
            "✅ Feeding Successful\n\
             Hamster has been fed!\n\
             Food level: {food_percent}%"
        )
    } else {
        format!(
            "❌ Feeding Failed\n\
             Reason: {}\n\
             Food level: {food_percent}%",
            reason.unwrap_or("unknown")
        )
    }
}

pub fn auto_feed_notification(at: TimeOfDay, food_percent: u8) -> String {
    format!(
        "🍽 Auto Feed Executed\n\
         Time: {at}\n\
         Food level: {food_percent}%"
    )
}

pub fn startup_notification(time_str: &str, battery_percent: f32) -> String {
    format!(
        "🟢 System Started\n\
         Hamster Feeder is now online!\n\
         Time: {time_str}\n\
         Battery: {battery_percent:.0}%"
    )
}

pub fn alert_text(alert: &Alert) -> String {
    match alert {
        Alert::Food { percent, critical } => format!(
            "{}Food level: {percent}%\n{}",
            if *critical {
                "🚨 CRITICAL FOOD ALERT\n"
            } else {
                "⚠ Food Warning\n"
            },
            if *critical {
                "Immediate refill required!"
            } else {
                "Consider refilling soon"
            }
        ),
        Alert::Water { percent, critical } => format!(
            "{}Water level: {percent}%\n{}",
            if *critical {
                "🚨 CRITICAL WATER ALERT\n"
            } else {
                "⚠ Water Warning\n"
            },
            if *critical {
                "Immediate refill required!"
            } else {
                "Consider refilling soon"
            }
        ),
        Alert::Battery { percent, critical } => format!(
            "{}Battery: {percent:.0}%\n{}",
            if *critical {
                "🚨 CRITICAL BATTERY ALERT\n"
            } else {
                "⚠ Battery Warning\n"
            },
            if *critical {
                "System may shut down soon!"
            } else {
                "Consider charging"
            }
        ),
    }
}

pub fn prompt_time_input() -> String {
    "⏰ Send time in HH:MM format (24 hour)\nExample: 08:30 or 15:45".to_string()
}

pub fn invalid_time_reply() -> String {
    "❌ Invalid time format. Use HH:MM (24 hour format)\nExample: 08:30 or 15:45".to_string()
}

pub fn schedule_added(at: TimeOfDay) -> String {
    format!("✅ Schedule {at} added successfully!")
}

pub fn schedule_add_failed(reason: &str) -> String {
    format!("❌ Failed to add schedule: {reason}")
}

pub fn schedule_removed(at: TimeOfDay) -> String {
    format!("✅ Schedule {at} removed successfully!")
}

pub fn schedule_remove_failed() -> String {
    "❌ Schedule not found.".to_string()
}

pub fn schedules_cleared() -> String {
    "🗑 All schedules cleared successfully!".to_string()
}

pub fn reboot_farewell() -> String {
    "🔄 Rebooting system...".to_string()
}

pub fn unknown_command() -> String {
    "❓ Unknown command. Use /menu to see available options.".to_string()
}

/// Four-line status panel for the OLED (rendering is the display
/// driver's problem; the core only formats).
pub fn display_panel(snap: &SensorSnapshot, link_up: bool) -> String {
    format!(
        "Bat: {:.2}V ({:.0}%)\nFood: {}%\nWater: {}%\nWiFi: {}",
        snap.battery_volts,
        snap.battery_percent,
        snap.food_percent,
        snap.water_percent,
        if link_up { "OK" } else { "ERROR" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(food: u8, water: u8, battery: f32) -> SensorSnapshot {
        SensorSnapshot {
            food_percent: food,
            water_percent: water,
            battery_percent: battery,
            battery_volts: 7.4,
        }
    }

    #[test]
    fn status_appends_critical_lines() {
        let cfg = SystemConfig::default();
        let s = status_text(&snap(10, 5, 8.0), "08:00:00 01/06/2026", true, 3, &cfg);
        assert!(s.contains("CRITICAL: Battery very low!"));
        assert!(s.contains("CRITICAL: Food very low!"));
        assert!(s.contains("CRITICAL: Water very low!"));
        assert!(s.contains("Total feeds: 3"));
    }

    #[test]
    fn status_healthy_has_no_warnings() {
        let cfg = SystemConfig::default();
        let s = status_text(&snap(80, 80, 90.0), "08:00:00 01/06/2026", true, 0, &cfg);
        assert!(!s.contains("⚠"));
        assert!(s.contains("Connected"));
    }

    #[test]
    fn food_info_banding() {
        let cfg = SystemConfig::default();
        assert!(food_info(&snap(80, 80, 90.0), &cfg).contains("Level OK"));
        assert!(food_info(&snap(20, 80, 90.0), &cfg).contains("LOW"));
        assert!(food_info(&snap(10, 80, 90.0), &cfg).contains("CRITICAL"));
    }

    #[test]
    fn feeding_result_carries_reason() {
        let ok = feeding_result(true, None, 60);
        assert!(ok.contains("Feeding Successful"));
        let fail = feeding_result(false, Some("Food level too low"), 5);
        assert!(fail.contains("Feeding Failed"));
        assert!(fail.contains("Food level too low"));
    }

    #[test]
    fn alert_texts_distinguish_severity() {
        let w = alert_text(&Alert::Food {
            percent: 20,
            critical: false,
        });
        assert!(w.contains("Food Warning"));
        let c = alert_text(&Alert::Food {
            percent: 5,
            critical: true,
        });
        assert!(c.contains("CRITICAL FOOD ALERT"));
    }

    #[test]
    fn display_panel_has_four_lines() {
        let p = display_panel(&snap(50, 60, 75.0), false);
        assert_eq!(p.lines().count(), 4);
        assert!(p.contains("WiFi: ERROR"));
    }
}
