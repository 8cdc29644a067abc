//! Inbound command parsing.
//!
//! The command surface is a fixed dispatch table over the normalized
//! message text (trimmed, lowercased).  Every command has a slash form
//! and an emoji-label synonym matching the reply-keyboard buttons, so
//! tapping a button and typing the command are equivalent.

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the main menu (`/start`, `/menu`, back button).
    Menu,
    /// Full system status report.
    Status,
    /// Dispense immediately.
    FeedNow,
    /// Food level report.
    FoodInfo,
    /// Water level report.
    WaterInfo,
    /// List all schedule entries.
    ListSchedule,
    /// Add a schedule: inline `HH:MM` argument, or `None` for the
    /// two-step prompted form.
    AddSchedule(Option<String>),
    /// Remove one schedule by `HH:MM`, or clear all when no argument.
    RemoveSchedule(Option<String>),
    /// Feed data summary.
    Logs,
    /// Uptime / firmware info.
    SystemInfo,
    /// Restart the device.
    Reboot,
    /// Command reference.
    Help,
    /// Anything not in the table.
    Unknown,
}

/// Parse a raw inbound text into a command.  Surrounding whitespace and
/// letter case never matter.
pub fn parse(text: &str) -> Command {
    let text = text.trim().to_lowercase();

    if let Some(arg) = text.strip_prefix("/tambah_jadwal ") {
        return Command::AddSchedule(Some(arg.trim().to_string()));
    }
    if let Some(arg) = text.strip_prefix("/hapus_jadwal ") {
        return Command::RemoveSchedule(Some(arg.trim().to_string()));
    }

    match text.as_str() {
        "/start" | "/menu" | "🔙 back" => Command::Menu,
        "/status" | "📊 status" => Command::Status,
        "/makan" | "🍽 feed now" => Command::FeedNow,
        "/info_makan" | "🍽 food info" => Command::FoodInfo,
        "/info_minum" | "💧 water info" => Command::WaterInfo,
        "/jadwal" | "📋 view schedule" => Command::ListSchedule,
        "/tambah_jadwal" | "➕ add schedule" => Command::AddSchedule(None),
        "/hapus_jadwal" | "🗑 clear schedule" => Command::RemoveSchedule(None),
        "/data" | "📝 logs" => Command::Logs,
        "/sysinfo" | "ℹ system info" => Command::SystemInfo,
        "/reboot" | "🔄 reboot" => Command::Reboot,
        "/help" => Command::Help,
        _ => Command::Unknown,
    }
}
