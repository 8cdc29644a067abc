//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, the dispenser servo, the chat transport,
//! the wall clock, record storage) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware or the network directly.
//!
//! All port errors are typed — callers must handle every variant
//! explicitly.  A failing chat or storage call is never fatal: the
//! control loop logs it and resumes.

use crate::sensors::SensorSnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain fresh sensor data.
pub trait SensorPort {
    /// Read every sensor and return a unified snapshot.
    fn read_all(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Dispenser port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to run one dispense motion.
/// The call blocks for the fixed actuation + settle time.
pub trait DispenserPort {
    fn dispense_once(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Chat port (driven adapter: domain ↔ messaging channel)
// ───────────────────────────────────────────────────────────────

/// Formatting hint forwarded to the chat transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Markdown,
}

/// One inbound operator message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender chat identity, compared against the authorized operator.
    pub chat_id: String,
    pub text: String,
}

/// The stateless request/response messaging channel.
pub trait ChatPort {
    fn send_text(&mut self, chat_id: &str, text: &str, format: TextFormat)
        -> Result<(), ChatError>;

    /// Drain one batch of pending inbound messages.  An empty batch
    /// means the channel is drained; callers loop until empty each
    /// cycle.
    fn poll_inbound(&mut self) -> Vec<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: time service → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock and uptime source.
pub trait ClockPort {
    /// Synced epoch seconds, or `None` before the first successful sync.
    fn epoch_secs(&self) -> Option<u64>;

    /// Monotonic milliseconds since boot.
    fn uptime_ms(&self) -> u64;

    /// Kick a wall-clock resynchronisation.  Returns whether the clock
    /// is (still) synced; failure is non-blocking and retried later.
    fn resynchronize(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ persistent record)
// ───────────────────────────────────────────────────────────────

/// Persistence for the single feed-counter record.
///
/// Write operations are expected to be atomic at the record level — the
/// reader sees either the previous record or the new one, never a blend.
pub trait StoragePort {
    /// Persist the record bytes, replacing any previous record.
    fn write_record(&mut self, bytes: &[u8]) -> Result<(), StorageError>;

    /// Read the record into `buf`.  Returns the number of bytes written.
    fn read_record(&self, buf: &mut [u8]) -> Result<usize, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log,
/// telemetry, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ChatPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatError {
    /// The network link is down; nothing was transmitted.
    Disconnected,
    /// The transport reported a send failure.
    SendFailed,
    /// Polling for updates failed.
    PollFailed,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// No record has ever been written.
    NotFound,
    /// The record (or the read buffer) exceeds the slot capacity.
    TooLarge,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ChatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "link down"),
            Self::SendFailed => write!(f, "send failed"),
            Self::PollFailed => write!(f, "poll failed"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "record not found"),
            Self::TooLarge => write!(f, "record too large"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
