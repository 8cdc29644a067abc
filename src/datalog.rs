//! Feed counter store with batched persistence.
//!
//! The in-memory mirror is the source of truth during uptime; the
//! persisted copy is a recovery snapshot validated by a marker value.
//! Writes are batched behind a quiescence interval to protect the
//! storage medium's write endurance during rapid manual feeding — the
//! cost is a window in which a crash loses the most recent unflushed
//! counts.  That window is accepted; the record is a convenience
//! counter, not an audit log.

use heapless::String as FixedString;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};
use crate::sensors::SensorSnapshot;

/// Sentinel validating the persisted record.  A mismatch (first boot,
/// power-loss corruption, layout change) discards the record silently.
pub const RECORD_MARKER: u32 = 0xFEED_C0DE;

/// Capacity of the last-feed label, bytes.
pub const LABEL_CAP: usize = 32;

/// Read-buffer size for [`StoragePort::read_record`]; comfortably above
/// the postcard-encoded record maximum.
pub const RECORD_BUF_LEN: usize = 64;

// ───────────────────────────────────────────────────────────────
// Record layout
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FeedRecord {
    marker: u32,
    total_feeds: u32,
    last_feed: FixedString<LABEL_CAP>,
}

/// What triggered a feed — distinguishes the notification wording and
/// the persisted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Auto,
    Manual,
}

impl FeedKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Manual => "MANUAL",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// FeedLog
// ───────────────────────────────────────────────────────────────

/// The persistent counter store.
pub struct FeedLog {
    total_feeds: u32,
    last_feed: FixedString<LABEL_CAP>,
    dirty: bool,
    /// Uptime of the last successful write (0 = none since boot).
    last_write_ms: u64,
    quiescence_ms: u64,
}

impl FeedLog {
    pub fn new(quiescence_secs: u32) -> Self {
        Self {
            total_feeds: 0,
            last_feed: FixedString::new(),
            dirty: false,
            last_write_ms: 0,
            quiescence_ms: u64::from(quiescence_secs) * 1000,
        }
    }

    /// Adopt the persisted record, if valid.  Called exactly once during
    /// initialisation, before any other component reads the counters.
    /// An unreadable or marker-mismatched record resets to zero — silent
    /// recovery, not an error.
    pub fn load(&mut self, storage: &impl StoragePort) {
        let mut buf = [0u8; RECORD_BUF_LEN];
        let record = match storage.read_record(&mut buf) {
            Ok(n) => postcard::from_bytes::<FeedRecord>(&buf[..n]).ok(),
            Err(StorageError::NotFound) => None,
            Err(e) => {
                warn!("Feed record read failed: {e}");
                None
            }
        };

        match record {
            Some(r) if r.marker == RECORD_MARKER => {
                info!("Feed record restored: {} feeds, last '{}'", r.total_feeds, r.last_feed);
                self.total_feeds = r.total_feeds;
                self.last_feed = r.last_feed;
            }
            Some(_) => {
                warn!("Feed record marker mismatch, starting fresh");
                self.reset();
            }
            None => {
                info!("No feed record, starting fresh");
                self.reset();
            }
        }
    }

    /// Count one successful dispense and remember its label.
    pub fn record_feed(&mut self, kind: FeedKind, at: &str) {
        self.total_feeds += 1;
        self.last_feed.clear();
        // Truncate rather than fail: the label is display-only.
        for ch in kind.label().chars().chain(" ".chars()).chain(at.chars()) {
            if self.last_feed.push(ch).is_err() {
                break;
            }
        }
        self.dirty = true;
        info!("Feed logged: {} (total {})", self.last_feed, self.total_feeds);
    }

    /// Persist the record if dirty and the quiescence interval has
    /// elapsed since the last write.  Returns whether a write happened.
    /// A failed write keeps the record dirty for retry next cycle.
    pub fn flush(&mut self, now_ms: u64, storage: &mut impl StoragePort) -> bool {
        if !self.dirty {
            return false;
        }
        if now_ms.saturating_sub(self.last_write_ms) < self.quiescence_ms {
            return false;
        }
        self.write(now_ms, storage)
    }

    /// Persist immediately, ignoring quiescence.  Used before a
    /// deliberate reboot; does nothing when clean.
    pub fn force_flush(&mut self, now_ms: u64, storage: &mut impl StoragePort) -> bool {
        if !self.dirty {
            return false;
        }
        self.write(now_ms, storage)
    }

    pub fn total_feeds(&self) -> u32 {
        self.total_feeds
    }

    /// Label of the most recent feed, empty if none since the last reset.
    pub fn last_feed(&self) -> &str {
        &self.last_feed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Operator-facing data summary with a live sensor snapshot.
    pub fn summary(&self, snap: &SensorSnapshot) -> String {
        let last = if self.last_feed.is_empty() {
            "-"
        } else {
            self.last_feed.as_str()
        };
        format!(
            "📊 DATA SUMMARY\n\n\
             🍽 Total feeds: {}\n\
             ⏰ Last feed: {}\n\
             🔋 Battery: {:.1}V\n\
             📈 Food: {}%\n\
             💧 Water: {}%\n",
            self.total_feeds, last, snap.battery_volts, snap.food_percent, snap.water_percent
        )
    }

    // ── Internal ──────────────────────────────────────────────

    fn reset(&mut self) {
        self.total_feeds = 0;
        self.last_feed.clear();
        self.dirty = false;
    }

    fn write(&mut self, now_ms: u64, storage: &mut impl StoragePort) -> bool {
        let record = FeedRecord {
            marker: RECORD_MARKER,
            total_feeds: self.total_feeds,
            last_feed: self.last_feed.clone(),
        };
        let bytes = match postcard::to_allocvec(&record) {
            Ok(b) => b,
            Err(e) => {
                warn!("Feed record encode failed: {e}");
                return false;
            }
        };
        match storage.write_record(&bytes) {
            Ok(()) => {
                self.dirty = false;
                self.last_write_ms = now_ms;
                info!("Feed record persisted ({} feeds)", self.total_feeds);
                true
            }
            Err(e) => {
                warn!("Feed record write failed: {e}, will retry");
                false
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
