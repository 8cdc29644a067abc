//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, feed telemetry, etc.
//! Operator-facing chat replies are *not* events; they go straight out
//! through the chat port.

use crate::alerts::Alert;
use crate::clock::TimeOfDay;
use crate::datalog::FeedKind;
use crate::error::FeedBlocked;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started.
    Started,

    /// A feed action completed: the dispenser ran and the counter
    /// incremented.
    FeedExecuted { kind: FeedKind, food_percent: u8 },

    /// A feed action was refused by a guard.
    FeedBlocked { kind: FeedKind, blocked: FeedBlocked },

    /// A schedule entry was added by the operator.
    ScheduleAdded(TimeOfDay),

    /// The alert engine emitted a notification.
    AlertRaised(Alert),

    /// The feed record was persisted.
    RecordFlushed { total_feeds: u32 },

    /// The operator requested a reboot; the driver loop will restart the
    /// device after this event.
    RebootRequested,
}
