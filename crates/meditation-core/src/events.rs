use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{SessionEntry, SessionRecord};
use crate::timer::TimerState;

/// Every state change in the system produces an Event.
/// The shell prints them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration_minutes: u32,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    DurationChanged {
        minutes: u32,
        /// Short form such as `20 min`.
        label: String,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero while running. Fired once per countdown.
    TimerCompleted {
        duration_minutes: u32,
        at: DateTime<Utc>,
    },
    /// A completed session was put at the front of the log.
    SessionLogged {
        index: usize,
        record: SessionRecord,
    },
    SessionDeleted {
        index: usize,
        record: SessionRecord,
    },
    NoteUpdated {
        note: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        configured_minutes: u32,
        seconds_remaining: u32,
        display: String,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
    SessionList {
        sessions: Vec<SessionEntry>,
        total_minutes: u32,
    },
}
