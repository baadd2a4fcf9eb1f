//! The shell-facing meditation timer.
//!
//! [`Meditation`] owns a [`TimerEngine`], the [`SessionLog`] and the pending
//! note, and turns every completion into exactly one logged session.

use crate::error::ValidationError;
use crate::events::Event;
use crate::session::{check_timestamp_format, SessionLog, SessionRecord, DEFAULT_TIMESTAMP_FORMAT};
use crate::timer::{Clock, SystemClock, TickSource, TimerEngine};

#[derive(Debug)]
pub struct Meditation<T: TickSource, C: Clock = SystemClock> {
    engine: TimerEngine<T, C>,
    log: SessionLog,
    pending_note: String,
    timestamp_format: String,
}

impl<T: TickSource, C: Clock> Meditation<T, C> {
    pub fn new(engine: TimerEngine<T, C>) -> Self {
        Self {
            engine,
            log: SessionLog::new(),
            pending_note: String::new(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    /// Use `format` (chrono strftime syntax) for session timestamps.
    ///
    /// Layouts chrono cannot render are rejected here rather than at the
    /// completing tick.
    pub fn with_timestamp_format(
        mut self,
        format: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let format = format.into();
        check_timestamp_format(&format)?;
        self.timestamp_format = format;
        Ok(self)
    }

    // ── Intents ──────────────────────────────────────────────────────

    pub fn set_duration(&mut self, minutes: u32) -> Result<Option<Event>, ValidationError> {
        self.engine.set_duration(minutes)
    }

    pub fn toggle(&mut self) -> Option<Event> {
        self.engine.toggle()
    }

    /// Stop and refill the countdown. The pending note is kept for the next
    /// session.
    pub fn reset(&mut self) -> Option<Event> {
        self.engine.reset()
    }

    pub fn set_note(&mut self, note: impl Into<String>) -> Event {
        self.pending_note = note.into();
        Event::NoteUpdated {
            note: self.pending_note.clone(),
            at: self.engine.clock().now(),
        }
    }

    pub fn delete_session(&mut self, index: usize) -> Result<Event, ValidationError> {
        let record = self.log.delete_at(index)?;
        Ok(Event::SessionDeleted { index, record })
    }

    /// Feed one elapsed second into the countdown.
    ///
    /// On completion returns the `TimerCompleted` event followed by the
    /// `SessionLogged` event for the record it produced.
    pub fn tick(&mut self) -> Vec<Event> {
        let Some(completed) = self.engine.tick() else {
            return Vec::new();
        };
        let Event::TimerCompleted {
            duration_minutes,
            at,
        } = &completed
        else {
            return vec![completed];
        };
        let note = std::mem::take(&mut self.pending_note);
        let record = SessionRecord::new(*at, *duration_minutes, note, &self.timestamp_format);
        self.log.append(record.clone());
        vec![completed, Event::SessionLogged { index: 0, record }]
    }

    // ── Observations ─────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine<T, C> {
        &self.engine
    }

    /// The tick source, so the owner can wait on it between intents.
    pub fn ticker_mut(&mut self) -> &mut T {
        self.engine.ticker_mut()
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.engine.seconds_remaining()
    }

    pub fn is_active(&self) -> bool {
        self.engine.is_active()
    }

    pub fn configured_minutes(&self) -> u32 {
        self.engine.configured_minutes()
    }

    pub fn display(&self) -> String {
        self.engine.display()
    }

    pub fn pending_note(&self) -> &str {
        &self.pending_note
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        self.log.list()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    pub fn session_list(&self) -> Event {
        Event::SessionList {
            sessions: self.log.entries(),
            total_minutes: self.log.total_minutes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{FixedClock, ManualTicker};
    use chrono::{TimeZone, Utc};

    fn meditation(minutes: u32) -> Meditation<ManualTicker, FixedClock> {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 5, 45, 0).unwrap();
        let engine = TimerEngine::new(minutes, ManualTicker::new(), FixedClock(at)).unwrap();
        Meditation::new(engine)
            .with_timestamp_format("%Y-%m-%d")
            .unwrap()
    }

    fn finish(m: &mut Meditation<ManualTicker, FixedClock>) -> Vec<Event> {
        m.toggle();
        let ticks = m.seconds_remaining();
        (0..ticks).flat_map(|_| m.tick()).collect()
    }

    #[test]
    fn one_minute_session_is_logged_after_sixty_ticks() {
        let mut m = meditation(1);
        let events = finish(&mut m);

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::TimerCompleted { duration_minutes: 1, .. }));
        assert!(matches!(events[1], Event::SessionLogged { index: 0, .. }));
        assert_eq!(m.sessions().len(), 1);
        assert_eq!(m.sessions()[0].duration_minutes(), 1);
        assert_eq!(m.seconds_remaining(), 0);
        assert!(!m.is_active());
    }

    #[test]
    fn note_is_captured_at_completion_then_cleared() {
        let mut m = meditation(1);
        m.set_note("first draft");
        m.toggle();
        for _ in 0..30 {
            m.tick();
        }
        m.set_note("breathing felt slow");
        for _ in 0..30 {
            m.tick();
        }
        assert_eq!(m.sessions()[0].note(), "breathing felt slow");
        assert_eq!(m.pending_note(), "");

        m.set_note("typed afterwards");
        assert_eq!(m.sessions()[0].note(), "breathing felt slow");
    }

    #[test]
    fn reset_keeps_pending_note_and_log() {
        let mut m = meditation(3);
        m.set_note("keep me");
        m.toggle();
        m.tick();
        m.reset();
        assert_eq!(m.pending_note(), "keep me");
        assert!(m.sessions().is_empty());
        assert_eq!(m.seconds_remaining(), 180);
    }

    #[test]
    fn completions_are_listed_newest_first() {
        let mut m = meditation(1);
        for minutes in [1, 2, 3] {
            m.set_duration(minutes).unwrap();
            finish(&mut m);
        }
        let durations: Vec<_> = m.sessions().iter().map(|r| r.duration_minutes()).collect();
        assert_eq!(durations, [3, 2, 1]);
    }

    #[test]
    fn record_uses_clock_timestamp_and_format() {
        let mut m = meditation(1);
        finish(&mut m);
        let record = &m.sessions()[0];
        assert_eq!(
            record.completed_at(),
            Utc.with_ymd_and_hms(2024, 6, 1, 5, 45, 0).unwrap()
        );
        assert!(record.timestamp().starts_with("2024-"));
    }

    #[test]
    fn unrenderable_timestamp_format_is_rejected_up_front() {
        let engine = TimerEngine::new(1, ManualTicker::new(), FixedClock(Utc::now())).unwrap();
        let err = Meditation::new(engine).with_timestamp_format("%Q").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));

        let engine = TimerEngine::new(1, ManualTicker::new(), FixedClock(Utc::now())).unwrap();
        assert!(Meditation::new(engine).with_timestamp_format("").is_err());
    }

    #[test]
    fn completing_tick_renders_with_accepted_format() {
        let mut m = meditation(1);
        m.toggle();
        let events: Vec<_> = (0..60).flat_map(|_| m.tick()).collect();
        assert_eq!(events.len(), 2);
        let stamp = m.sessions()[0].timestamp();
        assert!(stamp.starts_with("2024-"));
        assert_eq!(stamp.len(), "2024-06-01".len());
    }

    #[test]
    fn delete_session_by_position() {
        let mut m = meditation(1);
        m.set_note("older");
        finish(&mut m);
        m.reset();
        m.set_note("newer");
        finish(&mut m);

        match m.delete_session(1).unwrap() {
            Event::SessionDeleted { index, record } => {
                assert_eq!(index, 1);
                assert_eq!(record.note(), "older");
            }
            other => panic!("Expected SessionDeleted, got {other:?}"),
        }
        assert_eq!(m.sessions().len(), 1);
        assert!(m.delete_session(1).is_err());
        assert_eq!(m.sessions().len(), 1);
    }

    #[test]
    fn session_list_reports_total_minutes() {
        let mut m = meditation(2);
        finish(&mut m);
        match m.session_list() {
            Event::SessionList {
                sessions,
                total_minutes,
            } => {
                assert_eq!(sessions.len(), 1);
                assert_eq!(sessions[0].index, 0);
                assert_eq!(
                    sessions[0].summary,
                    format!("2 minutes on {}", m.sessions()[0].timestamp())
                );
                assert_eq!(total_minutes, 2);
            }
            other => panic!("Expected SessionList, got {other:?}"),
        }
    }
}
