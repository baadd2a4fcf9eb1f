//! Timer engine implementation.
//!
//! The engine is a one-second countdown state machine. It does not own a
//! thread: a [`TickSource`] is started and stopped by the engine, and the
//! caller feeds each delivered tick back through `tick()`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -(toggle)-> Running
//! Running -(toggle | reset | countdown hits zero)-> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(5, ManualTicker::new(), SystemClock)?;
//! engine.toggle();
//! // Once per elapsed second:
//! engine.tick(); // Returns Some(Event::TimerCompleted) at zero
//! ```

use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::format::{format_display, format_minutes_label};
use super::ticker::TickSource;
use crate::error::ValidationError;
use crate::events::Event;

/// Shortest selectable session, in minutes.
pub const MIN_MINUTES: u32 = 1;
/// Longest selectable session, in minutes.
pub const MAX_MINUTES: u32 = 60;
/// Duration a fresh timer starts with.
pub const DEFAULT_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

/// Core countdown engine.
///
/// Invariant: the tick source is live exactly when the engine is running.
#[derive(Debug)]
pub struct TimerEngine<T: TickSource, C: Clock = SystemClock> {
    configured_minutes: u32,
    seconds_remaining: u32,
    active: bool,
    ticker: T,
    clock: C,
}

impl<T: TickSource, C: Clock> TimerEngine<T, C> {
    /// Create an idle engine with `minutes` on the clock.
    pub fn new(minutes: u32, ticker: T, clock: C) -> Result<Self, ValidationError> {
        check_minutes(minutes)?;
        Ok(Self {
            configured_minutes: minutes,
            seconds_remaining: minutes * 60,
            active: false,
            ticker,
            clock,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.active {
            TimerState::Running
        } else {
            TimerState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn configured_minutes(&self) -> u32 {
        self.configured_minutes
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn total_seconds(&self) -> u32 {
        self.configured_minutes * 60
    }

    /// Current countdown as `m:ss`.
    pub fn display(&self) -> String {
        format_display(self.seconds_remaining)
    }

    /// 0.0 .. 1.0 of the countdown already elapsed.
    pub fn progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.seconds_remaining as f64 / total as f64)
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut T {
        &mut self.ticker
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            configured_minutes: self.configured_minutes,
            seconds_remaining: self.seconds_remaining,
            display: self.display(),
            progress_pct: (self.progress() * 100.0).min(100.0),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Change the session length.
    ///
    /// Ignored while running. Out-of-range values are rejected without
    /// touching any state.
    pub fn set_duration(&mut self, minutes: u32) -> Result<Option<Event>, ValidationError> {
        check_minutes(minutes).inspect_err(|e| tracing::warn!(minutes, "{e}"))?;
        if self.active {
            tracing::debug!(minutes, "duration change ignored while running");
            return Ok(None);
        }
        self.configured_minutes = minutes;
        self.seconds_remaining = minutes * 60;
        tracing::debug!(minutes, "duration changed");
        Ok(Some(Event::DurationChanged {
            minutes,
            label: format_minutes_label(minutes),
            seconds_remaining: self.seconds_remaining,
            at: self.clock.now(),
        }))
    }

    /// Start when idle, pause when running.
    ///
    /// A countdown that already reached zero stays put until `reset` or
    /// `set_duration` refills it.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.active {
            self.deactivate();
            tracing::debug!(seconds_remaining = self.seconds_remaining, "timer paused");
            return Some(Event::TimerPaused {
                seconds_remaining: self.seconds_remaining,
                at: self.clock.now(),
            });
        }
        if self.seconds_remaining == 0 {
            tracing::debug!("start ignored, countdown already finished");
            return None;
        }
        self.ticker.stop();
        self.ticker.start();
        self.active = true;
        tracing::debug!(seconds_remaining = self.seconds_remaining, "timer started");
        Some(Event::TimerStarted {
            duration_minutes: self.configured_minutes,
            seconds_remaining: self.seconds_remaining,
            at: self.clock.now(),
        })
    }

    /// Stop and refill the countdown. Never records a session.
    pub fn reset(&mut self) -> Option<Event> {
        self.deactivate();
        self.seconds_remaining = self.total_seconds();
        tracing::debug!(seconds_remaining = self.seconds_remaining, "timer reset");
        Some(Event::TimerReset {
            seconds_remaining: self.seconds_remaining,
            at: self.clock.now(),
        })
    }

    /// Call once per elapsed second. Returns `Some(Event::TimerCompleted)`
    /// on the tick that brings the countdown to zero.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.active {
            return None;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return None;
        }
        self.deactivate();
        tracing::info!(minutes = self.configured_minutes, "countdown completed");
        Some(Event::TimerCompleted {
            duration_minutes: self.configured_minutes,
            at: self.clock.now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn deactivate(&mut self) {
        self.active = false;
        self.ticker.stop();
    }
}

fn check_minutes(minutes: u32) -> Result<(), ValidationError> {
    if (MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: "minutes".into(),
            message: format!("{minutes} is outside {MIN_MINUTES}..={MAX_MINUTES}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::clock::FixedClock;
    use crate::timer::ticker::ManualTicker;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn engine(minutes: u32) -> TimerEngine<ManualTicker, FixedClock> {
        let at = Utc.with_ymd_and_hms(2024, 5, 4, 6, 0, 0).unwrap();
        TimerEngine::new(minutes, ManualTicker::new(), FixedClock(at)).unwrap()
    }

    fn run_ticks(engine: &mut TimerEngine<ManualTicker, FixedClock>, n: u32) -> Vec<Event> {
        (0..n).filter_map(|_| engine.tick()).collect()
    }

    #[test]
    fn new_engine_is_idle_and_full() {
        let engine = engine(5);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.seconds_remaining(), 300);
        assert_eq!(engine.display(), "5:00");
        assert!(!engine.ticker().is_live());
    }

    #[test]
    fn new_rejects_out_of_range_minutes() {
        let at = Utc.with_ymd_and_hms(2024, 5, 4, 6, 0, 0).unwrap();
        assert!(TimerEngine::new(0, ManualTicker::new(), FixedClock(at)).is_err());
        assert!(TimerEngine::new(61, ManualTicker::new(), FixedClock(at)).is_err());
    }

    #[test]
    fn toggle_starts_and_pauses_without_losing_time() {
        let mut engine = engine(1);
        assert!(matches!(engine.toggle(), Some(Event::TimerStarted { .. })));
        assert!(engine.ticker().is_live());

        run_ticks(&mut engine, 10);
        assert!(matches!(
            engine.toggle(),
            Some(Event::TimerPaused { seconds_remaining: 50, .. })
        ));
        assert!(!engine.ticker().is_live());
        assert_eq!(engine.seconds_remaining(), 50);

        engine.toggle();
        assert_eq!(engine.seconds_remaining(), 50);
        assert!(!engine.ticker().overlapped());
    }

    #[test]
    fn ticks_while_idle_are_ignored() {
        let mut engine = engine(1);
        assert!(run_ticks(&mut engine, 5).is_empty());
        assert_eq!(engine.seconds_remaining(), 60);
    }

    #[test]
    fn full_countdown_completes_exactly_once() {
        let mut engine = engine(1);
        engine.toggle();
        let events = run_ticks(&mut engine, 60);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::TimerCompleted { duration_minutes: 1, .. }
        ));
        assert_eq!(engine.seconds_remaining(), 0);
        assert!(!engine.is_active());
        assert!(!engine.ticker().is_live());

        // Further ticks and start attempts cannot complete it again.
        assert!(run_ticks(&mut engine, 10).is_empty());
        assert!(engine.toggle().is_none());
        assert!(run_ticks(&mut engine, 10).is_empty());
    }

    #[test]
    fn completion_fires_on_the_last_tick_not_before() {
        let mut engine = engine(1);
        engine.toggle();
        assert!(run_ticks(&mut engine, 59).is_empty());
        assert_eq!(engine.display(), "0:01");
        assert!(engine.tick().is_some());
    }

    #[test]
    fn reset_refills_and_stops() {
        let mut engine = engine(2);
        engine.toggle();
        run_ticks(&mut engine, 30);
        assert!(matches!(
            engine.reset(),
            Some(Event::TimerReset { seconds_remaining: 120, .. })
        ));
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(!engine.ticker().is_live());
        assert_eq!(engine.ticker().stops(), 1);
    }

    #[test]
    fn reset_after_completion_allows_another_session() {
        let mut engine = engine(1);
        engine.toggle();
        run_ticks(&mut engine, 60);
        engine.reset();
        engine.toggle();
        assert_eq!(run_ticks(&mut engine, 60).len(), 1);
    }

    #[test]
    fn duration_change_carries_label() {
        let mut engine = engine(5);
        match engine.set_duration(20).unwrap() {
            Some(Event::DurationChanged {
                minutes,
                label,
                seconds_remaining,
                ..
            }) => {
                assert_eq!(minutes, 20);
                assert_eq!(label, "20 min");
                assert_eq!(seconds_remaining, 1200);
            }
            other => panic!("Expected DurationChanged, got {other:?}"),
        }
    }

    #[test]
    fn set_duration_is_ignored_while_running() {
        let mut engine = engine(5);
        engine.toggle();
        assert_eq!(engine.set_duration(10), Ok(None));
        assert_eq!(engine.configured_minutes(), 5);
        assert_eq!(engine.seconds_remaining(), 300);
    }

    #[test]
    fn set_duration_rejects_out_of_range() {
        let mut engine = engine(5);
        assert!(engine.set_duration(0).is_err());
        assert!(engine.set_duration(61).is_err());
        assert_eq!(engine.configured_minutes(), 5);
        assert_eq!(engine.seconds_remaining(), 300);
    }

    #[test]
    fn every_deactivation_stops_the_source() {
        let mut engine = engine(1);
        engine.toggle();
        engine.toggle();
        engine.toggle();
        engine.reset();
        engine.toggle();
        run_ticks(&mut engine, 60);

        let ticker = engine.ticker();
        assert_eq!(ticker.starts(), 3);
        assert_eq!(ticker.stops(), 3);
        assert!(!ticker.overlapped());
    }

    #[test]
    fn snapshot_reports_progress() {
        let mut engine = engine(1);
        engine.toggle();
        run_ticks(&mut engine, 30);
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                seconds_remaining,
                display,
                progress_pct,
                ..
            } => {
                assert_eq!(state, TimerState::Running);
                assert_eq!(seconds_remaining, 30);
                assert_eq!(display, "0:30");
                assert!((progress_pct - 50.0).abs() < 1e-9);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn set_duration_while_idle_fills_countdown(minutes in MIN_MINUTES..=MAX_MINUTES) {
            let mut engine = engine(DEFAULT_MINUTES);
            prop_assert!(engine.set_duration(minutes).unwrap().is_some());
            prop_assert_eq!(engine.configured_minutes(), minutes);
            prop_assert_eq!(engine.seconds_remaining(), minutes * 60);
        }

        #[test]
        fn start_then_reset_restores_full_countdown(minutes in MIN_MINUTES..=MAX_MINUTES, ticks in 0u32..3600) {
            let mut engine = engine(minutes);
            engine.toggle();
            let ticks = ticks.min(minutes * 60 - 1);
            prop_assert!(run_ticks(&mut engine, ticks).is_empty());
            engine.reset();
            prop_assert_eq!(engine.seconds_remaining(), minutes * 60);
            prop_assert!(!engine.is_active());
        }
    }
}
