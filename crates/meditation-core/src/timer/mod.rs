mod clock;
mod engine;
mod format;
mod ticker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{TimerEngine, TimerState, DEFAULT_MINUTES, MAX_MINUTES, MIN_MINUTES};
pub use format::{format_display, format_minutes_label};
pub use ticker::{ManualTicker, TickSource, TokioTicker};
