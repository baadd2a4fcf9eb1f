//! # Meditation Core Library
//!
//! This library provides the core logic for a countdown meditation timer
//! with an in-memory session log. The CLI binary is a thin shell over it:
//! it forwards user intents and prints the events that come back.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A one-second countdown state machine; the caller
//!   invokes `tick()` whenever its injected tick source fires
//! - **Session Log**: Completed sessions, newest first, deletable by position
//! - **Meditation**: Ties the two together with the pending note
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core countdown state machine
//! - [`Meditation`]: Shell-facing facade and completion wiring
//! - [`SessionLog`]: Session history
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod meditation;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use meditation::Meditation;
pub use session::{SessionEntry, SessionLog, SessionRecord};
pub use storage::Config;
pub use timer::{
    format_display, Clock, FixedClock, ManualTicker, SystemClock, TickSource, TimerEngine,
    TimerState, TokioTicker,
};
