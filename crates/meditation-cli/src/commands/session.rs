//! Interactive timer session.
//!
//! Reads one command per line from stdin and prints every resulting event
//! as a single JSON line on stdout. Sessions live only as long as the
//! process.

use std::time::Duration;

use clap::Args;
use meditation_core::{
    Clock, Config, Event, Meditation, SystemClock, TickSource, TimerEngine, TokioTicker,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  start | pause | toggle   control the countdown
  reset                    stop and refill the countdown
  duration <1-60>          set the session length (idle only)
  note <text>              set the note for the running session
  delete <index>           remove a past session (0 = newest)
  list                     print past sessions
  status                   print the timer state
  quit                     exit";

#[derive(Args)]
pub struct SessionArgs {
    /// Session length in minutes (1-60). Defaults to timer.default_minutes
    #[arg(short, long)]
    minutes: Option<u32>,
    /// Tick period in milliseconds. Defaults to timer.tick_interval_ms
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Initial session note
    #[arg(long)]
    note: Option<String>,
    /// Start the countdown immediately
    #[arg(long)]
    start: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Toggle,
    Start,
    Pause,
    Reset,
    Duration(u32),
    Note(String),
    Delete(usize),
    List,
    Status,
    Help,
    Quit,
}

#[derive(Debug)]
pub enum Outcome {
    Events(Vec<Event>),
    Rejected(String),
    Help,
    Quit,
}

/// Non-event lines written to stdout.
#[derive(Serialize)]
#[serde(tag = "type")]
enum Notice<'a> {
    Rejected { input: &'a str, reason: String },
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_intent(line: &str) -> Result<Option<Intent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let intent = match word.to_ascii_lowercase().as_str() {
        "toggle" => Intent::Toggle,
        "start" => Intent::Start,
        "pause" => Intent::Pause,
        "reset" => Intent::Reset,
        "duration" => Intent::Duration(
            rest.parse()
                .map_err(|_| format!("expected minutes, got '{rest}'"))?,
        ),
        "note" => Intent::Note(rest.to_string()),
        "delete" => Intent::Delete(
            rest.parse()
                .map_err(|_| format!("expected a session index, got '{rest}'"))?,
        ),
        "list" => Intent::List,
        "status" => Intent::Status,
        "help" | "?" => Intent::Help,
        "quit" | "exit" => Intent::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(intent))
}

/// Apply an intent to the timer.
pub fn apply<T: TickSource, C: Clock>(meditation: &mut Meditation<T, C>, intent: Intent) -> Outcome {
    let events = match intent {
        Intent::Toggle => meditation.toggle().into_iter().collect(),
        Intent::Start if meditation.is_active() => Vec::new(),
        Intent::Pause if !meditation.is_active() => Vec::new(),
        Intent::Start | Intent::Pause => meditation.toggle().into_iter().collect(),
        Intent::Reset => meditation.reset().into_iter().collect(),
        Intent::Duration(minutes) => match meditation.set_duration(minutes) {
            Ok(event) => event.into_iter().collect(),
            Err(e) => return Outcome::Rejected(e.to_string()),
        },
        Intent::Note(note) => vec![meditation.set_note(note)],
        Intent::Delete(index) => match meditation.delete_session(index) {
            Ok(event) => vec![event],
            Err(e) => return Outcome::Rejected(e.to_string()),
        },
        Intent::List => vec![meditation.session_list()],
        Intent::Status => vec![meditation.snapshot()],
        Intent::Help => return Outcome::Help,
        Intent::Quit => return Outcome::Quit,
    };
    Outcome::Events(events)
}

fn emit(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn reject(input: &str, reason: String) -> Result<(), serde_json::Error> {
    tracing::warn!(input, %reason, "command rejected");
    println!("{}", serde_json::to_string(&Notice::Rejected { input, reason })?);
    Ok(())
}

/// Decode one raw stdin line. Bytes that are not UTF-8 become U+FFFD so a
/// stray byte cannot end the session.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

pub fn run(args: SessionArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(args, config))
}

async fn drive(args: SessionArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let minutes = args.minutes.unwrap_or(config.timer.default_minutes);
    let period = Duration::from_millis(args.tick_ms.unwrap_or(config.timer.tick_interval_ms));
    let engine = TimerEngine::new(minutes, TokioTicker::new(period), SystemClock)?;
    let mut meditation = Meditation::new(engine)
        .with_timestamp_format(config.display.timestamp_format.clone())?;
    tracing::debug!(minutes, period_ms = period.as_millis() as u64, "session opened");

    if let Some(note) = args.note {
        emit(&meditation.set_note(note))?;
    }
    if args.start {
        if let Some(event) = meditation.toggle() {
            emit(&event)?;
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    let mut stdin_open = true;

    // After stdin closes, keep going until the countdown stops.
    while stdin_open || meditation.is_active() {
        tokio::select! {
            raw = lines.next_segment(), if stdin_open => {
                let Some(raw) = raw? else {
                    stdin_open = false;
                    continue;
                };
                let line = decode_line(&raw);
                let intent = match parse_intent(&line) {
                    Ok(Some(intent)) => intent,
                    Ok(None) => continue,
                    Err(reason) => {
                        reject(&line, reason)?;
                        continue;
                    }
                };
                match apply(&mut meditation, intent) {
                    Outcome::Events(events) => {
                        for event in &events {
                            emit(event)?;
                        }
                    }
                    Outcome::Rejected(reason) => reject(&line, reason)?,
                    Outcome::Help => eprintln!("{HELP}"),
                    Outcome::Quit => break,
                }
            }
            _ = meditation.ticker_mut().recv() => {
                for event in meditation.tick() {
                    emit(&event)?;
                }
            }
        }
    }

    tracing::debug!(sessions = meditation.sessions().len(), "session closed");
    Ok(())
}
