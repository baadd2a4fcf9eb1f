//! Periodic tick sources.
//!
//! A [`TickSource`] only has to be started and stopped; whoever owns the
//! engine pulls ticks out of it and calls `tick()`. The engine guarantees it
//! stops the source before starting it again and on every path that leaves
//! the running state.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub trait TickSource {
    /// Begin delivering one tick per period.
    fn start(&mut self);
    /// Stop delivering ticks. Stopping an idle source is a no-op.
    fn stop(&mut self);
    /// Whether ticks are currently being delivered.
    fn is_live(&self) -> bool;
}

/// Test double that records how it was driven.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    live: bool,
    starts: usize,
    stops: usize,
    overlapped: bool,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the source was started.
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Number of times a live source was stopped.
    pub fn stops(&self) -> usize {
        self.stops
    }

    /// True if `start` was ever called while already live.
    pub fn overlapped(&self) -> bool {
        self.overlapped
    }
}

impl TickSource for ManualTicker {
    fn start(&mut self) {
        if self.live {
            self.overlapped = true;
        }
        self.live = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        if self.live {
            self.stops += 1;
        }
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

/// Interval-driven tick source backed by a tokio task.
///
/// Each activation spawns one task; ticks carry the activation epoch so
/// anything still queued from a stopped activation is dropped by
/// [`TokioTicker::recv`]. `start` must be called from inside a tokio runtime.
#[derive(Debug)]
pub struct TokioTicker {
    period: Duration,
    epoch: u64,
    tx: mpsc::UnboundedSender<u64>,
    rx: mpsc::UnboundedReceiver<u64>,
    handle: Option<JoinHandle<()>>,
}

impl TokioTicker {
    pub fn new(period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            // tokio::time::interval panics on a zero period.
            period: period.max(Duration::from_millis(1)),
            epoch: 0,
            tx,
            rx,
            handle: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick of the current activation.
    ///
    /// Pends forever while the source is stopped. Cancel safe, so it can sit
    /// in a `tokio::select!` next to other inputs.
    pub async fn recv(&mut self) {
        loop {
            if self.handle.is_none() {
                std::future::pending::<()>().await;
            }
            match self.rx.recv().await {
                Some(epoch) if epoch == self.epoch => return,
                Some(_) => continue,
                // Unreachable while we hold `tx`.
                None => std::future::pending::<()>().await,
            }
        }
    }
}

impl TickSource for TokioTicker {
    fn start(&mut self) {
        self.stop();
        self.epoch += 1;
        let epoch = self.epoch;
        let period = self.period;
        let tx = self.tx.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(epoch).is_err() {
                    break;
                }
            }
        }));
        tracing::trace!(epoch, period_ms = period.as_millis() as u64, "tick source started");
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.epoch += 1;
            tracing::trace!(epoch = self.epoch, "tick source stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
