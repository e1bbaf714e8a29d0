//! Playback: reveal the ordered commit list one node per tick.
//!
//! The controller is a small Idle/Revealing state machine. Time only enters
//! through [`Ticker::poll`], which is fed frame deltas, so every transition
//! is reproducible in tests without a real timer.

use std::time::Duration;
use tracing::{debug, info};

/// Pure reveal step: the visible prefix grows by one, capped at the total.
pub fn next_reveal(total: usize, revealed: usize) -> usize {
    (revealed + 1).min(total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Revealing,
}

/// Cancellable repeating tick source. Cancellation is dropping it (or
/// replacing it on restart); once gone it can never fire again.
#[derive(Debug)]
struct Ticker {
    interval: Duration,
    accumulated: Duration,
}

impl Ticker {
    fn new(interval: Duration) -> Self {
        Self {
            // A zero interval would fire unboundedly within one frame.
            interval: interval.max(Duration::from_millis(1)),
            accumulated: Duration::ZERO,
        }
    }

    /// Accumulate a frame delta and return how many ticks elapsed.
    fn poll(&mut self, dt: Duration) -> u32 {
        self.accumulated += dt;
        let mut fired = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            fired += 1;
        }
        fired
    }
}

/// Drives the incremental reveal of an ordered node list.
#[derive(Debug)]
pub struct Playback {
    state: PlaybackState,
    total: usize,
    revealed: usize,
    ticker: Option<Ticker>,
    completed: bool,
}

impl Playback {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            total: 0,
            revealed: 0,
            ticker: None,
            completed: false,
        }
    }

    /// Begin revealing `total` nodes on the given cadence. Starting with an
    /// empty list is a no-op. Restarting while already revealing replaces
    /// the live ticker, so exactly one can ever be active.
    pub fn start(&mut self, total: usize, interval: Duration) {
        if total == 0 {
            debug!("playback start skipped: nothing to reveal");
            return;
        }
        info!(total, ?interval, "starting playback");
        self.state = PlaybackState::Revealing;
        self.total = total;
        self.revealed = 0;
        self.ticker = Some(Ticker::new(interval));
        self.completed = false;
    }

    /// Halt the tick sequence. No further reveals are emitted.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Revealing {
            debug!(revealed = self.revealed, total = self.total, "playback stopped");
        }
        self.state = PlaybackState::Idle;
        self.ticker = None;
    }

    /// Advance by one frame delta. Returns the number of nodes newly
    /// revealed this frame; on reaching the full list the controller stops
    /// ticking, returns to Idle, and latches the completion signal.
    pub fn advance(&mut self, dt: Duration) -> usize {
        if self.state != PlaybackState::Revealing {
            return 0;
        }
        let Some(ticker) = self.ticker.as_mut() else {
            return 0;
        };

        let mut newly = 0;
        for _ in 0..ticker.poll(dt) {
            let next = next_reveal(self.total, self.revealed);
            if next == self.revealed {
                break;
            }
            self.revealed = next;
            newly += 1;
            if self.revealed == self.total {
                break;
            }
        }

        if self.revealed == self.total {
            info!(total = self.total, "playback complete");
            self.state = PlaybackState::Idle;
            self.ticker = None;
            self.completed = true;
        }
        newly
    }

    /// Length of the currently visible prefix.
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn is_revealing(&self) -> bool {
        self.state == PlaybackState::Revealing
    }

    /// Read the completion signal; it fires once per finished run.
    pub fn take_completed(&mut self) -> bool {
        std::mem::take(&mut self.completed)
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}
