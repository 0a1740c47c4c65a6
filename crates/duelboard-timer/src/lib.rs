//! Cancellable one-shot deadlines for Duelboard room actors.
//!
//! A room needs to do something "later" in two places: clear the board
//! a short while after a round ends, and close a room nobody joined.
//! Neither may block the room from handling joins, moves, or
//! disconnects in the meantime, and both must be cancellable.
//!
//! # Integration
//!
//! The timer sits inside a room actor's `tokio::select!` loop. While
//! disarmed, [`Timer::wait`] pends forever, so the branch simply never
//! wins:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         fired = reset_timer.wait() => { /* reset the board */ }
//!     }
//! }
//! ```
//!
//! `wait` only sleeps until a stored deadline, so dropping it halfway
//! (because another branch won) loses nothing. The timer lives inside
//! the actor, which means closing a room drops its pending deadlines
//! with it: nothing can fire for a room that no longer exists.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

/// Information about a deadline that elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired {
    /// Which arming fired (starts at 1, increments on every `arm`).
    pub generation: u64,
    /// How far past the deadline the timer woke.
    pub late_by: Duration,
}

/// A single pending deadline that can be armed, re-armed, or cancelled.
#[derive(Debug)]
pub struct Timer {
    label: &'static str,
    deadline: Option<Instant>,
    generation: u64,
}

impl Timer {
    /// Creates a disarmed timer. `label` only shows up in logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            deadline: None,
            generation: 0,
        }
    }

    /// Arms the timer to fire after `delay`, replacing any pending
    /// deadline. Returns the new generation.
    pub fn arm(&mut self, delay: Duration) -> u64 {
        self.generation += 1;
        self.deadline = Some(Instant::now() + delay);
        debug!(
            timer = self.label,
            generation = self.generation,
            delay_ms = delay.as_millis() as u64,
            "timer armed"
        );
        self.generation
    }

    /// Drops the pending deadline. Returns `true` if one was pending.
    ///
    /// Safe to call when already disarmed.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.deadline.take().is_some();
        if was_armed {
            debug!(timer = self.label, generation = self.generation, "timer cancelled");
        }
        was_armed
    }

    /// Whether a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending deadline, if any.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Waits for the pending deadline, then disarms.
    ///
    /// Pends forever while disarmed.
    pub async fn wait(&mut self) -> Fired {
        let Some(deadline) = self.deadline else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(deadline).await;

        self.deadline = None;
        let late_by = Instant::now().saturating_duration_since(deadline);
        trace!(timer = self.label, generation = self.generation, "timer fired");

        Fired {
            generation: self.generation,
            late_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_disarmed() {
        let mut t = Timer::new("reset");
        assert!(!t.is_armed());
        assert_eq!(t.remaining(), None);
        assert_eq!(t.arm(Duration::from_secs(1)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_counts_down() {
        let mut t = Timer::new("reset");
        t.arm(Duration::from_secs(2));
        assert_eq!(t.remaining(), Some(Duration::from_secs(2)));
        time::advance(Duration::from_millis(500)).await;
        assert_eq!(t.remaining(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_cancel_idempotent() {
        let mut t = Timer::new("reset");
        assert!(!t.cancel());
        assert!(!t.cancel());
    }
}
