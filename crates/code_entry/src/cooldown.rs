use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};

pub const DEFAULT_RESEND_COOLDOWN_SECS: u32 = 60;

/// Seconds left before another resend is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendCooldown {
    length: u32,
    remaining: u32,
}

impl ResendCooldown {
    /// A cooldown that starts running immediately.
    pub fn started(length: u32) -> Self {
        Self {
            length,
            remaining: length,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// One elapsed second. Returns whether the cooldown is still running.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.is_active()
    }

    pub fn restart(&mut self) {
        self.remaining = self.length;
    }
}

impl Default for ResendCooldown {
    fn default() -> Self {
        Self::started(DEFAULT_RESEND_COOLDOWN_SECS)
    }
}

/// Owned handle to a recurring tick.
///
/// The background task is aborted when the handle is cancelled or dropped, so
/// no scheduled work outlives its owner.
#[derive(Debug)]
pub struct CooldownTicker {
    task: JoinHandle<()>,
    ticks: mpsc::UnboundedReceiver<()>,
}

impl CooldownTicker {
    /// Must be called from within a tokio runtime. The first tick fires one
    /// `period` after the call.
    pub fn start(period: Duration) -> Self {
        let (tx, ticks) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });

        Self { task, ticks }
    }

    /// Waits for the next tick. `None` once the ticker has stopped.
    pub async fn next_tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    pub fn cancel(self) {
        self.task.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CooldownTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "tests/cooldown_tests.rs"]
mod tests;
