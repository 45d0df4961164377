// crates/gridwave-runtime/src/scheduler.rs
//! Debounced viewport resize handling.

use std::time::Duration;

use gridwave_render::{RenderResult, TimerHost, TimerToken};

/// Quiet period after the last resize notification before re-layout.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Cancel-and-restart single-shot timer. Only the most recent resize inside
/// the quiet period survives.
#[derive(Debug)]
pub struct ResizeScheduler {
    delay: Duration,
    pending: Option<TimerToken>,
    next_token: u64,
}

impl Default for ResizeScheduler {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}

impl ResizeScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_token: 0,
        }
    }

    pub fn pending(&self) -> Option<TimerToken> {
        self.pending
    }

    /// Record a resize: cancel the pending timer, if any, and start a new one.
    pub fn notify<T: TimerHost>(&mut self, timers: &mut T) -> RenderResult<TimerToken> {
        self.cancel(timers);

        self.next_token += 1;
        let token = TimerToken(self.next_token);
        timers.set_timeout(token, self.delay)?;
        self.pending = Some(token);
        Ok(token)
    }

    /// A timer elapsed. Returns `true` when it is the live one and the
    /// caller should re-resolve and re-render.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel<T: TimerHost>(&mut self, timers: &mut T) {
        if let Some(token) = self.pending.take() {
            timers.clear_timeout(token);
        }
    }
}
