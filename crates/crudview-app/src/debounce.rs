// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};
use tracing::trace;

pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(100);

/// Coalesces bursts of activity. The caller supplies the clock, so nothing
/// here sleeps or spawns; `poll` fires once per burst after the window of
/// quiet has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    window: Duration,
    last_activity: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}

impl Debouncer {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_activity: None,
        }
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    pub const fn is_pending(&self) -> bool {
        self.last_activity.is_some()
    }

    pub fn touch(&mut self, now: Instant) {
        trace!("field activity noted");
        self.last_activity = Some(now);
    }

    /// When the pending burst will be due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_activity.map(|last| last + self.window)
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_activity {
            Some(last) if now.saturating_duration_since(last) >= self.window => {
                self.last_activity = None;
                trace!("debounce window elapsed");
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.last_activity = None;
    }
}
