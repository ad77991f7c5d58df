//! Host-side "solve me again later" capability.

/// Lower bound on the delay between two ticks.
pub const MIN_TICK_INTERVAL_MS: u64 = 10;

/// Requests a new solve after `delay_ms` milliseconds.
pub trait Scheduler {
    fn schedule_solution(&mut self, delay_ms: u64);
}

/// Floor `interval_ms` at [`MIN_TICK_INTERVAL_MS`]. Returns the delay to use
/// and whether it was raised.
#[must_use]
pub fn tick_delay(interval_ms: u64) -> (u64, bool) {
    if interval_ms < MIN_TICK_INTERVAL_MS {
        (MIN_TICK_INTERVAL_MS, true)
    } else {
        (interval_ms, false)
    }
}

/// Holds at most one pending tick; a newer request replaces the older one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingTick {
    delay_ms: Option<u64>,
}

impl PendingTick {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.delay_ms.is_some()
    }

    #[must_use]
    pub fn delay_ms(&self) -> Option<u64> {
        self.delay_ms
    }

    /// Hand the pending request to the caller and clear it.
    pub fn take(&mut self) -> Option<u64> {
        self.delay_ms.take()
    }

    pub fn cancel(&mut self) {
        self.delay_ms = None;
    }
}

impl Scheduler for PendingTick {
    fn schedule_solution(&mut self, delay_ms: u64) {
        self.delay_ms = Some(delay_ms);
    }
}
