//! Nullable clock: deterministic time for testing.

use quorum_types::{Epoch, EpochClock, Timestamp};
use std::cell::Cell;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get() + secs);
    }

    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }

    /// Jump to `offset` seconds into epoch `e` of `clock`.
    pub fn jump_to_epoch(&self, clock: &EpochClock, e: Epoch, offset: u64) {
        let start = if e == 0 {
            clock.start_time().as_secs().saturating_sub(clock.period_secs())
        } else {
            clock.epoch_start(e).as_secs()
        };
        self.current.set(start + offset);
    }
}
