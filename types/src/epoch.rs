//! The epoch clock: a pure mapping from timestamps to epoch numbers.
//!
//! Epochs are contiguous, half-open, fixed-length windows. Everything before
//! `start_time` is epoch 0; `[start_time, start_time + period)` is epoch 1, and
//! so on.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::time::Timestamp;

/// Epoch number. Epoch 0 is the period before the DAO starts.
pub type Epoch = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClock {
    start_time: Timestamp,
    period_secs: u64,
}

impl EpochClock {
    pub fn new(start_time: Timestamp, period_secs: u64) -> Result<Self, ParamsError> {
        if period_secs == 0 {
            return Err(ParamsError::ZeroEpochPeriod);
        }
        Ok(Self {
            start_time,
            period_secs,
        })
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }

    /// `0` before `start_time`, otherwise `(t - start) / period + 1`, saturating.
    pub fn epoch_at(&self, t: Timestamp) -> Epoch {
        if t < self.start_time {
            return 0;
        }
        ((t.as_secs() - self.start_time.as_secs()) / self.period_secs).saturating_add(1)
    }

    /// First second of epoch `e` (`start + (e - 1) * period`).
    ///
    /// Epoch 0 has no lower bound and maps to `Timestamp::EPOCH`.
    pub fn epoch_start(&self, e: Epoch) -> Timestamp {
        if e == 0 {
            return Timestamp::EPOCH;
        }
        let offset = (e - 1).saturating_mul(self.period_secs);
        self.start_time.plus_secs(offset)
    }

    /// Last second of epoch `e` (`start + e * period - 1`).
    pub fn epoch_end(&self, e: Epoch) -> Timestamp {
        let offset = e.saturating_mul(self.period_secs);
        Timestamp::new(self.start_time.plus_secs(offset).as_secs().saturating_sub(1))
    }
}
