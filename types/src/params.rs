//! DAO parameters: epoch schedule, campaign limits and protocol-parameter defaults.
//!
//! Loadable from TOML; every field falls back to its default when omitted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::amount::BPS;
use crate::epoch::EpochClock;
use crate::error::ParamsError;
use crate::time::Timestamp;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoParams {
    // ── Epochs ───────────────────────────────────────────────────────────
    /// First second of epoch 1. Must not be in the past at construction.
    #[serde(default)]
    pub start_time: Timestamp,

    /// Length of every epoch in seconds.
    #[serde(default = "default_epoch_period")]
    pub epoch_period_secs: u64,

    // ── Campaigns ────────────────────────────────────────────────────────
    /// Minimum `end - start` of any campaign.
    #[serde(default = "default_min_campaign_duration")]
    pub min_campaign_duration_secs: u64,

    #[serde(default = "default_max_campaign_options")]
    pub max_campaign_options: usize,

    /// Campaigns allowed per epoch, all kinds together.
    #[serde(default = "default_max_epoch_campaigns")]
    pub max_epoch_campaigns: usize,

    // ── Protocol-parameter baselines ─────────────────────────────────────
    #[serde(default = "default_network_fee_bps")]
    pub default_network_fee_bps: u64,

    #[serde(default = "default_reward_bps")]
    pub default_reward_bps: u64,

    #[serde(default = "default_rebate_bps")]
    pub default_rebate_bps: u64,
}

fn default_epoch_period() -> u64 {
    14 * 24 * 3600
}

fn default_min_campaign_duration() -> u64 {
    4 * 24 * 3600
}

fn default_max_campaign_options() -> usize {
    8
}

fn default_max_epoch_campaigns() -> usize {
    10
}

fn default_network_fee_bps() -> u64 {
    25
}

fn default_reward_bps() -> u64 {
    3000
}

fn default_rebate_bps() -> u64 {
    2000
}

impl DaoParams {
    /// Load parameters from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ParamsError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse parameters from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ParamsError> {
        toml::from_str(s).map_err(|e| ParamsError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ParamsError> {
        toml::to_string_pretty(self).map_err(|e| ParamsError::Config(e.to_string()))
    }

    /// Check every construction-time rule against the current time.
    pub fn validate(&self, now: Timestamp) -> Result<(), ParamsError> {
        if self.epoch_period_secs == 0 {
            return Err(ParamsError::ZeroEpochPeriod);
        }
        if self.start_time < now {
            return Err(ParamsError::StartInPast {
                start: self.start_time.as_secs(),
                now: now.as_secs(),
            });
        }
        if self.min_campaign_duration_secs == 0 {
            return Err(ParamsError::ZeroCampaignDuration);
        }
        if self.max_campaign_options < 2 || self.max_epoch_campaigns == 0 {
            return Err(ParamsError::InvalidCampaignLimits);
        }
        let fee = self.default_network_fee_bps as u128;
        if fee >= BPS / 2 {
            return Err(ParamsError::NetworkFeeTooHigh(fee));
        }
        let (reward_bps, rebate_bps) = (
            self.default_reward_bps as u128,
            self.default_rebate_bps as u128,
        );
        if reward_bps + rebate_bps > BPS {
            return Err(ParamsError::RewardPlusRebateTooHigh {
                reward_bps,
                rebate_bps,
            });
        }
        Ok(())
    }

    pub fn epoch_clock(&self) -> Result<EpochClock, ParamsError> {
        EpochClock::new(self.start_time, self.epoch_period_secs)
    }
}

impl Default for DaoParams {
    fn default() -> Self {
        Self {
            start_time: Timestamp::EPOCH,
            epoch_period_secs: default_epoch_period(),
            min_campaign_duration_secs: default_min_campaign_duration(),
            max_campaign_options: default_max_campaign_options(),
            max_epoch_campaigns: default_max_epoch_campaigns(),
            default_network_fee_bps: default_network_fee_bps(),
            default_reward_bps: default_reward_bps(),
            default_rebate_bps: default_rebate_bps(),
        }
    }
}
