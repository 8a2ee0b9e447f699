//! Configuration and construction errors shared across crates.

use thiserror::Error;

/// Rejections raised while building the DAO from its parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("epoch period must be non-zero")]
    ZeroEpochPeriod,

    #[error("start time {start} is in the past (now {now})")]
    StartInPast { start: u64, now: u64 },

    #[error("{0} address must be non-zero")]
    ZeroAddress(&'static str),

    #[error("minimum campaign duration must be non-zero")]
    ZeroCampaignDuration,

    #[error("campaign option limits must allow at least two options and one campaign")]
    InvalidCampaignLimits,

    #[error("network fee {0} bps must be below half of BPS")]
    NetworkFeeTooHigh(u128),

    #[error("reward {reward_bps} + rebate {rebate_bps} bps exceeds BPS")]
    RewardPlusRebateTooHigh { reward_bps: u128, rebate_bps: u128 },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("config error: {0}")]
    Config(String),
}
