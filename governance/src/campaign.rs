//! Campaign records and the value encodings of the reserved kinds.

use quorum_types::{CampaignId, CampaignKind, Epoch, Timestamp, BPS, PRECISION};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Winner-formula parameters, all in `PRECISION` fixed point.
///
/// An option wins if participation `X` reaches `min_percentage` and its share of
/// the cast points reaches `max(c - t * X, 0)`. Only `min_percentage` is
/// bounded; `c` and `t` may push the threshold above 100% or below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaParams {
    pub min_percentage: u128,
    pub c: u128,
    pub t: u128,
}

impl FormulaParams {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.min_percentage > PRECISION {
            return Err(GovernanceError::FormulaOutOfRange("min_percentage"));
        }
        Ok(())
    }
}

/// Reward/rebate split carried by a reward-split option, packed as
/// `rebate_bps << 64 | reward_bps`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSplit {
    pub reward_bps: u128,
    pub rebate_bps: u128,
}

impl RewardSplit {
    const LOW_MASK: u128 = u64::MAX as u128;

    pub fn encode(&self) -> u128 {
        (self.rebate_bps << 64) | (self.reward_bps & Self::LOW_MASK)
    }

    pub fn decode(value: u128) -> Self {
        Self {
            reward_bps: value & Self::LOW_MASK,
            rebate_bps: value >> 64,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.reward_bps
            .checked_add(self.rebate_bps)
            .is_some_and(|sum| sum <= BPS)
    }

    /// Whatever is neither rewarded nor rebated gets burnt.
    pub fn burn_bps(&self) -> u128 {
        BPS.saturating_sub(self.reward_bps + self.rebate_bps)
    }
}

/// Whether `value` is an acceptable option for a campaign of `kind`.
pub fn option_value_valid(kind: CampaignKind, value: u128) -> bool {
    match kind {
        CampaignKind::General => value != 0,
        CampaignKind::NetworkFee => value < BPS / 2,
        CampaignKind::RewardSplit => RewardSplit::decode(value).is_valid(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub kind: CampaignKind,
    pub epoch: Epoch,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Option values; option `n` (1-based) is `options[n - 1]`.
    pub options: Vec<u128>,
    pub formula: FormulaParams,
    pub link: String,
    /// Staked-asset supply when the campaign was created.
    pub total_supply: u128,
}

impl Campaign {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn option_value(&self, option: usize) -> Option<u128> {
        option
            .checked_sub(1)
            .and_then(|i| self.options.get(i))
            .copied()
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        self.start <= now && now < self.end
    }

    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.end
    }
}
