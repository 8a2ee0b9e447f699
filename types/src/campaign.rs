//! Campaign identity and kind, shared by governance and the event surface.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Campaign identifier. Ids start at 1 and are never reused.
pub type CampaignId = u64;

/// The kind of a governance campaign.
///
/// `NetworkFee` and `RewardSplit` are reserved kinds: at most one of each may
/// exist per epoch, and their winning option becomes a protocol parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignKind {
    /// Free-form proposal; options are opaque non-zero values.
    General,
    /// Options are network fees in basis points, each below `BPS / 2`.
    NetworkFee,
    /// Options are packed reward/rebate splits whose sum is at most `BPS`.
    RewardSplit,
}

impl CampaignKind {
    /// Whether only one campaign of this kind may exist per epoch.
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::NetworkFee | Self::RewardSplit)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::NetworkFee => "network_fee",
            Self::RewardSplit => "reward_split",
        }
    }
}

impl fmt::Display for CampaignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
