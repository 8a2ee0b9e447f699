//! Winner resolution, protocol-parameter adoption and epoch reward claims.

use std::collections::{HashMap, HashSet};

use quorum_types::{
    mul_div, product_gte, Address, CampaignId, DaoEvent, DaoParams, Epoch, EpochClock,
    RewardPool, Timestamp, PRECISION,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::campaign::{Campaign, RewardSplit};
use crate::error::GovernanceError;
use crate::registry::CampaignRegistry;
use crate::votes::{VoteAggregator, VoteLedger};

/// Resolved result of a campaign. Option `0` means no winner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignOutcome {
    pub option: usize,
    pub value: u128,
}

impl CampaignOutcome {
    pub const NONE: Self = Self {
        option: 0,
        value: 0,
    };

    pub fn has_winner(&self) -> bool {
        self.option != 0
    }
}

/// Network fee in force, valid until `expiry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkFeeData {
    pub fee_bps: u128,
    pub expiry: Timestamp,
}

/// Reward/rebate split in force, valid until `expiry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardSplitData {
    pub burn_bps: u128,
    pub reward_bps: u128,
    pub rebate_bps: u128,
    pub epoch: Epoch,
    pub expiry: Timestamp,
}

/// A parameter value and the epoch whose campaign produced it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct Baseline<T> {
    value: T,
    /// `None` for the configured default.
    from_epoch: Option<Epoch>,
}

/// Compute the winner of `campaign` from its tallies, ignoring any cache.
///
/// No winner on an exact tie for the top (all-zero included), on a zero
/// supply snapshot, or when participation `X` is below `min_percentage`.
/// Otherwise the top option wins iff `top / points >= max(c - t * X, 0)`.
pub fn resolve_winner(campaign: &Campaign, tallies: &VoteLedger) -> CampaignOutcome {
    let supply = campaign.total_supply;
    if supply == 0 {
        return CampaignOutcome::NONE;
    }
    let points = tallies.campaign_points(campaign.id);

    let mut top_option = 0usize;
    let mut top_votes = 0u128;
    let mut tied = false;
    for option in 1..=campaign.option_count() {
        let votes = tallies.option_votes(campaign.id, option);
        if top_option == 0 || votes > top_votes {
            top_option = option;
            top_votes = votes;
            tied = false;
        } else if votes == top_votes {
            tied = true;
        }
    }
    if top_option == 0 || tied {
        return CampaignOutcome::NONE;
    }

    let formula = campaign.formula;
    let participation = mul_div(points, PRECISION, supply).unwrap_or(u128::MAX);
    if participation < formula.min_percentage {
        return CampaignOutcome::NONE;
    }
    let threshold = formula
        .c
        .saturating_sub(mul_div(formula.t, participation, PRECISION).unwrap_or(u128::MAX));
    if !product_gte(top_votes, PRECISION, threshold, points) {
        return CampaignOutcome::NONE;
    }
    match campaign.option_value(top_option) {
        Some(value) => CampaignOutcome {
            option: top_option,
            value,
        },
        None => CampaignOutcome::NONE,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RewardCalculator {
    clock: EpochClock,
    outcomes: HashMap<CampaignId, CampaignOutcome>,
    network_fee: Baseline<u128>,
    reward_split: Baseline<RewardSplit>,
    claimed: HashSet<(Address, Epoch)>,
    #[serde(skip)]
    pending_events: Vec<DaoEvent>,
}

impl RewardCalculator {
    pub fn new(params: &DaoParams) -> Result<Self, GovernanceError> {
        Ok(Self {
            clock: params.epoch_clock()?,
            outcomes: HashMap::new(),
            network_fee: Baseline {
                value: params.default_network_fee_bps as u128,
                from_epoch: None,
            },
            reward_split: Baseline {
                value: RewardSplit {
                    reward_bps: params.default_reward_bps as u128,
                    rebate_bps: params.default_rebate_bps as u128,
                },
                from_epoch: None,
            },
            claimed: HashSet::new(),
            pending_events: Vec::new(),
        })
    }

    /// Winner of campaign `id`, `(0, 0)` while it is still running or unknown.
    pub fn campaign_winning_option_and_value(
        &self,
        registry: &CampaignRegistry,
        votes: &VoteAggregator,
        id: CampaignId,
        now: Timestamp,
    ) -> CampaignOutcome {
        if let Some(cached) = self.outcomes.get(&id) {
            return *cached;
        }
        match registry.get_campaign(id) {
            Some(campaign) if campaign.has_ended(now) => resolve_winner(campaign, votes.tallies()),
            _ => CampaignOutcome::NONE,
        }
    }

    /// Resolve campaign `id` once and cache the result.
    pub fn conclude(
        &mut self,
        registry: &CampaignRegistry,
        votes: &VoteAggregator,
        id: CampaignId,
        now: Timestamp,
    ) -> Result<CampaignOutcome, GovernanceError> {
        if let Some(cached) = self.outcomes.get(&id) {
            return Ok(*cached);
        }
        let campaign = registry
            .get_campaign(id)
            .ok_or(GovernanceError::CampaignNotFound(id))?;
        if !campaign.has_ended(now) {
            return Err(GovernanceError::CampaignNotEnded(id));
        }
        let outcome = resolve_winner(campaign, votes.tallies());
        self.outcomes.insert(id, outcome);
        info!(campaign_id = id, option = outcome.option, value = outcome.value, "campaign concluded");
        self.pending_events.push(DaoEvent::CampaignConcluded {
            campaign_id: id,
            option: outcome.option,
            value: outcome.value,
        });
        Ok(outcome)
    }

    /// Cached outcome of campaign `id`, if it has been concluded.
    pub fn winning_option_data(&self, id: CampaignId) -> Option<CampaignOutcome> {
        self.outcomes.get(&id).copied()
    }

    /// Network fee for the current epoch.
    ///
    /// Adopts the winner of the previous epoch's network-fee campaign if there
    /// is one, otherwise keeps the last adopted value (initially the default).
    pub fn latest_network_fee_data(
        &mut self,
        registry: &CampaignRegistry,
        votes: &VoteAggregator,
        now: Timestamp,
    ) -> Result<NetworkFeeData, GovernanceError> {
        let cur = self.clock.epoch_at(now);
        let previous = cur
            .checked_sub(1)
            .and_then(|e| registry.network_fee_campaign(e).map(|id| (e, id)));
        if let Some((epoch, outcome)) = self.previous_epoch_winner(registry, votes, previous, now)? {
            if self.network_fee.from_epoch != Some(epoch) {
                self.network_fee = Baseline {
                    value: outcome.value,
                    from_epoch: Some(epoch),
                };
                info!(epoch, fee_bps = outcome.value, "network fee adopted");
                self.pending_events.push(DaoEvent::NetworkFeeAdopted {
                    epoch,
                    fee_bps: outcome.value,
                });
            }
        }
        Ok(NetworkFeeData {
            fee_bps: self.network_fee.value,
            expiry: self.clock.epoch_end(cur),
        })
    }

    /// Burn/reward/rebate split for the current epoch, with the same fallback
    /// rule as [`Self::latest_network_fee_data`].
    pub fn latest_reward_split_data(
        &mut self,
        registry: &CampaignRegistry,
        votes: &VoteAggregator,
        now: Timestamp,
    ) -> Result<RewardSplitData, GovernanceError> {
        let cur = self.clock.epoch_at(now);
        let previous = cur
            .checked_sub(1)
            .and_then(|e| registry.reward_split_campaign(e).map(|id| (e, id)));
        if let Some((epoch, outcome)) = self.previous_epoch_winner(registry, votes, previous, now)? {
            if self.reward_split.from_epoch != Some(epoch) {
                let split = RewardSplit::decode(outcome.value);
                self.reward_split = Baseline {
                    value: split,
                    from_epoch: Some(epoch),
                };
                info!(epoch, reward_bps = split.reward_bps, rebate_bps = split.rebate_bps, "reward split adopted");
                self.pending_events.push(DaoEvent::RewardSplitAdopted {
                    epoch,
                    reward_bps: split.reward_bps,
                    rebate_bps: split.rebate_bps,
                });
            }
        }
        let split = self.reward_split.value;
        Ok(RewardSplitData {
            burn_bps: split.burn_bps(),
            reward_bps: split.reward_bps,
            rebate_bps: split.rebate_bps,
            epoch: cur,
            expiry: self.clock.epoch_end(cur),
        })
    }

    fn previous_epoch_winner(
        &mut self,
        registry: &CampaignRegistry,
        votes: &VoteAggregator,
        campaign: Option<(Epoch, CampaignId)>,
        now: Timestamp,
    ) -> Result<Option<(Epoch, CampaignOutcome)>, GovernanceError> {
        let Some((epoch, id)) = campaign else {
            return Ok(None);
        };
        let outcome = self.conclude(registry, votes, id, now)?;
        Ok(outcome.has_winner().then_some((epoch, outcome)))
    }

    /// Whether the rewards of a finished epoch should be burnt because nobody voted.
    pub fn should_burn_reward_for_epoch(
        &self,
        votes: &VoteAggregator,
        epoch: Epoch,
        now: Timestamp,
    ) -> bool {
        if epoch >= self.clock.epoch_at(now) {
            return false;
        }
        votes.total_epoch_points(epoch) == 0
    }

    pub fn has_claimed(&self, staker: &Address, epoch: Epoch) -> bool {
        self.claimed.contains(&(*staker, epoch))
    }

    /// Pay `staker` their share of epoch `epoch`'s rewards.
    ///
    /// The claim is recorded only once the pool has paid out.
    pub fn claim_reward(
        &mut self,
        votes: &VoteAggregator,
        pool: &mut dyn RewardPool,
        staker: &Address,
        epoch: Epoch,
        now: Timestamp,
    ) -> Result<u128, GovernanceError> {
        let current = self.clock.epoch_at(now);
        if epoch >= current {
            return Err(GovernanceError::EpochNotOver { epoch, current });
        }
        if self.has_claimed(staker, epoch) {
            return Err(GovernanceError::AlreadyClaimed {
                staker: *staker,
                epoch,
            });
        }
        let percentage = votes.past_epoch_reward_percentage(staker, epoch, now);
        let amount = mul_div(pool.reward_for_epoch(epoch), percentage, PRECISION).unwrap_or(0);
        if percentage == 0 || amount == 0 {
            return Err(GovernanceError::NoRewardToClaim {
                staker: *staker,
                epoch,
            });
        }

        pool.payout(staker, epoch, amount)?;
        self.claimed.insert((*staker, epoch));
        debug!(%staker, epoch, amount, percentage, "reward claimed");
        self.pending_events.push(DaoEvent::RewardClaimed {
            staker: *staker,
            epoch,
            amount,
            percentage,
        });
        Ok(amount)
    }

    pub fn take_events(&mut self) -> Vec<DaoEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Snapshot concluded outcomes, adopted parameters and paid claims.
    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(data).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }
}
