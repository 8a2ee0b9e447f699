//! Vote tallies and the vote/withdrawal-correction paths that write them.

use std::collections::HashMap;

use quorum_staking::StakeLedger;
use quorum_types::{Address, CampaignId, DaoEvent, Epoch, EpochClock, Timestamp, PRECISION};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GovernanceError;
use crate::registry::CampaignRegistry;

/// What one participant cast in one campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// 1-based option index.
    pub option: usize,
    /// Weight currently counted for this vote, after withdrawal corrections.
    pub weight: u128,
    pub epoch: Epoch,
}

/// Point tallies of a single campaign.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CampaignVoteData {
    /// Votes per option; index 0 is option 1.
    pub option_votes: Vec<u128>,
    pub total_points: u128,
}

/// All vote state: per-option, per-campaign and per-epoch point totals plus
/// each participant's records.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VoteLedger {
    total_points: HashMap<Epoch, u128>,
    campaign_points: HashMap<CampaignId, u128>,
    option_votes: HashMap<(CampaignId, usize), u128>,
    number_votes: HashMap<(Address, Epoch), u64>,
    records: HashMap<(Address, CampaignId), VoteRecord>,
    /// Campaigns each participant voted in during an epoch, in vote order.
    voted_in: HashMap<(Address, Epoch), Vec<CampaignId>>,
}

impl VoteLedger {
    pub fn total_epoch_points(&self, epoch: Epoch) -> u128 {
        self.total_points.get(&epoch).copied().unwrap_or(0)
    }

    pub fn campaign_points(&self, id: CampaignId) -> u128 {
        self.campaign_points.get(&id).copied().unwrap_or(0)
    }

    pub fn option_votes(&self, id: CampaignId, option: usize) -> u128 {
        self.option_votes.get(&(id, option)).copied().unwrap_or(0)
    }

    pub fn number_votes(&self, staker: &Address, epoch: Epoch) -> u64 {
        self.number_votes.get(&(*staker, epoch)).copied().unwrap_or(0)
    }

    pub fn record(&self, staker: &Address, id: CampaignId) -> Option<&VoteRecord> {
        self.records.get(&(*staker, id))
    }

    pub fn voted_option(&self, staker: &Address, id: CampaignId) -> usize {
        self.record(staker, id).map(|r| r.option).unwrap_or(0)
    }

    pub fn campaigns_voted(&self, staker: &Address, epoch: Epoch) -> &[CampaignId] {
        self.voted_in
            .get(&(*staker, epoch))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of the weight `staker` personally contributed across epoch `epoch`.
    pub fn own_weight(&self, staker: &Address, epoch: Epoch) -> u128 {
        self.campaigns_voted(staker, epoch)
            .iter()
            .filter_map(|id| self.record(staker, *id))
            .map(|r| r.weight)
            .fold(0u128, u128::saturating_add)
    }

    /// Take `amount` off one vote and every total it was counted in.
    fn reduce(&mut self, staker: &Address, id: CampaignId, amount: u128) {
        let Some(record) = self.records.get_mut(&(*staker, id)) else {
            return;
        };
        let d = amount.min(record.weight);
        record.weight -= d;
        let (option, epoch) = (record.option, record.epoch);
        for slot in [
            self.option_votes.get_mut(&(id, option)),
            self.campaign_points.get_mut(&id),
            self.total_points.get_mut(&epoch),
        ]
        .into_iter()
        .flatten()
        {
            *slot = slot.saturating_sub(d);
        }
    }

    #[cfg(test)]
    pub(crate) fn seed(&mut self, id: CampaignId, option: usize, votes: u128) {
        *self.option_votes.entry((id, option)).or_default() += votes;
        *self.campaign_points.entry(id).or_default() += votes;
    }

    /// Drop every trace of a campaign as if it never existed.
    pub fn discard_campaign(&mut self, id: CampaignId) {
        let voters: Vec<Address> = self
            .records
            .keys()
            .filter(|(_, c)| *c == id)
            .map(|(voter, _)| *voter)
            .collect();
        for voter in voters {
            if let Some(record) = self.records.remove(&(voter, id)) {
                if let Some(total) = self.total_points.get_mut(&record.epoch) {
                    *total = total.saturating_sub(record.weight);
                }
                if let Some(count) = self.number_votes.get_mut(&(voter, record.epoch)) {
                    *count = count.saturating_sub(1);
                }
                if let Some(ids) = self.voted_in.get_mut(&(voter, record.epoch)) {
                    ids.retain(|c| *c != id);
                }
            }
        }
        self.campaign_points.remove(&id);
        self.option_votes.retain(|(c, _), _| *c != id);
    }
}

/// Casts votes, corrects them after withdrawals and derives reward shares.
pub struct VoteAggregator {
    clock: EpochClock,
    /// Only this identity may report withdrawals.
    staking: Address,
    /// Identity used when asking the ledger to seal a voter's epoch.
    dao: Address,
    ledger: VoteLedger,
    pending_events: Vec<DaoEvent>,
}

impl VoteAggregator {
    pub fn new(clock: EpochClock, staking: Address, dao: Address) -> Self {
        Self {
            clock,
            staking,
            dao,
            ledger: VoteLedger::default(),
            pending_events: Vec::new(),
        }
    }

    pub fn tallies(&self) -> &VoteLedger {
        &self.ledger
    }

    /// Cast or move `voter`'s vote in campaign `id`.
    ///
    /// The voter's current-epoch data is sealed through the stake ledger, so the
    /// weight used here cannot be raised later in the epoch.
    pub fn vote(
        &mut self,
        stakes: &mut StakeLedger,
        registry: &CampaignRegistry,
        voter: &Address,
        id: CampaignId,
        option: usize,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let campaign = registry
            .get_campaign(id)
            .ok_or(GovernanceError::CampaignNotFound(id))?;
        if !campaign.is_open(now) {
            return Err(GovernanceError::VotingClosed(id));
        }
        if campaign.option_value(option).is_none() {
            return Err(GovernanceError::InvalidOption {
                campaign_id: id,
                option,
            });
        }
        let epoch = self.clock.epoch_at(now);

        let data = stakes.init_and_return_current_epoch_data(&self.dao, voter, now)?;
        let weight = data.voting_weight(voter);

        if let Some(previous) = self.ledger.records.get(&(*voter, id)).copied() {
            if previous.option == option {
                debug!(%voter, campaign_id = id, option, "vote reaffirmed");
                self.pending_events.push(DaoEvent::Voted {
                    staker: *voter,
                    epoch,
                    campaign_id: id,
                    option,
                });
                return Ok(());
            }
            let moved = previous.weight;
            let target = self
                .ledger
                .option_votes(id, option)
                .checked_add(moved)
                .ok_or(GovernanceError::Overflow)?;
            if let Some(old) = self.ledger.option_votes.get_mut(&(id, previous.option)) {
                *old = old.saturating_sub(moved);
            }
            self.ledger.option_votes.insert((id, option), target);
            if let Some(record) = self.ledger.records.get_mut(&(*voter, id)) {
                record.option = option;
            }
            debug!(%voter, campaign_id = id, from = previous.option, to = option, weight = moved, "vote changed");
            self.pending_events.push(DaoEvent::VoteChanged {
                staker: *voter,
                epoch,
                campaign_id: id,
                old_option: previous.option,
                new_option: option,
            });
            return Ok(());
        }

        let option_total = self.ledger.option_votes(id, option);
        let campaign_total = self.ledger.campaign_points(id);
        let epoch_total = self.ledger.total_epoch_points(epoch);
        let overflow = option_total.checked_add(weight).is_none()
            || campaign_total.checked_add(weight).is_none()
            || epoch_total.checked_add(weight).is_none();
        if overflow {
            return Err(GovernanceError::Overflow);
        }
        self.ledger.option_votes.insert((id, option), option_total + weight);
        self.ledger.campaign_points.insert(id, campaign_total + weight);
        self.ledger.total_points.insert(epoch, epoch_total + weight);
        *self.ledger.number_votes.entry((*voter, epoch)).or_default() += 1;
        self.ledger.voted_in.entry((*voter, epoch)).or_default().push(id);
        self.ledger.records.insert(
            (*voter, id),
            VoteRecord {
                option,
                weight,
                epoch,
            },
        );

        debug!(%voter, campaign_id = id, option, weight, epoch, "vote cast");
        self.pending_events.push(DaoEvent::Voted {
            staker: *voter,
            epoch,
            campaign_id: id,
            option,
        });
        Ok(())
    }

    /// Lower `staker`'s still-running current-epoch votes by up to `reduced_by` each.
    pub fn handle_withdrawal(
        &mut self,
        caller: &Address,
        registry: &CampaignRegistry,
        staker: &Address,
        reduced_by: u128,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if *caller != self.staking {
            return Err(GovernanceError::Unauthorized { caller: *caller });
        }
        if reduced_by == 0 {
            return Ok(());
        }
        let epoch = self.clock.epoch_at(now);
        let active: Vec<CampaignId> = self
            .ledger
            .campaigns_voted(staker, epoch)
            .iter()
            .copied()
            .filter(|id| {
                registry
                    .get_campaign(*id)
                    .is_some_and(|c| !c.has_ended(now))
            })
            .collect();
        for id in &active {
            self.ledger.reduce(staker, *id, reduced_by);
        }
        debug!(%staker, epoch, reduced_by, campaigns = active.len(), "votes corrected after withdrawal");
        Ok(())
    }

    /// Share of epoch `epoch`'s points contributed by `staker`, in `PRECISION`.
    pub fn staker_reward_percentage(&self, staker: &Address, epoch: Epoch) -> u128 {
        let total = self.ledger.total_epoch_points(epoch);
        if total == 0 {
            return 0;
        }
        let own = self.ledger.own_weight(staker, epoch);
        quorum_types::mul_div(own, PRECISION, total).unwrap_or(0)
    }

    /// Reward share for a finished epoch; zero for the current or later epochs.
    pub fn past_epoch_reward_percentage(
        &self,
        staker: &Address,
        epoch: Epoch,
        now: Timestamp,
    ) -> u128 {
        if epoch >= self.clock.epoch_at(now) {
            return 0;
        }
        self.staker_reward_percentage(staker, epoch)
    }

    pub fn current_epoch_reward_percentage(&self, staker: &Address, now: Timestamp) -> u128 {
        self.staker_reward_percentage(staker, self.clock.epoch_at(now))
    }

    pub fn number_votes(&self, staker: &Address, epoch: Epoch) -> u64 {
        self.ledger.number_votes(staker, epoch)
    }

    pub fn voted_option(&self, staker: &Address, id: CampaignId) -> usize {
        self.ledger.voted_option(staker, id)
    }

    pub fn total_epoch_points(&self, epoch: Epoch) -> u128 {
        self.ledger.total_epoch_points(epoch)
    }

    pub fn campaign_vote_data(&self, registry: &CampaignRegistry, id: CampaignId) -> CampaignVoteData {
        let option_count = registry
            .get_campaign(id)
            .map(|c| c.option_count())
            .unwrap_or(0);
        CampaignVoteData {
            option_votes: (1..=option_count)
                .map(|o| self.ledger.option_votes(id, o))
                .collect(),
            total_points: self.ledger.campaign_points(id),
        }
    }

    pub fn discard_campaign(&mut self, id: CampaignId) {
        self.ledger.discard_campaign(id);
    }

    pub fn take_events(&mut self) -> Vec<DaoEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Serialize the tallies.
    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(&self.ledger).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }

    pub fn load_state(&mut self, data: &[u8]) -> Result<(), GovernanceError> {
        self.ledger =
            bincode::deserialize(data).map_err(|e| GovernanceError::Serialization(e.to_string()))?;
        Ok(())
    }
}
