//! The DAO facade: one owner for the ledger, the governance components and
//! the external collaborators, wiring the calls between them.

use quorum_staking::{StakeLedger, StakingConfig, WithdrawReceipt, WithdrawalHandler};
use quorum_types::{
    Address, BalanceCustodian, CampaignId, DaoEvent, DaoParams, Epoch, EventBus, ParamsError,
    RewardPool, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GovernanceError;
use crate::registry::{CampaignRegistry, CampaignRequest};
use crate::reward::{CampaignOutcome, NetworkFeeData, RewardCalculator, RewardSplitData};
use crate::votes::{CampaignVoteData, VoteAggregator};

/// Identities and parameters a [`Dao`] is built from.
#[derive(Clone, Debug)]
pub struct DaoSetup {
    pub params: DaoParams,
    /// Identity of the stake ledger.
    pub staking: Address,
    pub token: Address,
    /// Identity of the DAO itself, the only one allowed to seal voter epochs.
    pub dao: Address,
    /// The only identity allowed to submit and cancel campaigns.
    pub operator: Address,
}

/// Forwards ledger withdrawal notices into vote correction.
struct VoteCorrection<'a> {
    votes: &'a mut VoteAggregator,
    registry: &'a CampaignRegistry,
}

impl WithdrawalHandler for VoteCorrection<'_> {
    type Error = GovernanceError;

    fn handle_withdrawal(
        &mut self,
        ledger: &StakeLedger,
        staker: &Address,
        reduced_by: u128,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.votes
            .handle_withdrawal(&ledger.address(), self.registry, staker, reduced_by, now)
    }
}

/// Serialized component states, each in its own bincode blob.
#[derive(Serialize, Deserialize)]
struct DaoSnapshot {
    ledger: Vec<u8>,
    registry: Vec<u8>,
    votes: Vec<u8>,
    rewards: Vec<u8>,
}

pub struct Dao<C: BalanceCustodian, R: RewardPool> {
    operator: Address,
    ledger: StakeLedger,
    registry: CampaignRegistry,
    votes: VoteAggregator,
    rewards: RewardCalculator,
    custodian: C,
    pool: R,
    bus: EventBus,
}

impl<C: BalanceCustodian, R: RewardPool> Dao<C, R> {
    pub fn new(setup: DaoSetup, custodian: C, pool: R, now: Timestamp) -> Result<Self, GovernanceError> {
        setup.params.validate(now)?;
        if setup.operator.is_zero() {
            return Err(ParamsError::ZeroAddress("operator").into());
        }
        let ledger = StakeLedger::new(
            StakingConfig {
                address: setup.staking,
                token: setup.token,
                dao: setup.dao,
                start_time: setup.params.start_time,
                epoch_period_secs: setup.params.epoch_period_secs,
            },
            now,
        )?;
        let clock = setup.params.epoch_clock()?;
        info!(
            start = %setup.params.start_time,
            epoch_period_secs = setup.params.epoch_period_secs,
            operator = %setup.operator,
            "dao initialised"
        );
        Ok(Self {
            operator: setup.operator,
            ledger,
            registry: CampaignRegistry::new(&setup.params)?,
            votes: VoteAggregator::new(clock, setup.staking, setup.dao),
            rewards: RewardCalculator::new(&setup.params)?,
            custodian,
            pool,
            bus: EventBus::new(),
        })
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&DaoEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    pub fn current_epoch(&self, now: Timestamp) -> Epoch {
        self.ledger.current_epoch(now)
    }

    pub fn ledger(&self) -> &StakeLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &CampaignRegistry {
        &self.registry
    }

    pub fn votes(&self) -> &VoteAggregator {
        &self.votes
    }

    pub fn rewards(&self) -> &RewardCalculator {
        &self.rewards
    }

    pub fn custodian(&self) -> &C {
        &self.custodian
    }

    pub fn custodian_mut(&mut self) -> &mut C {
        &mut self.custodian
    }

    pub fn reward_pool(&self) -> &R {
        &self.pool
    }

    pub fn reward_pool_mut(&mut self) -> &mut R {
        &mut self.pool
    }

    // ── Staking ──────────────────────────────────────────────────────────

    pub fn deposit(&mut self, staker: &Address, amount: u128, now: Timestamp) -> Result<(), GovernanceError> {
        let result = self.ledger.deposit(&mut self.custodian, staker, amount, now);
        self.flush_events();
        result.map_err(Into::into)
    }

    /// Withdraw and, if the current epoch shrank, correct running votes.
    pub fn withdraw(
        &mut self,
        staker: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<WithdrawReceipt, GovernanceError> {
        let mut correction = VoteCorrection {
            votes: &mut self.votes,
            registry: &self.registry,
        };
        let result = self
            .ledger
            .withdraw(&mut self.custodian, &mut correction, staker, amount, now);
        self.flush_events();
        result.map_err(Into::into)
    }

    pub fn delegate(
        &mut self,
        staker: &Address,
        representative: &Address,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let result = self.ledger.delegate(staker, representative, now);
        self.flush_events();
        result.map_err(Into::into)
    }

    // ── Campaigns ────────────────────────────────────────────────────────

    pub fn submit_campaign(
        &mut self,
        caller: &Address,
        request: CampaignRequest,
        now: Timestamp,
    ) -> Result<CampaignId, GovernanceError> {
        self.require_operator(caller)?;
        let supply = self.custodian.total_supply();
        let result = self.registry.submit(request, supply, now);
        self.flush_events();
        result
    }

    /// Cancel a campaign before it starts and drop all of its tallies.
    pub fn cancel_campaign(
        &mut self,
        caller: &Address,
        id: CampaignId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.require_operator(caller)?;
        let result = self.registry.cancel(id, now);
        if result.is_ok() {
            self.votes.discard_campaign(id);
        }
        self.flush_events();
        result.map(|_| ())
    }

    pub fn vote(
        &mut self,
        voter: &Address,
        id: CampaignId,
        option: usize,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let result = self
            .votes
            .vote(&mut self.ledger, &self.registry, voter, id, option, now);
        self.flush_events();
        result
    }

    pub fn campaign_vote_data(&self, id: CampaignId) -> CampaignVoteData {
        self.votes.campaign_vote_data(&self.registry, id)
    }

    // ── Outcomes and rewards ─────────────────────────────────────────────

    pub fn campaign_winning_option_and_value(&self, id: CampaignId, now: Timestamp) -> CampaignOutcome {
        self.rewards
            .campaign_winning_option_and_value(&self.registry, &self.votes, id, now)
    }

    pub fn conclude_campaign(
        &mut self,
        id: CampaignId,
        now: Timestamp,
    ) -> Result<CampaignOutcome, GovernanceError> {
        let result = self.rewards.conclude(&self.registry, &self.votes, id, now);
        self.flush_events();
        result
    }

    pub fn winning_option_data(&self, id: CampaignId) -> Option<CampaignOutcome> {
        self.rewards.winning_option_data(id)
    }

    pub fn latest_network_fee_data(&mut self, now: Timestamp) -> Result<NetworkFeeData, GovernanceError> {
        let result = self
            .rewards
            .latest_network_fee_data(&self.registry, &self.votes, now);
        self.flush_events();
        result
    }

    pub fn latest_reward_split_data(&mut self, now: Timestamp) -> Result<RewardSplitData, GovernanceError> {
        let result = self
            .rewards
            .latest_reward_split_data(&self.registry, &self.votes, now);
        self.flush_events();
        result
    }

    pub fn should_burn_reward_for_epoch(&self, epoch: Epoch, now: Timestamp) -> bool {
        self.rewards
            .should_burn_reward_for_epoch(&self.votes, epoch, now)
    }

    pub fn past_epoch_reward_percentage(&self, staker: &Address, epoch: Epoch, now: Timestamp) -> u128 {
        self.votes.past_epoch_reward_percentage(staker, epoch, now)
    }

    pub fn current_epoch_reward_percentage(&self, staker: &Address, now: Timestamp) -> u128 {
        self.votes.current_epoch_reward_percentage(staker, now)
    }

    pub fn claim_reward(
        &mut self,
        staker: &Address,
        epoch: Epoch,
        now: Timestamp,
    ) -> Result<u128, GovernanceError> {
        let result = self
            .rewards
            .claim_reward(&self.votes, &mut self.pool, staker, epoch, now);
        self.flush_events();
        result
    }

    // ── Persistence ──────────────────────────────────────────────────────

    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        let snapshot = DaoSnapshot {
            ledger: self.ledger.save_state()?,
            registry: self.registry.save_state()?,
            votes: self.votes.save_state()?,
            rewards: self.rewards.save_state()?,
        };
        bincode::serialize(&snapshot).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }

    /// Replace every component's state with `data`. Nothing changes on error.
    pub fn load_state(&mut self, data: &[u8]) -> Result<(), GovernanceError> {
        let snapshot: DaoSnapshot =
            bincode::deserialize(data).map_err(|e| GovernanceError::Serialization(e.to_string()))?;
        let ledger = StakeLedger::load_state(&snapshot.ledger)?;
        let registry = CampaignRegistry::load_state(&snapshot.registry)?;
        let rewards = RewardCalculator::load_state(&snapshot.rewards)?;
        self.votes.load_state(&snapshot.votes)?;
        self.ledger = ledger;
        self.registry = registry;
        self.rewards = rewards;
        info!(campaigns = self.registry.campaigns_created(), "dao state restored");
        Ok(())
    }

    fn require_operator(&self, caller: &Address) -> Result<(), GovernanceError> {
        if *caller != self.operator {
            return Err(GovernanceError::NotOperator(*caller));
        }
        Ok(())
    }

    /// Publish everything the components emitted, ledger first.
    fn flush_events(&mut self) {
        let events = self
            .ledger
            .take_events()
            .into_iter()
            .chain(self.registry.take_events())
            .chain(self.votes.take_events())
            .chain(self.rewards.take_events());
        for event in events {
            self.bus.emit(&event);
        }
    }
}
