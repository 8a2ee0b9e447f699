//! The staking ledger: deposits, withdrawals, delegation and checkpointed reads.

use std::collections::HashMap;

use quorum_types::{
    Address, BalanceCustodian, DaoEvent, Epoch, EpochClock, ParamsError, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::checkpoint::{StakerData, StakerTimeline};
use crate::error::StakingError;
use crate::withdrawal::WithdrawalHandler;

/// Construction parameters of a [`StakeLedger`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Identity the ledger presents when calling into governance.
    pub address: Address,
    /// The staked asset.
    pub token: Address,
    /// The only caller allowed to seal-and-read current-epoch data.
    pub dao: Address,
    pub start_time: Timestamp,
    pub epoch_period_secs: u64,
}

/// What a successful withdrawal did to the current epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub epoch: Epoch,
    /// How far the current-epoch stake was lowered (zero if it stayed put).
    pub current_epoch_reduction: u128,
    /// Identity whose votes were corrected: the withdrawer or their representative.
    pub corrected: Option<Address>,
    /// Display form of the handler error, if the vote correction failed.
    pub correction_error: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct LedgerSnapshot {
    config: StakingConfig,
    clock: EpochClock,
    stakers: HashMap<Address, StakerTimeline>,
}

/// Per-participant checkpointed stake and one-level delegation.
pub struct StakeLedger {
    config: StakingConfig,
    clock: EpochClock,
    stakers: HashMap<Address, StakerTimeline>,
    pending_events: Vec<DaoEvent>,
}

impl StakeLedger {
    pub fn new(config: StakingConfig, now: Timestamp) -> Result<Self, StakingError> {
        if config.address.is_zero() {
            return Err(StakingError::ZeroAddress("staking"));
        }
        if config.token.is_zero() {
            return Err(StakingError::ZeroAddress("token"));
        }
        if config.dao.is_zero() {
            return Err(StakingError::ZeroAddress("dao"));
        }
        if config.start_time < now {
            return Err(ParamsError::StartInPast {
                start: config.start_time.as_secs(),
                now: now.as_secs(),
            }
            .into());
        }
        let clock = EpochClock::new(config.start_time, config.epoch_period_secs)?;
        Ok(Self {
            config,
            clock,
            stakers: HashMap::new(),
            pending_events: Vec::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn token(&self) -> Address {
        self.config.token
    }

    pub fn dao(&self) -> Address {
        self.config.dao
    }

    pub fn clock(&self) -> &EpochClock {
        &self.clock
    }

    pub fn current_epoch(&self, now: Timestamp) -> Epoch {
        self.clock.epoch_at(now)
    }

    /// Drain the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<DaoEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Move `amount` from `staker` into custody and credit it from the next epoch on.
    ///
    /// The current epoch keeps its opening value; a delegate's delegated stake
    /// follows in the same call.
    pub fn deposit(
        &mut self,
        custodian: &mut dyn BalanceCustodian,
        staker: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        if staker.is_zero() {
            return Err(StakingError::ZeroAddress("staker"));
        }
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let cur = self.current_epoch(now);

        let latest = self.latest_normalized(staker);
        let new_stake = latest
            .stake
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let rep = latest.representative;
        let new_rep_delegated = if rep != *staker {
            Some(
                self.latest_normalized(&rep)
                    .delegated_stake
                    .checked_add(amount)
                    .ok_or(StakingError::Overflow)?,
            )
        } else {
            None
        };

        custodian.transfer_in(staker, amount)?;

        let timeline = self.seal(staker, cur);
        timeline.latest_mut().stake = new_stake;
        timeline.advance(cur);
        if let Some(delegated) = new_rep_delegated {
            let rep_timeline = self.seal(&rep, cur);
            rep_timeline.latest_mut().delegated_stake = delegated;
            rep_timeline.advance(cur);
        }

        debug!(%staker, epoch = cur, amount, stake = new_stake, "deposit");
        self.pending_events.push(DaoEvent::Deposited {
            staker: *staker,
            epoch: cur,
            amount,
        });
        Ok(())
    }

    /// Release `amount` of `staker`'s latest stake.
    ///
    /// If the withdrawal leaves less than the current epoch's stake, that
    /// checkpoint (and the current representative's delegated stake) is lowered
    /// and `handler` is told about the reduction. The handler runs only after
    /// every ledger write is done; its failure is reported, never propagated.
    pub fn withdraw<H: WithdrawalHandler + ?Sized>(
        &mut self,
        custodian: &mut dyn BalanceCustodian,
        handler: &mut H,
        staker: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<WithdrawReceipt, StakingError> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let cur = self.current_epoch(now);

        let latest = self.latest_normalized(staker);
        if latest.stake < amount {
            return Err(StakingError::InsufficientStake {
                requested: amount,
                available: latest.stake,
            });
        }
        let new_stake = latest.stake - amount;
        let latest_rep = latest.representative;
        let new_latest_rep_delegated = if latest_rep != *staker {
            Some(
                self.latest_normalized(&latest_rep)
                    .delegated_stake
                    .checked_sub(amount)
                    .ok_or(StakingError::Underflow)?,
            )
        } else {
            None
        };

        let opening = self.opening(staker, cur);
        let reduction = opening.stake.saturating_sub(new_stake);
        let cur_rep = opening.representative;
        let new_cur_rep_delegated = if reduction > 0 && cur_rep != *staker {
            Some(
                self.opening(&cur_rep, cur)
                    .delegated_stake
                    .checked_sub(reduction)
                    .ok_or(StakingError::Underflow)?,
            )
        } else {
            None
        };

        custodian.transfer_out(staker, amount)?;

        // Seal every touched participant before writing anything, so each
        // current-epoch checkpoint captures its pre-withdrawal value.
        self.seal(staker, cur);
        if new_latest_rep_delegated.is_some() {
            self.seal(&latest_rep, cur);
        }
        if new_cur_rep_delegated.is_some() {
            self.seal(&cur_rep, cur);
        }

        let timeline = self.timeline_mut(staker);
        timeline.latest_mut().stake = new_stake;
        timeline.advance(cur);
        if reduction > 0 {
            if let Some(checkpoint) = timeline.checkpoint_mut(cur) {
                checkpoint.stake = new_stake;
            }
        }
        if let Some(delegated) = new_latest_rep_delegated {
            let rep_timeline = self.timeline_mut(&latest_rep);
            rep_timeline.latest_mut().delegated_stake = delegated;
            rep_timeline.advance(cur);
        }
        if let Some(delegated) = new_cur_rep_delegated {
            if let Some(checkpoint) = self.timeline_mut(&cur_rep).checkpoint_mut(cur) {
                checkpoint.delegated_stake = delegated;
            }
        }

        debug!(%staker, epoch = cur, amount, reduction, stake = new_stake, "withdraw");
        self.pending_events.push(DaoEvent::Withdrawn {
            staker: *staker,
            epoch: cur,
            amount,
        });

        let mut receipt = WithdrawReceipt {
            epoch: cur,
            current_epoch_reduction: reduction,
            corrected: None,
            correction_error: None,
        };
        if reduction == 0 {
            return Ok(receipt);
        }

        receipt.corrected = Some(cur_rep);
        if let Err(e) = handler.handle_withdrawal(&*self, &cur_rep, reduction, now) {
            let reason = e.to_string();
            warn!(%staker, representative = %cur_rep, epoch = cur, reduction, %reason, "vote correction failed; withdrawal kept");
            self.pending_events.push(DaoEvent::WithdrawCorrectionFailed {
                staker: *staker,
                epoch: cur,
                reduced_by: reduction,
                reason: reason.clone(),
            });
            receipt.correction_error = Some(reason);
        }
        Ok(receipt)
    }

    /// Point `staker`'s weight at `representative` from the next epoch on.
    ///
    /// Delegating to oneself undoes a delegation; delegating to the current
    /// representative changes nothing.
    pub fn delegate(
        &mut self,
        staker: &Address,
        representative: &Address,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        if representative.is_zero() {
            return Err(StakingError::ZeroRepresentative);
        }
        if staker.is_zero() {
            return Err(StakingError::ZeroAddress("staker"));
        }
        let cur = self.current_epoch(now);

        let latest = self.latest_normalized(staker);
        let old_rep = latest.representative;
        if old_rep == *representative {
            self.seal(staker, cur);
            return Ok(());
        }
        let stake = latest.stake;
        let old_rep_delegated = if old_rep != *staker {
            Some(
                self.latest_normalized(&old_rep)
                    .delegated_stake
                    .checked_sub(stake)
                    .ok_or(StakingError::Underflow)?,
            )
        } else {
            None
        };
        let new_rep_delegated = if representative != staker {
            Some(
                self.latest_normalized(representative)
                    .delegated_stake
                    .checked_add(stake)
                    .ok_or(StakingError::Overflow)?,
            )
        } else {
            None
        };

        let timeline = self.seal(staker, cur);
        timeline.latest_mut().representative = *representative;
        timeline.advance(cur);

        if let Some(delegated) = old_rep_delegated {
            let old_timeline = self.seal(&old_rep, cur);
            old_timeline.latest_mut().delegated_stake = delegated;
            old_timeline.advance(cur);
            self.pending_events.push(DaoEvent::Delegated {
                staker: *staker,
                representative: old_rep,
                epoch: cur,
                is_delegated: false,
            });
        }
        if let Some(delegated) = new_rep_delegated {
            let new_timeline = self.seal(representative, cur);
            new_timeline.latest_mut().delegated_stake = delegated;
            new_timeline.advance(cur);
            self.pending_events.push(DaoEvent::Delegated {
                staker: *staker,
                representative: *representative,
                epoch: cur,
                is_delegated: true,
            });
        }

        debug!(%staker, from = %old_rep, to = %representative, epoch = cur, stake, "delegate");
        Ok(())
    }

    /// Seal `staker`'s current epoch (and their representative's) and return
    /// the current-epoch data. Only the configured DAO may call this.
    pub fn init_and_return_current_epoch_data(
        &mut self,
        caller: &Address,
        staker: &Address,
        now: Timestamp,
    ) -> Result<StakerData, StakingError> {
        if *caller != self.config.dao {
            return Err(StakingError::Unauthorized { caller: *caller });
        }
        let cur = self.current_epoch(now);
        let data = self.opening(staker, cur);
        self.seal(staker, cur);
        if data.representative != *staker {
            self.seal(&data.representative, cur);
        }
        Ok(data)
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn get_stake(&self, staker: &Address, epoch: Epoch, now: Timestamp) -> u128 {
        self.get_staker_data(staker, epoch, now).stake
    }

    pub fn get_delegated_stake(&self, staker: &Address, epoch: Epoch, now: Timestamp) -> u128 {
        self.get_staker_data(staker, epoch, now).delegated_stake
    }

    pub fn get_representative(&self, staker: &Address, epoch: Epoch, now: Timestamp) -> Address {
        self.get_staker_data(staker, epoch, now).representative
    }

    /// Data in force for `staker` at `epoch`. Epochs past `current + 1` read as default.
    pub fn get_staker_data(&self, staker: &Address, epoch: Epoch, now: Timestamp) -> StakerData {
        if epoch > self.current_epoch(now) + 1 {
            return StakerData::default();
        }
        self.stakers
            .get(staker)
            .map(|t| t.at_or_before(epoch))
            .unwrap_or_default()
    }

    /// The checkpoint written for exactly `epoch`, without looking backwards.
    pub fn get_staker_raw_data(&self, staker: &Address, epoch: Epoch) -> StakerData {
        self.stakers
            .get(staker)
            .and_then(|t| t.checkpoint(epoch).copied())
            .unwrap_or_default()
    }

    pub fn has_inited(&self, staker: &Address, epoch: Epoch) -> bool {
        self.stakers
            .get(staker)
            .is_some_and(|t| t.is_inited(epoch))
    }

    pub fn get_latest_stake(&self, staker: &Address) -> u128 {
        self.get_latest_staker_data(staker).stake
    }

    pub fn get_latest_delegated_stake(&self, staker: &Address) -> u128 {
        self.get_latest_staker_data(staker).delegated_stake
    }

    pub fn get_latest_representative(&self, staker: &Address) -> Address {
        self.get_latest_staker_data(staker).representative
    }

    pub fn get_latest_staker_data(&self, staker: &Address) -> StakerData {
        self.stakers
            .get(staker)
            .map(|t| *t.latest())
            .unwrap_or_default()
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Serialize every checkpoint and live snapshot.
    pub fn save_state(&self) -> Result<Vec<u8>, StakingError> {
        let snapshot = LedgerSnapshot {
            config: self.config.clone(),
            clock: self.clock,
            stakers: self.stakers.clone(),
        };
        bincode::serialize(&snapshot).map_err(|e| StakingError::Serialization(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, StakingError> {
        let snapshot: LedgerSnapshot =
            bincode::deserialize(data).map_err(|e| StakingError::Serialization(e.to_string()))?;
        Ok(Self {
            config: snapshot.config,
            clock: snapshot.clock,
            stakers: snapshot.stakers,
            pending_events: Vec::new(),
        })
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn timeline_mut(&mut self, staker: &Address) -> &mut StakerTimeline {
        self.stakers.entry(*staker).or_default()
    }

    fn seal(&mut self, staker: &Address, cur: Epoch) -> &mut StakerTimeline {
        let timeline = self.timeline_mut(staker);
        timeline.seal(staker, cur);
        timeline
    }

    /// Latest snapshot with an unset representative read as self.
    fn latest_normalized(&self, staker: &Address) -> StakerData {
        let mut data = self.get_latest_staker_data(staker);
        if data.representative.is_zero() {
            data.representative = *staker;
        }
        data
    }

    fn opening(&self, staker: &Address, cur: Epoch) -> StakerData {
        match self.stakers.get(staker) {
            Some(t) => t.opening(staker, cur),
            None => StakerData {
                representative: *staker,
                ..StakerData::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::withdrawal::NoopWithdrawalHandler;
    use quorum_nullables::NullCustodian;

    const PERIOD: u64 = 100;
    const START: u64 = 1000;

    fn addr(n: u8) -> Address {
        Address::repeat_byte(n)
    }

    fn dao() -> Address {
        addr(0xda)
    }

    /// Timestamp inside epoch `e` (offset seconds after its start).
    fn at(e: Epoch, offset: u64) -> Timestamp {
        if e == 0 {
            return Timestamp::new(START - 100 + offset);
        }
        Timestamp::new(START + (e - 1) * PERIOD + offset)
    }

    fn ledger() -> StakeLedger {
        StakeLedger::new(
            StakingConfig {
                address: addr(0x57),
                token: addr(0x70),
                dao: dao(),
                start_time: Timestamp::new(START),
                epoch_period_secs: PERIOD,
            },
            Timestamp::new(START - 100),
        )
        .unwrap()
    }

    fn custodian() -> NullCustodian {
        let mut c = NullCustodian::new();
        for n in 1..=5 {
            c.mint(&addr(n), 1_000_000);
        }
        c
    }

    #[test]
    fn construction_rejects_bad_config() {
        let now = Timestamp::new(START);
        let good = StakingConfig {
            address: addr(0x57),
            token: addr(0x70),
            dao: dao(),
            start_time: Timestamp::new(START),
            epoch_period_secs: PERIOD,
        };
        assert!(StakeLedger::new(good.clone(), now).is_ok());

        let zero_token = StakingConfig {
            token: Address::ZERO,
            ..good.clone()
        };
        assert!(matches!(
            StakeLedger::new(zero_token, now),
            Err(StakingError::ZeroAddress("token"))
        ));

        let zero_dao = StakingConfig {
            dao: Address::ZERO,
            ..good.clone()
        };
        assert!(matches!(
            StakeLedger::new(zero_dao, now),
            Err(StakingError::ZeroAddress("dao"))
        ));

        let zero_period = StakingConfig {
            epoch_period_secs: 0,
            ..good.clone()
        };
        assert!(matches!(
            StakeLedger::new(zero_period, now),
            Err(StakingError::Params(ParamsError::ZeroEpochPeriod))
        ));

        assert!(matches!(
            StakeLedger::new(good, Timestamp::new(START + 1)),
            Err(StakingError::Params(ParamsError::StartInPast { .. }))
        ));
    }

    #[test]
    fn deposit_credits_next_epoch_only() {
        let mut l = ledger();
        let mut c = custodian();
        let a = addr(1);

        l.deposit(&mut c, &a, 100, at(1, 0)).unwrap();
        assert_eq!(l.get_stake(&a, 1, at(1, 0)), 0);
        assert_eq!(l.get_stake(&a, 2, at(1, 0)), 100);
        assert_eq!(l.get_latest_stake(&a), 100);
        assert_eq!(l.get_representative(&a, 1, at(1, 0)), a);
        assert_eq!(c.balance_of(&a), 1_000_000 - 100);

        l.deposit(&mut c, &a, 50, at(1, 99)).unwrap();
        assert_eq!(l.get_stake(&a, 1, at(1, 99)), 0);
        assert_eq!(l.get_stake(&a, 2, at(1, 99)), 150);

        // Epochs after the next one are never predicted.
        assert_eq!(l.get_stake(&a, 3, at(1, 99)), 0);
        assert_eq!(l.get_stake(&a, 3, at(2, 0)), 150);
        assert_eq!(l.get_stake(&a, 10, at(9, 0)), 150);
    }

    #[test]
    fn zero_amounts_rejected() {
        let mut l = ledger();
        let mut c = custodian();
        assert!(matches!(
            l.deposit(&mut c, &addr(1), 0, at(1, 0)),
            Err(StakingError::ZeroAmount)
        ));
        assert!(matches!(
            l.withdraw(&mut c, &mut NoopWithdrawalHandler, &addr(1), 0, at(1, 0)),
            Err(StakingError::ZeroAmount)
        ));
    }

    #[test]
    fn failed_transfer_in_leaves_no_trace() {
        let mut l = ledger();
        let mut c = NullCustodian::new();
        let a = addr(1);
        assert!(matches!(
            l.deposit(&mut c, &a, 10, at(1, 0)),
            Err(StakingError::Custodian(_))
        ));
        assert!(!l.has_inited(&a, 1));
        assert!(l.take_events().is_empty());
    }

    #[test]
    fn withdraw_more_than_latest_rejected() {
        let mut l = ledger();
        let mut c = custodian();
        let a = addr(1);
        l.deposit(&mut c, &a, 100, at(0, 0)).unwrap();
        let err = l
            .withdraw(&mut c, &mut NoopWithdrawalHandler, &a, 101, at(1, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            StakingError::InsufficientStake {
                requested: 101,
                available: 100
            }
        ));
    }

    #[test]
    fn withdraw_lowers_current_epoch_to_latest() {
        let mut l = ledger();
        let mut c = custodian();
        let a = addr(1);
        l.deposit(&mut c, &a, 300, at(0, 0)).unwrap();
        l.deposit(&mut c, &a, 100, at(1, 0)).unwrap();

        // Epoch 1 opened with 300, latest is 400.
        let receipt = l
            .withdraw(&mut c, &mut NoopWithdrawalHandler, &a, 350, at(1, 1))
            .unwrap();
        assert_eq!(receipt.current_epoch_reduction, 250);
        assert_eq!(receipt.corrected, Some(a));
        assert_eq!(l.get_stake(&a, 1, at(1, 1)), 50);
        assert_eq!(l.get_stake(&a, 2, at(1, 1)), 50);
        assert_eq!(l.get_latest_stake(&a), 50);
    }

    #[test]
    fn withdraw_within_new_deposit_keeps_current_epoch() {
        let mut l = ledger();
        let mut c = custodian();
        let a = addr(1);
        l.deposit(&mut c, &a, 400, at(0, 0)).unwrap();
        l.deposit(&mut c, &a, 100, at(1, 0)).unwrap();
        let receipt = l
            .withdraw(&mut c, &mut NoopWithdrawalHandler, &a, 50, at(1, 1))
            .unwrap();
        assert_eq!(receipt.current_epoch_reduction, 0);
        assert_eq!(receipt.corrected, None);
        assert_eq!(l.get_stake(&a, 1, at(1, 1)), 400);
        assert_eq!(l.get_stake(&a, 2, at(1, 1)), 450);
    }

    #[test]
    fn delegation_moves_stake_between_representatives() {
        let mut l = ledger();
        let mut c = custodian();
        let (victor, mike, loi) = (addr(1), addr(2), addr(3));
        l.deposit(&mut c, &victor, 100, at(0, 0)).unwrap();

        l.delegate(&victor, &mike, at(0, 1)).unwrap();
        assert_eq!(l.get_delegated_stake(&mike, 1, at(0, 1)), 100);
        assert_eq!(l.get_latest_delegated_stake(&mike), 100);
        assert_eq!(l.get_representative(&victor, 1, at(0, 1)), mike);

        // Mid-epoch redelegation only affects the next epoch.
        l.delegate(&victor, &loi, at(1, 5)).unwrap();
        assert_eq!(l.get_delegated_stake(&mike, 1, at(1, 5)), 100);
        assert_eq!(l.get_delegated_stake(&mike, 2, at(1, 5)), 0);
        assert_eq!(l.get_delegated_stake(&loi, 2, at(1, 5)), 100);
        assert_eq!(l.get_representative(&victor, 1, at(1, 5)), mike);
        assert_eq!(l.get_representative(&victor, 2, at(1, 5)), loi);

        // Back to self.
        l.delegate(&victor, &victor, at(1, 6)).unwrap();
        assert_eq!(l.get_latest_delegated_stake(&loi), 0);
        assert_eq!(l.get_latest_representative(&victor), victor);

        let events = l.take_events();
        let delegations = events
            .iter()
            .filter(|e| matches!(e, DaoEvent::Delegated { .. }))
            .count();
        assert_eq!(delegations, 4);
    }

    #[test]
    fn delegate_to_zero_rejected() {
        let mut l = ledger();
        assert!(matches!(
            l.delegate(&addr(1), &Address::ZERO, at(1, 0)),
            Err(StakingError::ZeroRepresentative)
        ));
    }

    #[test]
    fn delegating_to_current_representative_is_noop() {
        let mut l = ledger();
        let mut c = custodian();
        let (a, b) = (addr(1), addr(2));
        l.deposit(&mut c, &a, 10, at(0, 0)).unwrap();
        l.delegate(&a, &b, at(0, 0)).unwrap();
        l.take_events();
        l.delegate(&a, &b, at(2, 0)).unwrap();
        assert!(l.take_events().is_empty());
        assert_eq!(l.get_latest_delegated_stake(&b), 10);
    }

    #[test]
    fn deposit_while_delegated_follows_to_representative() {
        let mut l = ledger();
        let mut c = custodian();
        let (a, b) = (addr(1), addr(2));
        l.deposit(&mut c, &a, 10, at(0, 0)).unwrap();
        l.delegate(&a, &b, at(0, 0)).unwrap();
        l.deposit(&mut c, &a, 5, at(1, 0)).unwrap();
        assert_eq!(l.get_delegated_stake(&b, 1, at(1, 0)), 10);
        assert_eq!(l.get_delegated_stake(&b, 2, at(1, 0)), 15);
    }

    #[test]
    fn delegated_withdrawal_scenario() {
        let mut l = ledger();
        let mut c = custodian();
        let (staker, m) = (addr(1), addr(2));
        l.deposit(&mut c, &staker, 50, at(0, 0)).unwrap();
        l.delegate(&staker, &m, at(0, 1)).unwrap();
        assert_eq!(l.get_delegated_stake(&m, 1, at(0, 1)), 50);

        let receipt = l
            .withdraw(&mut c, &mut NoopWithdrawalHandler, &staker, 50, at(1, 0))
            .unwrap();
        assert_eq!(receipt.corrected, Some(m));
        assert_eq!(l.get_delegated_stake(&m, 1, at(1, 0)), 0);
        assert_eq!(l.get_latest_delegated_stake(&m), 0);
    }

    #[test]
    fn init_and_return_requires_dao() {
        let mut l = ledger();
        assert!(matches!(
            l.init_and_return_current_epoch_data(&addr(9), &addr(1), at(1, 0)),
            Err(StakingError::Unauthorized { .. })
        ));
    }

    #[test]
    fn init_and_return_seals_current_epoch() {
        let mut l = ledger();
        let mut c = custodian();
        let a = addr(1);
        l.deposit(&mut c, &a, 10, at(0, 0)).unwrap();

        let data = l.init_and_return_current_epoch_data(&dao(), &a, at(3, 0)).unwrap();
        assert_eq!(data.stake, 10);
        assert_eq!(data.representative, a);
        assert!(l.has_inited(&a, 3));
        assert!(l.has_inited(&a, 4));

        l.deposit(&mut c, &a, 5, at(3, 1)).unwrap();
        let again = l.init_and_return_current_epoch_data(&dao(), &a, at(3, 2)).unwrap();
        assert_eq!(again.stake, 10);
    }

    #[test]
    fn raw_data_does_not_look_backwards() {
        let mut l = ledger();
        let mut c = custodian();
        let a = addr(1);
        l.deposit(&mut c, &a, 10, at(1, 0)).unwrap();
        assert_eq!(l.get_staker_raw_data(&a, 2).stake, 10);
        assert_eq!(l.get_staker_raw_data(&a, 3), StakerData::default());
        assert_eq!(l.get_staker_data(&a, 3, at(2, 0)).stake, 10);
    }

    #[test]
    fn unknown_participant_reads_default() {
        let l = ledger();
        let ghost = addr(7);
        assert_eq!(l.get_staker_data(&ghost, 1, at(1, 0)), StakerData::default());
        assert_eq!(l.get_latest_representative(&ghost), Address::ZERO);
    }

    #[test]
    fn state_survives_save_and_load() {
        let mut l = ledger();
        let mut c = custodian();
        let (a, b) = (addr(1), addr(2));
        l.deposit(&mut c, &a, 70, at(0, 0)).unwrap();
        l.delegate(&a, &b, at(1, 0)).unwrap();

        let bytes = l.save_state().unwrap();
        let restored = StakeLedger::load_state(&bytes).unwrap();
        assert_eq!(restored.dao(), dao());
        assert_eq!(
            restored.get_staker_data(&a, 2, at(1, 0)),
            l.get_staker_data(&a, 2, at(1, 0))
        );
        assert_eq!(restored.get_latest_delegated_stake(&b), 70);
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        assert!(matches!(
            StakeLedger::load_state(&[1, 2, 3]),
            Err(StakingError::Serialization(_))
        ));
    }
}
