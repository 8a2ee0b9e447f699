//! Nullable reward pool: per-epoch rewards with payout recording.

use quorum_types::{Address, Epoch, RewardPool, RewardPoolError};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct NullRewardPool {
    rewards: HashMap<Epoch, u128>,
    paid: HashMap<Epoch, u128>,
    payouts: Vec<(Address, Epoch, u128)>,
    rejecting: bool,
}

impl NullRewardPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reward(&mut self, epoch: Epoch, amount: u128) {
        self.rewards.insert(epoch, amount);
    }

    /// Reject every subsequent payout.
    pub fn reject_payouts(&mut self, reject: bool) {
        self.rejecting = reject;
    }

    /// Every successful payout, in order.
    pub fn payouts(&self) -> &[(Address, Epoch, u128)] {
        &self.payouts
    }

    pub fn paid_for_epoch(&self, epoch: Epoch) -> u128 {
        self.paid.get(&epoch).copied().unwrap_or(0)
    }
}

impl RewardPool for NullRewardPool {
    fn reward_for_epoch(&self, epoch: Epoch) -> u128 {
        self.rewards.get(&epoch).copied().unwrap_or(0)
    }

    fn payout(&mut self, to: &Address, epoch: Epoch, amount: u128) -> Result<(), RewardPoolError> {
        if self.rejecting {
            return Err(RewardPoolError::Rejected(*to));
        }
        let available = self
            .reward_for_epoch(epoch)
            .saturating_sub(self.paid_for_epoch(epoch));
        if amount > available {
            return Err(RewardPoolError::InsufficientFunds {
                requested: amount,
                available,
            });
        }
        *self.paid.entry(epoch).or_default() += amount;
        self.payouts.push((*to, epoch, amount));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pays_until_exhausted() {
        let a = Address::repeat_byte(1);
        let mut pool = NullRewardPool::new();
        pool.set_reward(2, 100);
        pool.payout(&a, 2, 70).unwrap();
        assert!(matches!(
            pool.payout(&a, 2, 31),
            Err(RewardPoolError::InsufficientFunds { available: 30, .. })
        ));
        assert_eq!(pool.payouts(), &[(a, 2, 70)]);
    }

    #[test]
    fn rejection_is_an_error() {
        let mut pool = NullRewardPool::new();
        pool.set_reward(1, 10);
        pool.reject_payouts(true);
        assert!(pool.payout(&Address::repeat_byte(1), 1, 5).is_err());
        assert_eq!(pool.paid_for_epoch(1), 0);
    }
}
