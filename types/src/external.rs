//! Interfaces of the collaborators the DAO core calls but does not implement.
//!
//! The balance custodian actually moves value in and out on deposit/withdraw;
//! the reward pool holds per-epoch rewards and pays them out on claim. Both are
//! fallible, and both must fail loudly: a failed transfer aborts the whole
//! operation before any ledger state changes.

use thiserror::Error;

use crate::address::Address;
use crate::epoch::Epoch;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustodianError {
    #[error("insufficient balance for {owner}: need {needed}, have {available}")]
    InsufficientBalance {
        owner: Address,
        needed: u128,
        available: u128,
    },

    #[error("transfer not authorized for {0}")]
    NotAuthorized(Address),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewardPoolError {
    #[error("reward pool cannot pay {requested}: only {available} left")]
    InsufficientFunds { requested: u128, available: u128 },

    #[error("payout to {0} rejected")]
    Rejected(Address),

    #[error("{0}")]
    Other(String),
}

/// Moves the staked asset between participants and the ledger.
pub trait BalanceCustodian {
    /// Pull `amount` from `from` into custody.
    fn transfer_in(&mut self, from: &Address, amount: u128) -> Result<(), CustodianError>;

    /// Release `amount` from custody to `to`.
    fn transfer_out(&mut self, to: &Address, amount: u128) -> Result<(), CustodianError>;

    /// Total supply of the staked asset, snapshotted into every new campaign.
    fn total_supply(&self) -> u128;
}

/// Holds the rewards accrued for each epoch.
pub trait RewardPool {
    /// Total reward set aside for stakers of `epoch`.
    fn reward_for_epoch(&self, epoch: Epoch) -> u128;

    /// Pay `amount` of the rewards of `epoch` to `to`. Never assumed to succeed.
    fn payout(&mut self, to: &Address, epoch: Epoch, amount: u128) -> Result<(), RewardPoolError>;
}
