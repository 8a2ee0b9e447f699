//! Nullable balance custodian: an in-memory token ledger.

use quorum_types::{Address, BalanceCustodian, CustodianError};
use std::collections::HashMap;

/// In-memory custodian holding free balances and the amount in custody.
///
/// `total_supply` is the sum of everything ever minted unless overridden.
#[derive(Debug, Default)]
pub struct NullCustodian {
    balances: HashMap<Address, u128>,
    custody: u128,
    minted: u128,
    supply_override: Option<u128>,
    fail_transfers: bool,
}

impl NullCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, to: &Address, amount: u128) {
        *self.balances.entry(*to).or_default() += amount;
        self.minted += amount;
    }

    pub fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// Amount currently held on behalf of stakers.
    pub fn custody(&self) -> u128 {
        self.custody
    }

    pub fn set_total_supply(&mut self, supply: u128) {
        self.supply_override = Some(supply);
    }

    /// Make every subsequent transfer fail with `NotAuthorized`.
    pub fn fail_transfers(&mut self, fail: bool) {
        self.fail_transfers = fail;
    }
}

impl BalanceCustodian for NullCustodian {
    fn transfer_in(&mut self, from: &Address, amount: u128) -> Result<(), CustodianError> {
        if self.fail_transfers {
            return Err(CustodianError::NotAuthorized(*from));
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(CustodianError::InsufficientBalance {
                owner: *from,
                needed: amount,
                available,
            });
        }
        self.balances.insert(*from, available - amount);
        self.custody += amount;
        Ok(())
    }

    fn transfer_out(&mut self, to: &Address, amount: u128) -> Result<(), CustodianError> {
        if self.fail_transfers {
            return Err(CustodianError::NotAuthorized(*to));
        }
        if self.custody < amount {
            return Err(CustodianError::Other(format!(
                "custody holds {}, cannot release {amount}",
                self.custody
            )));
        }
        self.custody -= amount;
        *self.balances.entry(*to).or_default() += amount;
        Ok(())
    }

    fn total_supply(&self) -> u128 {
        self.supply_override.unwrap_or(self.minted)
    }
}
