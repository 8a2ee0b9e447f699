//! The call-backward seam from the ledger into vote accounting.

use quorum_types::{Address, Timestamp};
use std::fmt;

use crate::ledger::StakeLedger;

/// Receives the amount by which a participant's current-epoch weight shrank.
///
/// `staker` is the identity whose votes carry the weight: the withdrawer when
/// not delegating, otherwise their current-epoch representative. The handler
/// gets a shared view of the ledger with the withdrawal already committed, so
/// anything it reads is post-withdrawal state.
///
/// Errors are reported by the ledger as a `WithdrawCorrectionFailed` event and
/// never fail the withdrawal itself.
pub trait WithdrawalHandler {
    type Error: fmt::Display;

    fn handle_withdrawal(
        &mut self,
        ledger: &StakeLedger,
        staker: &Address,
        reduced_by: u128,
        now: Timestamp,
    ) -> Result<(), Self::Error>;
}

/// For ledgers running without a governance engine attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopWithdrawalHandler;

impl WithdrawalHandler for NoopWithdrawalHandler {
    type Error = std::convert::Infallible;

    fn handle_withdrawal(
        &mut self,
        _ledger: &StakeLedger,
        _staker: &Address,
        _reduced_by: u128,
        _now: Timestamp,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}
