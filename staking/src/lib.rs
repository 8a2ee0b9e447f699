//! Epoch-checkpointed delegated staking ledger.
//!
//! The ledger is the system of record for "how much weight does participant P
//! have in epoch E". Each participant owns a sparse, monotonically-written
//! timeline of checkpoints plus a live snapshot:
//!
//! - a write only ever targets the current epoch (sealed once, lowered by
//!   withdrawals) or the next epoch (always overwritten with the live value)
//! - reads for epochs beyond `current + 1` return the default value
//! - other reads return the checkpoint of the greatest inited epoch `<= e`
//!
//! Delegation is exactly one level deep. Withdrawals that shrink the current
//! epoch's stake notify a [`WithdrawalHandler`] after the ledger has fully
//! committed, and a failing handler never fails the withdrawal.

pub mod checkpoint;
pub mod error;
pub mod ledger;
pub mod withdrawal;

pub use checkpoint::{StakerData, StakerTimeline};
pub use error::StakingError;
pub use ledger::{StakeLedger, StakingConfig, WithdrawReceipt};
pub use withdrawal::{NoopWithdrawalHandler, WithdrawalHandler};
