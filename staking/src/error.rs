//! Staking ledger errors.

use quorum_types::{Address, CustodianError, ParamsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("latest stake {available} is less than withdrawal amount {requested}")]
    InsufficientStake { requested: u128, available: u128 },

    #[error("representative must be non-zero")]
    ZeroRepresentative,

    #[error("{0} address must be non-zero")]
    ZeroAddress(&'static str),

    #[error("caller {caller} is not authorized for this call")]
    Unauthorized { caller: Address },

    #[error("custodian rejected transfer: {0}")]
    Custodian(#[from] CustodianError),

    #[error("invalid configuration: {0}")]
    Params(#[from] ParamsError),

    #[error("arithmetic overflow in stake accounting")]
    Overflow,

    #[error("arithmetic underflow in stake accounting")]
    Underflow,

    #[error("serialization error: {0}")]
    Serialization(String),
}
