//! Fundamental types for the Quorum staking DAO.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! participant addresses, timestamps, the epoch clock, fixed-point helpers,
//! DAO parameters, audit events, and the interfaces of the external collaborators
//! (balance custodian and reward pool).

pub mod address;
pub mod amount;
pub mod campaign;
pub mod epoch;
pub mod error;
pub mod event;
pub mod external;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::{mul_div, product_gte, BPS, PRECISION};
pub use campaign::{CampaignId, CampaignKind};
pub use epoch::{Epoch, EpochClock};
pub use error::ParamsError;
pub use event::{DaoEvent, EventBus};
pub use external::{BalanceCustodian, CustodianError, RewardPool, RewardPoolError};
pub use params::DaoParams;
pub use time::Timestamp;
