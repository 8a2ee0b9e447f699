//! Stake-weighted governance for the Quorum staking DAO.
//!
//! Campaigns are time-boxed polls inside one epoch. Votes are weighted by the
//! voter's sealed current-epoch stake (own deposit plus what was delegated to
//! them), corrected downwards when stake is withdrawn mid-campaign, and
//! resolved after the campaign ends with a participation-dependent threshold.
//! Two reserved campaign kinds feed protocol parameters (network fee and the
//! burn/reward/rebate split); every finished epoch's rewards are shared among
//! its voters by contributed weight.
//!
//! [`Dao`] ties the pieces to the stake ledger and the external collaborators.

pub mod campaign;
pub mod dao;
pub mod error;
pub mod registry;
pub mod reward;
pub mod votes;

pub use campaign::{Campaign, FormulaParams, RewardSplit};
pub use dao::{Dao, DaoSetup};
pub use error::GovernanceError;
pub use registry::{CampaignRegistry, CampaignRequest};
pub use reward::{CampaignOutcome, NetworkFeeData, RewardCalculator, RewardSplitData};
pub use votes::{CampaignVoteData, VoteAggregator, VoteLedger, VoteRecord};
