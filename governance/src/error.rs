use quorum_staking::StakingError;
use quorum_types::{
    Address, CampaignId, CampaignKind, Epoch, ParamsError, RewardPoolError, Timestamp,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("campaign {0} not found")]
    CampaignNotFound(CampaignId),

    #[error("campaign start {start} is before now ({now})")]
    StartInPast { start: Timestamp, now: Timestamp },

    #[error("campaigns may only target the current or next epoch: got {epoch}, current is {current}")]
    InvalidCampaignEpoch { epoch: Epoch, current: Epoch },

    #[error("campaign must start and end in the same epoch")]
    EndOutsideEpoch,

    #[error("campaign lasts {duration}s, minimum is {min}s")]
    DurationTooShort { duration: u64, min: u64 },

    #[error("epoch {epoch} already has {max} campaigns")]
    TooManyEpochCampaigns { epoch: Epoch, max: usize },

    #[error("campaign has {count} options, must be between 2 and {max}")]
    InvalidOptionCount { count: usize, max: usize },

    #[error("option {index} value {value} is out of range for a {kind} campaign")]
    InvalidOptionValue {
        kind: CampaignKind,
        index: usize,
        value: u128,
    },

    #[error("formula parameter {0} exceeds 100%")]
    FormulaOutOfRange(&'static str),

    #[error("epoch {epoch} already has a {kind} campaign")]
    ReservedSlotTaken { kind: CampaignKind, epoch: Epoch },

    #[error("campaign {0} has already started")]
    CampaignAlreadyStarted(CampaignId),

    #[error("campaign {0} has not ended yet")]
    CampaignNotEnded(CampaignId),

    #[error("{0} is not the campaign operator")]
    NotOperator(Address),

    #[error("caller {caller} is not authorized")]
    Unauthorized { caller: Address },

    #[error("option {option} is not valid for campaign {campaign_id}")]
    InvalidOption {
        campaign_id: CampaignId,
        option: usize,
    },

    #[error("voting on campaign {0} is not open")]
    VotingClosed(CampaignId),

    #[error("epoch {epoch} is not over yet (current is {current})")]
    EpochNotOver { epoch: Epoch, current: Epoch },

    #[error("{staker} already claimed the reward for epoch {epoch}")]
    AlreadyClaimed { staker: Address, epoch: Epoch },

    #[error("{staker} has no reward to claim for epoch {epoch}")]
    NoRewardToClaim { staker: Address, epoch: Epoch },

    #[error("staking: {0}")]
    Staking(#[from] StakingError),

    #[error("reward pool: {0}")]
    RewardPool(#[from] RewardPoolError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("serialization: {0}")]
    Serialization(String),
}
