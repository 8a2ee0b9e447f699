//! Campaign registry: creation, cancellation and lookup.

use std::collections::{BTreeMap, HashMap};

use quorum_types::{
    CampaignId, CampaignKind, DaoEvent, DaoParams, Epoch, EpochClock, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::campaign::{option_value_valid, Campaign, FormulaParams};
use crate::error::GovernanceError;

/// Everything a caller supplies to open a campaign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampaignRequest {
    pub kind: CampaignKind,
    pub start: Timestamp,
    pub end: Timestamp,
    pub formula: FormulaParams,
    pub options: Vec<u128>,
    pub link: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignRegistry {
    clock: EpochClock,
    min_duration_secs: u64,
    max_options: usize,
    max_epoch_campaigns: usize,
    /// Id handed to the next campaign. Ids start at 1 and are never reused.
    next_id: CampaignId,
    campaigns: BTreeMap<CampaignId, Campaign>,
    epoch_campaigns: HashMap<Epoch, Vec<CampaignId>>,
    network_fee_campaigns: HashMap<Epoch, CampaignId>,
    reward_split_campaigns: HashMap<Epoch, CampaignId>,
    #[serde(skip)]
    pending_events: Vec<DaoEvent>,
}

impl CampaignRegistry {
    pub fn new(params: &DaoParams) -> Result<Self, GovernanceError> {
        Ok(Self {
            clock: params.epoch_clock()?,
            min_duration_secs: params.min_campaign_duration_secs,
            max_options: params.max_campaign_options,
            max_epoch_campaigns: params.max_epoch_campaigns,
            next_id: 1,
            campaigns: BTreeMap::new(),
            epoch_campaigns: HashMap::new(),
            network_fee_campaigns: HashMap::new(),
            reward_split_campaigns: HashMap::new(),
            pending_events: Vec::new(),
        })
    }

    pub fn clock(&self) -> &EpochClock {
        &self.clock
    }

    /// Validate and store a new campaign, snapshotting `total_supply`.
    pub fn submit(
        &mut self,
        request: CampaignRequest,
        total_supply: u128,
        now: Timestamp,
    ) -> Result<CampaignId, GovernanceError> {
        let epoch = self.validate(&request, now)?;

        let id = self.next_id;
        self.next_id += 1;
        let campaign = Campaign {
            id,
            kind: request.kind,
            epoch,
            start: request.start,
            end: request.end,
            options: request.options,
            formula: request.formula,
            link: request.link,
            total_supply,
        };

        match campaign.kind {
            CampaignKind::NetworkFee => {
                self.network_fee_campaigns.insert(epoch, id);
            }
            CampaignKind::RewardSplit => {
                self.reward_split_campaigns.insert(epoch, id);
            }
            CampaignKind::General => {}
        }
        self.epoch_campaigns.entry(epoch).or_default().push(id);

        info!(campaign_id = id, kind = %campaign.kind, epoch, start = %campaign.start, end = %campaign.end, "campaign created");
        self.pending_events.push(DaoEvent::CampaignCreated {
            campaign_id: id,
            kind: campaign.kind,
            epoch,
            start: campaign.start,
            end: campaign.end,
        });
        self.campaigns.insert(id, campaign);
        Ok(id)
    }

    /// Remove a campaign that has not started yet, freeing its reserved slot.
    pub fn cancel(&mut self, id: CampaignId, now: Timestamp) -> Result<Campaign, GovernanceError> {
        let campaign = self
            .campaigns
            .get(&id)
            .ok_or(GovernanceError::CampaignNotFound(id))?;
        if campaign.start <= now {
            return Err(GovernanceError::CampaignAlreadyStarted(id));
        }
        let (epoch, kind) = (campaign.epoch, campaign.kind);

        let slots = match kind {
            CampaignKind::NetworkFee => Some(&mut self.network_fee_campaigns),
            CampaignKind::RewardSplit => Some(&mut self.reward_split_campaigns),
            CampaignKind::General => None,
        };
        if let Some(slots) = slots {
            slots.remove(&epoch);
        }
        if let Some(ids) = self.epoch_campaigns.get_mut(&epoch) {
            ids.retain(|c| *c != id);
        }

        info!(campaign_id = id, %kind, epoch, "campaign cancelled");
        self.pending_events
            .push(DaoEvent::CampaignCancelled { campaign_id: id });
        self.campaigns
            .remove(&id)
            .ok_or(GovernanceError::CampaignNotFound(id))
    }

    pub fn get_campaign(&self, id: CampaignId) -> Option<&Campaign> {
        self.campaigns.get(&id)
    }

    pub fn campaigns_in_epoch(&self, epoch: Epoch) -> &[CampaignId] {
        self.epoch_campaigns
            .get(&epoch)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn network_fee_campaign(&self, epoch: Epoch) -> Option<CampaignId> {
        self.network_fee_campaigns.get(&epoch).copied()
    }

    pub fn reward_split_campaign(&self, epoch: Epoch) -> Option<CampaignId> {
        self.reward_split_campaigns.get(&epoch).copied()
    }

    /// Number of ids handed out so far, cancelled campaigns included.
    pub fn campaigns_created(&self) -> u64 {
        self.next_id - 1
    }

    pub fn take_events(&mut self) -> Vec<DaoEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(data).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }

    fn validate(&self, request: &CampaignRequest, now: Timestamp) -> Result<Epoch, GovernanceError> {
        if request.start < now {
            return Err(GovernanceError::StartInPast {
                start: request.start,
                now,
            });
        }
        let current = self.clock.epoch_at(now);
        let epoch = self.clock.epoch_at(request.start);
        if epoch != current && epoch != current + 1 {
            return Err(GovernanceError::InvalidCampaignEpoch { epoch, current });
        }
        if self.clock.epoch_at(request.end) != epoch {
            return Err(GovernanceError::EndOutsideEpoch);
        }
        let duration = request.end.as_secs().saturating_sub(request.start.as_secs());
        if request.end < request.start || duration < self.min_duration_secs {
            return Err(GovernanceError::DurationTooShort {
                duration,
                min: self.min_duration_secs,
            });
        }
        if self.campaigns_in_epoch(epoch).len() >= self.max_epoch_campaigns {
            return Err(GovernanceError::TooManyEpochCampaigns {
                epoch,
                max: self.max_epoch_campaigns,
            });
        }

        let count = request.options.len();
        if count < 2 || count > self.max_options {
            return Err(GovernanceError::InvalidOptionCount {
                count,
                max: self.max_options,
            });
        }
        for (i, value) in request.options.iter().enumerate() {
            if !option_value_valid(request.kind, *value) {
                return Err(GovernanceError::InvalidOptionValue {
                    kind: request.kind,
                    index: i + 1,
                    value: *value,
                });
            }
        }
        request.formula.validate()?;

        let taken = match request.kind {
            CampaignKind::NetworkFee => self.network_fee_campaigns.contains_key(&epoch),
            CampaignKind::RewardSplit => self.reward_split_campaigns.contains_key(&epoch),
            CampaignKind::General => false,
        };
        if taken {
            return Err(GovernanceError::ReservedSlotTaken {
                kind: request.kind,
                epoch,
            });
        }
        Ok(epoch)
    }
}
