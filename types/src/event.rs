//! Audit events emitted by the staking ledger and the governance engine.

use crate::address::Address;
use crate::campaign::{CampaignId, CampaignKind};
use crate::epoch::Epoch;
use crate::time::Timestamp;

/// Everything an external auditor can observe about the DAO.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DaoEvent {
    /// Stake moved into the ledger.
    Deposited {
        staker: Address,
        epoch: Epoch,
        amount: u128,
    },
    /// Stake moved out of the ledger.
    Withdrawn {
        staker: Address,
        epoch: Epoch,
        amount: u128,
    },
    /// A staker started (`is_delegated = true`) or stopped delegating to `representative`.
    Delegated {
        staker: Address,
        representative: Address,
        epoch: Epoch,
        is_delegated: bool,
    },
    /// The vote correction triggered by a withdrawal failed; the withdrawal still went through.
    WithdrawCorrectionFailed {
        staker: Address,
        epoch: Epoch,
        reduced_by: u128,
        reason: String,
    },
    /// First vote of a participant in a campaign.
    Voted {
        staker: Address,
        epoch: Epoch,
        campaign_id: CampaignId,
        option: usize,
    },
    /// A participant moved their vote to another option.
    VoteChanged {
        staker: Address,
        epoch: Epoch,
        campaign_id: CampaignId,
        old_option: usize,
        new_option: usize,
    },
    CampaignCreated {
        campaign_id: CampaignId,
        kind: CampaignKind,
        epoch: Epoch,
        start: Timestamp,
        end: Timestamp,
    },
    CampaignCancelled {
        campaign_id: CampaignId,
    },
    /// Campaign resolution was computed and cached. `option == 0` means no winner.
    CampaignConcluded {
        campaign_id: CampaignId,
        option: usize,
        value: u128,
    },
    NetworkFeeAdopted {
        epoch: Epoch,
        fee_bps: u128,
    },
    RewardSplitAdopted {
        epoch: Epoch,
        reward_bps: u128,
        rebate_bps: u128,
    },
    RewardClaimed {
        staker: Address,
        epoch: Epoch,
        amount: u128,
        percentage: u128,
    },
}

/// Synchronous fan-out bus for DAO events.
///
/// Listeners run inline on the emitting call; keep them cheap.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&DaoEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&DaoEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &DaoEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    #[test]
    fn emit_reaches_every_listener() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));
        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&DaoEvent::CampaignCancelled { campaign_id: 1 });
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn listener_sees_the_emitted_variant() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::default();
        let sink = Arc::clone(&seen);
        bus.subscribe(Box::new(move |e| sink.lock().unwrap().push(e.clone())));

        let event = DaoEvent::Deposited {
            staker: Address::repeat_byte(1),
            epoch: 3,
            amount: 50,
        };
        bus.emit(&event);
        assert_eq!(seen.lock().unwrap().as_slice(), &[event]);
    }

    #[test]
    fn empty_bus_is_noop() {
        let bus = EventBus::default();
        assert_eq!(bus.listener_count(), 0);
        bus.emit(&DaoEvent::CampaignCancelled { campaign_id: 7 });
    }
}
