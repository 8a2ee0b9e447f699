//! Per-participant checkpoint timeline.

use quorum_types::{Address, Epoch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stake, delegated stake and representative of one participant, either live
/// or as sealed for one epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerData {
    /// The participant's own deposit.
    pub stake: u128,
    /// Sum of the own deposits of everyone delegating to this participant.
    pub delegated_stake: u128,
    /// `owner` itself when not delegating, `Address::ZERO` when never touched.
    pub representative: Address,
}

impl StakerData {
    /// Weight `owner` carries in a vote.
    ///
    /// Someone who delegated away only brings what was delegated to them; their
    /// own deposit counts with their representative.
    pub fn voting_weight(&self, owner: &Address) -> u128 {
        if self.representative == *owner {
            self.stake.saturating_add(self.delegated_stake)
        } else {
            self.delegated_stake
        }
    }
}

/// Sparse timeline of sealed checkpoints plus the live snapshot.
///
/// A key present in `checkpoints` means that epoch is inited. Lookups walk
/// backwards to the greatest inited epoch, so cost grows with the number of
/// interactions rather than the number of elapsed epochs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StakerTimeline {
    latest: StakerData,
    checkpoints: BTreeMap<Epoch, StakerData>,
}

impl StakerTimeline {
    pub fn latest(&self) -> &StakerData {
        &self.latest
    }

    pub(crate) fn latest_mut(&mut self) -> &mut StakerData {
        &mut self.latest
    }

    pub fn is_inited(&self, epoch: Epoch) -> bool {
        self.checkpoints.contains_key(&epoch)
    }

    /// The checkpoint written for exactly `epoch`, if any.
    pub fn checkpoint(&self, epoch: Epoch) -> Option<&StakerData> {
        self.checkpoints.get(&epoch)
    }

    pub(crate) fn checkpoint_mut(&mut self, epoch: Epoch) -> Option<&mut StakerData> {
        self.checkpoints.get_mut(&epoch)
    }

    /// Checkpoint of the greatest inited epoch `<= epoch`, or the default.
    pub fn at_or_before(&self, epoch: Epoch) -> StakerData {
        self.checkpoints
            .range(..=epoch)
            .next_back()
            .map(|(_, data)| *data)
            .unwrap_or_default()
    }

    pub fn inited_epochs(&self) -> impl Iterator<Item = Epoch> + '_ {
        self.checkpoints.keys().copied()
    }

    /// What `checkpoint(current)` holds once sealed, without sealing.
    pub(crate) fn opening(&self, owner: &Address, current: Epoch) -> StakerData {
        match self.checkpoints.get(&current) {
            Some(data) => *data,
            None => self.normalized_latest(owner),
        }
    }

    fn normalized_latest(&self, owner: &Address) -> StakerData {
        let mut data = self.latest;
        if data.representative.is_zero() {
            data.representative = *owner;
        }
        data
    }

    /// Seal `current` and `current + 1` from the live snapshot if not inited yet.
    ///
    /// The first touch also turns an unset representative into the owner itself.
    /// Sealing never changes what a read returns: an uninited epoch already
    /// resolves to the latest value through the next-epoch mirror.
    pub(crate) fn seal(&mut self, owner: &Address, current: Epoch) {
        self.latest = self.normalized_latest(owner);
        let latest = self.latest;
        self.checkpoints.entry(current).or_insert(latest);
        self.checkpoints.entry(current + 1).or_insert(latest);
    }

    /// Overwrite `current + 1` with the live snapshot.
    pub(crate) fn advance(&mut self, current: Epoch) {
        self.checkpoints.insert(current + 1, self.latest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::repeat_byte(1)
    }

    #[test]
    fn empty_timeline_reads_default() {
        let t = StakerTimeline::default();
        assert_eq!(t.at_or_before(5), StakerData::default());
        assert!(!t.is_inited(0));
    }

    #[test]
    fn seal_writes_current_and_next_once() {
        let mut t = StakerTimeline::default();
        t.latest_mut().stake = 10;
        t.seal(&owner(), 3);
        assert!(t.is_inited(3));
        assert!(t.is_inited(4));
        assert_eq!(t.checkpoint(3).unwrap().representative, owner());

        t.latest_mut().stake = 20;
        t.seal(&owner(), 3);
        assert_eq!(t.checkpoint(3).unwrap().stake, 10);
        assert_eq!(t.checkpoint(4).unwrap().stake, 10);

        t.advance(3);
        assert_eq!(t.checkpoint(3).unwrap().stake, 10);
        assert_eq!(t.checkpoint(4).unwrap().stake, 20);
    }

    #[test]
    fn lookup_walks_back_to_last_inited_epoch() {
        let mut t = StakerTimeline::default();
        t.latest_mut().stake = 7;
        t.seal(&owner(), 2);
        t.latest_mut().stake = 9;
        t.advance(2);

        assert_eq!(t.at_or_before(1).stake, 0);
        assert_eq!(t.at_or_before(2).stake, 7);
        assert_eq!(t.at_or_before(3).stake, 9);
        assert_eq!(t.at_or_before(100).stake, 9);
        assert_eq!(t.inited_epochs().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn opening_matches_what_seal_would_write() {
        let mut t = StakerTimeline::default();
        t.latest_mut().stake = 5;
        let opening = t.opening(&owner(), 1);
        t.seal(&owner(), 1);
        assert_eq!(Some(&opening), t.checkpoint(1));
    }

    #[test]
    fn voting_weight_depends_on_representative() {
        let me = owner();
        let other = Address::repeat_byte(2);
        let own = StakerData {
            stake: 10,
            delegated_stake: 5,
            representative: me,
        };
        assert_eq!(own.voting_weight(&me), 15);

        let delegated = StakerData {
            representative: other,
            ..own
        };
        assert_eq!(delegated.voting_weight(&me), 5);
    }
}
