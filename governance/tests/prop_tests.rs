use proptest::prelude::*;

use quorum_governance::{CampaignRequest, Dao, DaoSetup, FormulaParams};
use quorum_nullables::{NullCustodian, NullRewardPool};
use quorum_types::{Address, CampaignKind, DaoParams, Timestamp};

const START: u64 = 1_000;
const PERIOD: u64 = 100;
const VOTERS: usize = 4;

fn voter(i: usize) -> Address {
    Address::repeat_byte(i as u8 + 1)
}

fn operator() -> Address {
    Address::repeat_byte(0x0e)
}

/// A DAO where voter `i` staked `stakes[i]` in epoch 0, with one general
/// campaign of `options` options open for all of epoch 1.
fn dao_with_campaign(stakes: &[u128], options: usize) -> Dao<NullCustodian, NullRewardPool> {
    let params = DaoParams {
        start_time: Timestamp::new(START),
        epoch_period_secs: PERIOD,
        min_campaign_duration_secs: 10,
        ..DaoParams::default()
    };
    let mut custodian = NullCustodian::new();
    for (i, stake) in stakes.iter().enumerate() {
        custodian.mint(&voter(i), *stake);
    }
    let setup = DaoSetup {
        params,
        staking: Address::repeat_byte(0x57),
        token: Address::repeat_byte(0x70),
        dao: Address::repeat_byte(0xda),
        operator: operator(),
    };
    let mut dao = Dao::new(setup, custodian, NullRewardPool::new(), Timestamp::new(0)).unwrap();
    let t0 = Timestamp::new(START - 50);
    for (i, stake) in stakes.iter().enumerate() {
        if *stake > 0 {
            dao.deposit(&voter(i), *stake, t0).unwrap();
        }
    }
    let request = CampaignRequest {
        kind: CampaignKind::General,
        start: Timestamp::new(START),
        end: Timestamp::new(START + 90),
        formula: FormulaParams {
            min_percentage: 0,
            c: 0,
            t: 0,
        },
        options: (1..=options as u128).collect(),
        link: String::new(),
    };
    dao.submit_campaign(&operator(), request, t0).unwrap();
    dao
}

proptest! {
    /// Epoch points grow by each voter's weight once, however often they revote.
    #[test]
    fn revotes_never_change_totals(
        stakes in prop::collection::vec(0u128..10_000, VOTERS),
        ballots in prop::collection::vec((0..VOTERS, 1usize..=3), 1..30),
    ) {
        let mut dao = dao_with_campaign(&stakes, 3);
        let now = Timestamp::new(START + 5);
        let mut voted = [false; VOTERS];
        for (who, option) in &ballots {
            dao.vote(&voter(*who), 1, *option, now).unwrap();
            voted[*who] = true;
        }
        let expected: u128 = (0..VOTERS).filter(|i| voted[*i]).map(|i| stakes[i]).sum();
        prop_assert_eq!(dao.votes().total_epoch_points(1), expected);

        let data = dao.campaign_vote_data(1);
        prop_assert_eq!(data.total_points, expected);
        prop_assert_eq!(data.option_votes.iter().sum::<u128>(), expected);
        for i in 0..VOTERS {
            prop_assert_eq!(dao.votes().number_votes(&voter(i), 1), voted[i] as u64);
        }
    }

    /// A withdrawal lowers the voter's running vote by exactly what left the
    /// current epoch, and no tally ever goes negative.
    #[test]
    fn withdrawal_correction_is_bounded(
        stakes in prop::collection::vec(1u128..10_000, VOTERS),
        fractions in prop::collection::vec(0u128..=100, VOTERS),
        options in prop::collection::vec(1usize..=2, VOTERS),
    ) {
        let mut dao = dao_with_campaign(&stakes, 2);
        let vote_at = Timestamp::new(START + 5);
        for i in 0..VOTERS {
            dao.vote(&voter(i), 1, options[i], vote_at).unwrap();
        }

        let withdraw_at = Timestamp::new(START + 20);
        let mut remaining = [0u128; 2];
        for i in 0..VOTERS {
            let amount = stakes[i] * fractions[i] / 100;
            if amount > 0 {
                let receipt = dao.withdraw(&voter(i), amount, withdraw_at).unwrap();
                prop_assert_eq!(receipt.current_epoch_reduction, amount);
                prop_assert!(receipt.correction_error.is_none());
            }
            remaining[options[i] - 1] += stakes[i] - amount;
        }
        let data = dao.campaign_vote_data(1);
        prop_assert_eq!(data.option_votes, remaining.to_vec());
        prop_assert_eq!(dao.votes().total_epoch_points(1), remaining.iter().sum::<u128>());
    }

    /// With a zero threshold, a campaign has a winner iff one option leads strictly.
    #[test]
    fn plurality_wins_only_without_tie(
        stakes in prop::collection::vec(0u128..50, VOTERS),
        options in prop::collection::vec(1usize..=3, VOTERS),
    ) {
        let mut dao = dao_with_campaign(&stakes, 3);
        let now = Timestamp::new(START + 5);
        let mut tally = [0u128; 3];
        for i in 0..VOTERS {
            dao.vote(&voter(i), 1, options[i], now).unwrap();
            tally[options[i] - 1] += stakes[i];
        }
        let top = *tally.iter().max().unwrap();
        let leaders = tally.iter().filter(|v| **v == top).count();

        let outcome = dao.campaign_winning_option_and_value(1, Timestamp::new(START + 90));
        if leaders == 1 && stakes.iter().sum::<u128>() > 0 {
            prop_assert_eq!(tally[outcome.option - 1], top);
            prop_assert_eq!(outcome.value, outcome.option as u128);
        } else {
            prop_assert!(!outcome.has_winner());
        }
    }

    /// Reward shares of all voters never exceed 100%.
    #[test]
    fn reward_shares_sum_to_at_most_one(
        stakes in prop::collection::vec(0u128..10_000, VOTERS),
    ) {
        let mut dao = dao_with_campaign(&stakes, 2);
        let now = Timestamp::new(START + 5);
        for i in 0..VOTERS {
            dao.vote(&voter(i), 1, 1 + i % 2, now).unwrap();
        }
        let later = Timestamp::new(START + PERIOD);
        let total: u128 = (0..VOTERS)
            .map(|i| dao.past_epoch_reward_percentage(&voter(i), 1, later))
            .sum();
        prop_assert!(total <= quorum_types::PRECISION);
    }
}
