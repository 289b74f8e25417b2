use proptest::prelude::*;

use umbra_crypto::commit;
use umbra_governance::tally::passes_threshold;
use umbra_governance::{
    AnonymityMode, CommitmentStore, EligibilityPolicy, ProposalRules, RevealStore, TallyEngine,
};
use umbra_types::{Secret, Timestamp, TokenAmount, VoteChoice, VoterId};

fn rules(threshold: u8) -> ProposalRules {
    ProposalRules {
        required_tokens: vec![],
        approval_threshold: threshold,
        policy: EligibilityPolicy::TokenHolders,
        anonymity: AnonymityMode::Public,
        quorum_percent: None,
    }
}

fn choice(i: u8) -> VoteChoice {
    match i % 3 {
        0 => VoteChoice::Yes,
        1 => VoteChoice::No,
        _ => VoteChoice::Abstain,
    }
}

/// One committed vote per entry, revealed when the flag is set.
fn build(votes: &[(u8, u64, bool)]) -> (CommitmentStore, RevealStore) {
    let mut commitments = CommitmentStore::new();
    let mut reveals = RevealStore::new();
    for (i, &(c, weight, revealed)) in votes.iter().enumerate() {
        let voter = VoterId::new(format!("voter-{i}")).unwrap();
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&(i as u64).to_le_bytes());
        let secret = Secret::from_bytes(bytes);
        commitments
            .submit(
                voter.clone(),
                commit(choice(c), &secret),
                TokenAmount::new(weight as u128),
                None,
                Timestamp::new(1),
            )
            .unwrap();
        if revealed {
            reveals
                .reveal(&commitments, &voter, choice(c), secret, Timestamp::new(2))
                .unwrap();
        }
    }
    (commitments, reveals)
}

fn votes() -> impl Strategy<Value = Vec<(u8, u64, bool)>> {
    prop::collection::vec((0u8..3, 1u64..1_000_000, any::<bool>()), 0..24)
}

proptest! {
    /// Approval is exactly the threshold law over revealed yes/no weight.
    #[test]
    fn approval_follows_threshold_law(v in votes(), threshold in 1u8..=100) {
        let (c, r) = build(&v);
        let result = TallyEngine::tally(&rules(threshold), &c, &r, TokenAmount::new(u64::MAX as u128));
        let yes = result.weights.yes.raw();
        let no = result.weights.no.raw();
        let expected = yes + no > 0 && yes * 100 >= threshold as u128 * (yes + no);
        prop_assert_eq!(result.approved, expected);
    }

    /// Revealed and unrevealed weight partition the committed weight.
    #[test]
    fn weights_partition_commitments(v in votes()) {
        let (c, r) = build(&v);
        let result = TallyEngine::tally(&rules(50), &c, &r, TokenAmount::new(1));
        prop_assert_eq!(
            result.revealed_weight.saturating_add(result.unrevealed_weight),
            c.total_weight()
        );
        prop_assert_eq!(result.counts.total(), TokenAmount::new(r.len() as u128));
        prop_assert!(result.participation_bps <= 10_000);
    }

    /// One more yes vote never turns a pass into a fail.
    #[test]
    fn extra_yes_never_hurts(v in votes(), threshold in 1u8..=100, extra in 1u64..1_000_000) {
        let (c, r) = build(&v);
        let before = TallyEngine::tally(&rules(threshold), &c, &r, TokenAmount::new(1));

        let mut more = v.clone();
        more.push((0, extra, true));
        let (c, r) = build(&more);
        let after = TallyEngine::tally(&rules(threshold), &c, &r, TokenAmount::new(1));

        prop_assert!(!before.approved || after.approved);
        prop_assert!(after.approved || !passes_threshold(after.weights.yes, after.weights.no, threshold));
    }

    /// A stricter threshold never approves what a looser one rejects.
    #[test]
    fn thresholds_are_monotone(v in votes(), a in 1u8..=100, b in 1u8..=100) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (c, r) = build(&v);
        let loose = TallyEngine::tally(&rules(lo), &c, &r, TokenAmount::new(1));
        let strict = TallyEngine::tally(&rules(hi), &c, &r, TokenAmount::new(1));
        prop_assert!(!strict.approved || loose.approved);
    }

    /// Scaling both sides by 2^64 never changes the verdict.
    #[test]
    fn threshold_ignores_magnitude(yes in any::<u64>(), no in any::<u64>(), threshold in 1u8..=100) {
        let small = passes_threshold(TokenAmount::new(yes as u128), TokenAmount::new(no as u128), threshold);
        let huge = passes_threshold(
            TokenAmount::new((yes as u128) << 64),
            TokenAmount::new((no as u128) << 64),
            threshold,
        );
        prop_assert_eq!(small, huge);
    }
}
