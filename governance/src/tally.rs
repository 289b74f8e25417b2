//! Turning reveals into a result.

use crate::commitment::CommitmentStore;
use crate::proposal::{AnonymityMode, ProposalRules};
use crate::reveal::RevealStore;
use serde::{Deserialize, Serialize};
use umbra_types::{TokenAmount, VoteChoice};

/// Basis points in 100%.
pub const FULL_BPS: u32 = 10_000;

/// Per-choice totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceTotals {
    pub yes: TokenAmount,
    pub no: TokenAmount,
    pub abstain: TokenAmount,
}

impl ChoiceTotals {
    fn add(&mut self, choice: VoteChoice, amount: TokenAmount) {
        let slot = match choice {
            VoteChoice::Yes => &mut self.yes,
            VoteChoice::No => &mut self.no,
            VoteChoice::Abstain => &mut self.abstain,
        };
        *slot = slot.saturating_add(amount);
    }

    pub fn total(&self) -> TokenAmount {
        self.yes.saturating_add(self.no).saturating_add(self.abstain)
    }
}

/// The fixed outcome of a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResult {
    /// Number of reveals per choice.
    pub counts: ChoiceTotals,
    /// Revealed weight per choice.
    pub weights: ChoiceTotals,
    pub revealed_weight: TokenAmount,
    /// Weight committed but never revealed. Counts toward quorum only.
    pub unrevealed_weight: TokenAmount,
    /// Electorate size snapshotted when the proposal went active.
    pub eligible_weight: TokenAmount,
    /// `revealed_weight / eligible_weight`, in basis points, capped at 100%.
    pub participation_bps: u32,
    pub quorum_met: bool,
    pub reveal_threshold_met: bool,
    pub approved: bool,
}

impl TallyResult {
    pub fn participation_percent(&self) -> f64 {
        self.participation_bps as f64 / 100.0
    }
}

/// Aggregates reveals and applies the approval rules.
pub struct TallyEngine;

impl TallyEngine {
    pub fn tally(
        rules: &ProposalRules,
        commitments: &CommitmentStore,
        reveals: &RevealStore,
        eligible_weight: TokenAmount,
    ) -> TallyResult {
        let mut counts = ChoiceTotals::default();
        let mut weights = ChoiceTotals::default();
        for reveal in reveals.iter() {
            counts.add(reveal.choice, TokenAmount::new(1));
            weights.add(reveal.choice, reveal.weight);
        }

        let revealed_weight = weights.total();
        let unrevealed_weight = commitments
            .iter()
            .filter(|c| !reveals.contains(&c.voter))
            .fold(TokenAmount::ZERO, |acc, c| acc.saturating_add(c.weight));

        let participation_bps = ratio_bps(revealed_weight, eligible_weight);

        let quorum_met = match rules.quorum_percent {
            None => true,
            Some(q) => meets_percent(
                revealed_weight.saturating_add(unrevealed_weight),
                eligible_weight,
                q,
            ),
        };

        let reveal_threshold_met = match rules.anonymity {
            AnonymityMode::ThresholdReveal { reveal_percent } => meets_percent(
                TokenAmount::new(reveals.len() as u128),
                TokenAmount::new(commitments.len() as u128),
                reveal_percent,
            ),
            _ => true,
        };

        let approved = quorum_met
            && reveal_threshold_met
            && passes_threshold(weights.yes, weights.no, rules.approval_threshold);

        TallyResult {
            counts,
            weights,
            revealed_weight,
            unrevealed_weight,
            eligible_weight,
            participation_bps,
            quorum_met,
            reveal_threshold_met,
            approved,
        }
    }
}

/// `yes / (yes + no) >= threshold%`. All-abstain (or no votes) never passes.
///
/// Rearranged as `yes * (100 - threshold) >= no * threshold` and compared on
/// 256-bit products, so it stays exact for any pair of `u128` weights.
pub fn passes_threshold(yes: TokenAmount, no: TokenAmount, threshold: u8) -> bool {
    if yes.is_zero() && no.is_zero() {
        return false;
    }
    let threshold = u64::from(threshold.min(100));
    wide_mul(yes.raw(), 100 - threshold) >= wide_mul(no.raw(), threshold)
}

/// `part >= percent% of whole`. An empty whole only satisfies itself.
fn meets_percent(part: TokenAmount, whole: TokenAmount, percent: u8) -> bool {
    if whole.is_zero() {
        return !part.is_zero();
    }
    wide_mul(part.raw(), 100) >= wide_mul(whole.raw(), u64::from(percent))
}

/// `part / whole` in basis points, rounded down and capped at 100%. Zero when
/// `whole` is zero.
pub(crate) fn ratio_bps(part: TokenAmount, whole: TokenAmount) -> u32 {
    if whole.is_zero() {
        return 0;
    }
    if part >= whole {
        return FULL_BPS;
    }
    // Largest bps with whole * bps <= part * FULL_BPS.
    let target = wide_mul(part.raw(), u64::from(FULL_BPS));
    let (mut lo, mut hi) = (0u32, FULL_BPS);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if wide_mul(whole.raw(), u64::from(mid)) <= target {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

/// `x * m` as `(high, low)` 128-bit words. Tuples compare like the 256-bit value.
fn wide_mul(x: u128, m: u64) -> (u128, u128) {
    const LOW_BITS: u128 = u64::MAX as u128;
    let m = u128::from(m);
    let lo = (x & LOW_BITS) * m;
    let hi = (x >> 64) * m;
    let (low, carry) = (hi << 64).overflowing_add(lo);
    ((hi >> 64) + u128::from(carry), low)
}
