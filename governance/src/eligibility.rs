//! Who may vote, and with how much weight.
//!
//! Evaluation is a pure function of the proposal rules, the voter's balances
//! at call time and, for named-group proposals, the group resolver's answer.

use crate::error::EligibilityError;
use crate::proposal::{EligibilityPolicy, Pledge, ProposalRules};
use serde::Serialize;
use std::sync::Arc;
use umbra_groups::{GroupError, GroupResolver};
use umbra_types::{Balances, TokenAmount, VoterId};

/// The outcome of one eligibility check. Computed, never stored.
#[derive(Debug, Serialize)]
pub struct EligibilitySnapshot {
    pub voter: VoterId,
    pub balances: Balances,
    pub eligible: bool,
    /// Weight this voter's reveal would add to the tally. Zero when not eligible.
    pub weight: TokenAmount,
    #[serde(skip)]
    pub rejection: Option<EligibilityError>,
}

impl EligibilitySnapshot {
    fn rejected(voter: &VoterId, balances: Balances, reason: EligibilityError) -> Self {
        Self {
            voter: voter.clone(),
            balances,
            eligible: false,
            weight: TokenAmount::ZERO,
            rejection: Some(reason),
        }
    }

    /// Turn a rejection into an error, keeping eligible snapshots.
    pub fn into_result(self) -> Result<Self, EligibilityError> {
        match self.rejection {
            Some(reason) => Err(reason),
            None => Ok(self),
        }
    }
}

/// Decides whether a voter may participate in a proposal.
pub struct EligibilityEvaluator {
    groups: Arc<dyn GroupResolver>,
}

impl EligibilityEvaluator {
    pub fn new(groups: Arc<dyn GroupResolver>) -> Self {
        Self { groups }
    }

    /// Evaluate `voter` and fail with the first rule they break.
    ///
    /// Votes are weighed in the proposal's primary token only; any other
    /// required kind gates eligibility but never adds weight. With a pledge,
    /// the weight is the pledged amount capped at the voter's primary balance.
    /// Without one (a preview), it is the full primary balance.
    pub async fn evaluate(
        &self,
        rules: &ProposalRules,
        voter: &VoterId,
        balances: Balances,
        pledge: Option<Pledge>,
    ) -> Result<EligibilitySnapshot, EligibilityError> {
        self.assess(rules, voter, balances, pledge).await?.into_result()
    }

    /// Like [`evaluate`](Self::evaluate), but rule violations come back inside
    /// the snapshot. Only resolver failures are errors.
    pub async fn assess(
        &self,
        rules: &ProposalRules,
        voter: &VoterId,
        balances: Balances,
        pledge: Option<Pledge>,
    ) -> Result<EligibilitySnapshot, EligibilityError> {
        if let Err(reason) = self.check_membership(rules, voter).await {
            return match reason {
                EligibilityError::Resolver(_) => Err(reason),
                other => Ok(EligibilitySnapshot::rejected(voter, balances, other)),
            };
        }
        if let Err(reason) = Self::check_tokens(rules, balances) {
            return Ok(EligibilitySnapshot::rejected(voter, balances, reason));
        }
        match voting_weight(rules, balances, pledge) {
            Ok(weight) => Ok(EligibilitySnapshot {
                voter: voter.clone(),
                balances,
                eligible: true,
                weight,
                rejection: None,
            }),
            Err(reason) => Ok(EligibilitySnapshot::rejected(voter, balances, reason)),
        }
    }

    async fn check_membership(
        &self,
        rules: &ProposalRules,
        voter: &VoterId,
    ) -> Result<(), EligibilityError> {
        match &rules.policy {
            EligibilityPolicy::TokenHolders => Ok(()),
            EligibilityPolicy::Whitelist(allowed) => {
                if allowed.contains(voter) {
                    Ok(())
                } else {
                    Err(EligibilityError::NotWhitelisted(voter.to_string()))
                }
            }
            EligibilityPolicy::NamedGroup(group) => {
                match self.groups.is_member(group, voter).await {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(EligibilityError::NotInGroup {
                        group: group.clone(),
                        voter: voter.to_string(),
                    }),
                    Err(e) => Err(group_failure(e)),
                }
            }
        }
    }

    /// Every required kind must be held at or above its minimum.
    pub fn check_tokens(rules: &ProposalRules, balances: Balances) -> Result<(), EligibilityError> {
        for req in &rules.required_tokens {
            let have = balances.get(req.kind);
            if have < req.minimum {
                return Err(EligibilityError::InsufficientBalance {
                    kind: req.kind,
                    have: have.raw(),
                    need: req.minimum.raw(),
                });
            }
        }
        Ok(())
    }
}

/// A group the resolver has never heard of is a policy the engine cannot
/// apply. Anything else is the resolver's own failure.
pub(crate) fn group_failure(err: GroupError) -> EligibilityError {
    match err {
        GroupError::GroupNotFound(id) => EligibilityError::UnknownPolicy(format!("group {id}")),
        other => EligibilityError::Resolver(other),
    }
}

fn voting_weight(
    rules: &ProposalRules,
    balances: Balances,
    pledge: Option<Pledge>,
) -> Result<TokenAmount, EligibilityError> {
    // One identity, one vote.
    let Some(primary) = rules.primary_token() else {
        return Ok(TokenAmount::new(1));
    };
    match pledge {
        None => Ok(balances.get(primary)),
        Some(pledge) => {
            if pledge.kind != primary {
                return Err(EligibilityError::PledgeKindNotAccepted(pledge.kind));
            }
            if pledge.amount.is_zero() {
                return Err(EligibilityError::InvalidPledge(
                    "pledged amount must be > 0".into(),
                ));
            }
            Ok(pledge.amount.min(balances.get(primary)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{AnonymityMode, TokenRequirement};
    use umbra_groups::{GroupInfo, GroupRegistry};
    use umbra_types::TokenKind;

    fn voter(name: &str) -> VoterId {
        VoterId::new(name).unwrap()
    }

    fn rules(policy: EligibilityPolicy, tokens: Vec<TokenRequirement>) -> ProposalRules {
        ProposalRules {
            required_tokens: tokens,
            approval_threshold: 50,
            policy,
            anonymity: AnonymityMode::Public,
            quorum_percent: None,
        }
    }

    fn evaluator() -> EligibilityEvaluator {
        let mut registry = GroupRegistry::new();
        registry.register(GroupInfo::new("stewards", "Stewards")).unwrap();
        registry.add_member("stewards", voter("carol")).unwrap();
        EligibilityEvaluator::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn token_holder_below_minimum_is_rejected() {
        let r = rules(
            EligibilityPolicy::TokenHolders,
            vec![TokenRequirement::new(TokenKind::Night, 100)],
        );
        let err = evaluator()
            .evaluate(&r, &voter("bob"), Balances::new(50, 0), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EligibilityError::InsufficientBalance {
                kind: TokenKind::Night,
                have: 50,
                need: 100
            }
        ));
    }

    #[tokio::test]
    async fn every_required_kind_must_be_met() {
        let r = rules(
            EligibilityPolicy::TokenHolders,
            vec![
                TokenRequirement::new(TokenKind::Night, 100),
                TokenRequirement::new(TokenKind::Dust, 10),
            ],
        );
        let err = evaluator()
            .evaluate(&r, &voter("bob"), Balances::new(500, 9), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EligibilityError::InsufficientBalance {
                kind: TokenKind::Dust,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn pledge_is_capped_at_balance() {
        let r = rules(
            EligibilityPolicy::TokenHolders,
            vec![TokenRequirement::new(TokenKind::Night, 100)],
        );
        let eval = evaluator();
        let bob = voter("bob");

        let snap = eval
            .evaluate(&r, &bob, Balances::new(400, 0), Some(Pledge::new(TokenKind::Night, 250)))
            .await
            .unwrap();
        assert_eq!(snap.weight, TokenAmount::new(250));

        let snap = eval
            .evaluate(&r, &bob, Balances::new(400, 0), Some(Pledge::new(TokenKind::Night, 9_000)))
            .await
            .unwrap();
        assert_eq!(snap.weight, TokenAmount::new(400));
    }

    #[tokio::test]
    async fn pledge_of_unrequired_kind_is_rejected() {
        let r = rules(
            EligibilityPolicy::TokenHolders,
            vec![TokenRequirement::new(TokenKind::Night, 1)],
        );
        let err = evaluator()
            .evaluate(&r, &voter("bob"), Balances::new(10, 10), Some(Pledge::new(TokenKind::Dust, 5)))
            .await
            .unwrap_err();
        assert!(matches!(err, EligibilityError::PledgeKindNotAccepted(TokenKind::Dust)));
    }

    #[tokio::test]
    async fn secondary_kind_gates_but_never_weighs() {
        let r = rules(
            EligibilityPolicy::TokenHolders,
            vec![
                TokenRequirement::new(TokenKind::Night, 100),
                TokenRequirement::new(TokenKind::Dust, 10),
            ],
        );
        let eval = evaluator();
        let eve = voter("eve");
        let balances = Balances::new(150, 1_000_000);

        let err = eval
            .evaluate(&r, &eve, balances, Some(Pledge::new(TokenKind::Dust, 1_000_000)))
            .await
            .unwrap_err();
        assert!(matches!(err, EligibilityError::PledgeKindNotAccepted(TokenKind::Dust)));

        let snap = eval.evaluate(&r, &eve, balances, None).await.unwrap();
        assert_eq!(snap.weight, TokenAmount::new(150));
    }

    #[tokio::test]
    async fn whitelist_gives_one_vote() {
        let r = rules(
            EligibilityPolicy::Whitelist([voter("alice")].into_iter().collect()),
            vec![],
        );
        let eval = evaluator();
        let snap = eval
            .evaluate(&r, &voter("alice"), Balances::default(), None)
            .await
            .unwrap();
        assert!(snap.eligible);
        assert_eq!(snap.weight, TokenAmount::new(1));

        let err = eval
            .evaluate(&r, &voter("mallory"), Balances::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EligibilityError::NotWhitelisted(_)));
    }

    #[tokio::test]
    async fn named_group_membership() {
        let r = rules(EligibilityPolicy::NamedGroup("stewards".into()), vec![]);
        let eval = evaluator();
        assert!(eval
            .evaluate(&r, &voter("carol"), Balances::default(), None)
            .await
            .is_ok());
        let err = eval
            .evaluate(&r, &voter("dave"), Balances::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EligibilityError::NotInGroup { .. }));
    }

    #[tokio::test]
    async fn unknown_group_is_unknown_policy() {
        let r = rules(EligibilityPolicy::NamedGroup("ghosts".into()), vec![]);
        let err = evaluator()
            .evaluate(&r, &voter("carol"), Balances::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EligibilityError::UnknownPolicy(_)));
    }

    #[tokio::test]
    async fn assess_reports_rejections_without_failing() {
        let r = rules(
            EligibilityPolicy::TokenHolders,
            vec![TokenRequirement::new(TokenKind::Night, 100)],
        );
        let snap = evaluator()
            .assess(&r, &voter("bob"), Balances::new(5, 0), None)
            .await
            .unwrap();
        assert!(!snap.eligible);
        assert!(snap.weight.is_zero());
        assert!(snap.rejection.is_some());
    }
}
