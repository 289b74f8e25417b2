//! The governance engine: one owned instance holding every proposal.
//!
//! Proposals live behind their own `tokio::sync::Mutex`. Calls out to
//! collaborators (ledger, group resolver, proof service) are made with no lock
//! held, then the phase check and the write happen together under the lock.
//! A caller that drops a future mid-way leaves no partial write behind.

use crate::config::GovernanceConfig;
use crate::eligibility::{group_failure, EligibilityEvaluator, EligibilitySnapshot};
use crate::error::{ErrorKind, GovernanceError, LedgerError};
use crate::ledger::TokenLedgerView;
use crate::lifecycle::ProposalPhase;
use crate::proposal::{EligibilityPolicy, Pledge, ProposalRules, ProposalSpec};
use crate::record::ProposalRecord;
use crate::spans;
use crate::view::{ProposalFilter, ProposalView, VoterStatus};
use futures_util::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn, Instrument};
use umbra_crypto::derive_proposal_id;
use umbra_groups::GroupResolver;
use umbra_types::{
    Clock, CommitmentHash, ProposalId, Secret, Timestamp, TokenAmount, VoteChoice, VoterId,
};
use umbra_utils::{format_duration, StatsCounter};
use umbra_zk::{ProofService, ZkProof};

const STAT_NAMES: &[&str] = &[
    "proposals_created",
    "commitments_accepted",
    "commitments_rejected",
    "reveals_accepted",
    "reveals_rejected",
    "proposals_closed",
];

type SharedRecord = Arc<Mutex<ProposalRecord>>;

#[derive(Default)]
struct ProposalTable {
    records: HashMap<ProposalId, SharedRecord>,
    /// Insertion order, for stable listing.
    order: Vec<ProposalId>,
}

pub struct GovernanceEngine {
    config: GovernanceConfig,
    proposals: RwLock<ProposalTable>,
    ledger: Arc<dyn TokenLedgerView>,
    groups: Arc<dyn GroupResolver>,
    evaluator: EligibilityEvaluator,
    proofs: Arc<dyn ProofService>,
    clock: Arc<dyn Clock>,
    stats: StatsCounter,
}

impl GovernanceEngine {
    pub fn new(
        config: GovernanceConfig,
        ledger: Arc<dyn TokenLedgerView>,
        groups: Arc<dyn GroupResolver>,
        proofs: Arc<dyn ProofService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            proposals: RwLock::new(ProposalTable::default()),
            ledger,
            evaluator: EligibilityEvaluator::new(groups.clone()),
            groups,
            proofs,
            clock,
            stats: StatsCounter::new(STAT_NAMES),
        }
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Counter snapshot: created/closed proposals, accepted/rejected votes.
    pub fn stats(&self) -> BTreeMap<&'static str, u64> {
        self.stats.snapshot()
    }

    // ── Proposals ─────────────────────────────────────────────────────

    /// Validate `spec` and register a new proposal.
    ///
    /// With `auto_activate`, the proposal starts in `Commit` and its eligible
    /// weight is snapshotted immediately. Otherwise it waits in `Pending`
    /// for [`activate`](Self::activate).
    pub async fn create_proposal(&self, spec: ProposalSpec) -> Result<ProposalId, GovernanceError> {
        let now = self.clock.now();
        let id = derive_proposal_id(&spec.creator, now);
        async {
            let proposal = spec.into_proposal(id, now, &self.config)?;
            if let EligibilityPolicy::NamedGroup(group) = &proposal.rules.policy {
                self.groups.member_count(group).await.map_err(group_failure)?;
            }
            if self.config.require_proposer_eligibility && !proposal.rules.required_tokens.is_empty()
            {
                let balances = self.ledger.balances(&proposal.creator).await?;
                EligibilityEvaluator::check_tokens(&proposal.rules, balances)?;
            }

            let mut record = ProposalRecord::new(proposal);
            if self.config.auto_activate {
                let eligible = self.eligible_weight(&record.proposal().rules).await?;
                record.activate(now, eligible)?;
            }
            let phase = record.phase();
            let commit_secs = record.proposal().commit_deadline.remaining_from(now);

            let mut table = self.proposals.write().await;
            table.records.insert(id, Arc::new(Mutex::new(record)));
            table.order.push(id);
            drop(table);

            self.stats.increment("proposals_created");
            info!(%phase, commit_window = %format_duration(commit_secs), "proposal created");
            Ok(id)
        }
        .instrument(spans::proposal_span("create", &id))
        .await
        .inspect_err(|e| warn!(proposal = %id, error = %e, "proposal rejected"))
    }

    /// `Pending → Commit`. Only the proposer may call this.
    pub async fn activate(
        &self,
        id: &ProposalId,
        actor: &VoterId,
    ) -> Result<ProposalPhase, GovernanceError> {
        async {
            let record = self.record(id).await?;
            let rules = {
                let rec = record.lock().await;
                authorize(&rec, actor)?;
                rec.ensure_phase(ProposalPhase::Pending, "activate")?;
                rec.proposal().rules.clone()
            };
            let eligible = self.eligible_weight(&rules).await?;

            let mut rec = record.lock().await;
            let now = self.clock.now();
            rec.activate(now, eligible)?;
            info!(eligible_weight = %eligible, "proposal activated");
            self.settle(&mut rec, now);
            Ok(rec.phase())
        }
        .instrument(spans::proposal_span("activate", id))
        .await
    }

    /// `Commit → Reveal` ahead of the commit deadline. Only the proposer may
    /// call this.
    pub async fn close_commit_phase(
        &self,
        id: &ProposalId,
        actor: &VoterId,
    ) -> Result<ProposalPhase, GovernanceError> {
        async {
            let record = self.record(id).await?;
            let mut rec = record.lock().await;
            authorize(&rec, actor)?;
            let now = self.clock.now();
            self.settle(&mut rec, now);
            rec.close_commit(now)?;
            info!("commit phase closed");
            Ok(rec.phase())
        }
        .instrument(spans::proposal_span("close_commit", id))
        .await
    }

    /// `Reveal → Tallying → Closed` ahead of the reveal deadline. Only the
    /// proposer may call this. The result is fixed when this returns.
    pub async fn close_reveal_phase(
        &self,
        id: &ProposalId,
        actor: &VoterId,
    ) -> Result<ProposalPhase, GovernanceError> {
        async {
            let record = self.record(id).await?;
            let mut rec = record.lock().await;
            authorize(&rec, actor)?;
            let now = self.clock.now();
            self.settle(&mut rec, now);
            rec.finalize(now)?;
            self.record_close(&rec);
            Ok(rec.phase())
        }
        .instrument(spans::proposal_span("close_reveal", id))
        .await
    }

    /// Apply every overdue deadline across all proposals. Returns the
    /// proposals that moved and the phase each landed in.
    pub async fn advance_deadlines(&self) -> Vec<(ProposalId, ProposalPhase)> {
        let records = self.all_records().await;
        let now = self.clock.now();
        let mut moved = Vec::new();
        for (id, record) in records {
            let mut rec = record.lock().await;
            if let Some(phase) = self.settle(&mut rec, now) {
                moved.push((id, phase));
            }
        }
        moved
    }

    // ── Votes ─────────────────────────────────────────────────────────

    /// Record `voter`'s sealed vote.
    ///
    /// On token-weighted proposals the weight is the pledge, capped at the
    /// voter's balance. Without a pledge the whole balance of the primary
    /// token is used.
    pub async fn submit_commitment(
        &self,
        id: &ProposalId,
        voter: &VoterId,
        commitment: CommitmentHash,
        pledge: Option<Pledge>,
    ) -> Result<(), GovernanceError> {
        async {
            let outcome = self.commit_inner(id, voter, commitment, pledge).await;
            match &outcome {
                Ok(()) => self.stats.increment("commitments_accepted"),
                Err(e) => self.note_rejection("commitments_rejected", e),
            }
            outcome
        }
        .instrument(spans::commit_span(id, voter))
        .await
    }

    /// Open `voter`'s commitment by disclosing the choice and secret.
    pub async fn submit_reveal(
        &self,
        id: &ProposalId,
        voter: &VoterId,
        choice: VoteChoice,
        secret: Secret,
    ) -> Result<(), GovernanceError> {
        self.reveal_outer(id, voter, choice, secret, None).await
    }

    /// Like [`submit_reveal`](Self::submit_reveal), with a zero-knowledge
    /// proof that is checked against the stored commitment on private
    /// proposals. Ignored on public ones.
    pub async fn submit_reveal_with_proof(
        &self,
        id: &ProposalId,
        voter: &VoterId,
        choice: VoteChoice,
        secret: Secret,
        proof: ZkProof,
    ) -> Result<(), GovernanceError> {
        self.reveal_outer(id, voter, choice, secret, Some(proof)).await
    }

    // ── Reads ─────────────────────────────────────────────────────────

    pub async fn get_proposal_state(&self, id: &ProposalId) -> Result<ProposalView, GovernanceError> {
        let record = self.record(id).await?;
        let mut rec = record.lock().await;
        self.settle(&mut rec, self.clock.now());
        Ok(rec.view())
    }

    pub async fn get_voter_status(
        &self,
        id: &ProposalId,
        voter: &VoterId,
    ) -> Result<VoterStatus, GovernanceError> {
        let record = self.record(id).await?;
        let mut rec = record.lock().await;
        self.settle(&mut rec, self.clock.now());
        Ok(rec.voter_status(voter))
    }

    /// Every proposal matching `filter`, oldest first.
    pub async fn list_proposals(&self, filter: &ProposalFilter) -> Vec<ProposalView> {
        let records = self.all_records().await;
        let now = self.clock.now();
        let mut views = Vec::with_capacity(records.len());
        for (_, record) in records {
            let mut rec = record.lock().await;
            self.settle(&mut rec, now);
            let view = rec.view();
            if filter.matches(&view) {
                views.push(view);
            }
        }
        views.sort_by_key(|v| v.created_at);
        views
    }

    /// Preview whether `voter` could commit on a proposal, and with what
    /// weight, without submitting anything.
    pub async fn check_eligibility(
        &self,
        id: &ProposalId,
        voter: &VoterId,
    ) -> Result<EligibilitySnapshot, GovernanceError> {
        let rules = {
            let record = self.record(id).await?;
            let rec = record.lock().await;
            rec.proposal().rules.clone()
        };
        let balances = self.ledger.balances(voter).await?;
        Ok(self.evaluator.assess(&rules, voter, balances, None).await?)
    }

    // ── Internals ─────────────────────────────────────────────────────

    async fn record(&self, id: &ProposalId) -> Result<SharedRecord, GovernanceError> {
        self.proposals
            .read()
            .await
            .records
            .get(id)
            .cloned()
            .ok_or(GovernanceError::ProposalNotFound(*id))
    }

    async fn all_records(&self) -> Vec<(ProposalId, SharedRecord)> {
        let table = self.proposals.read().await;
        table
            .order
            .iter()
            .filter_map(|id| table.records.get(id).map(|r| (*id, r.clone())))
            .collect()
    }

    async fn commit_inner(
        &self,
        id: &ProposalId,
        voter: &VoterId,
        commitment: CommitmentHash,
        pledge: Option<Pledge>,
    ) -> Result<(), GovernanceError> {
        let record = self.record(id).await?;
        let rules = {
            let mut rec = record.lock().await;
            self.settle(&mut rec, self.clock.now());
            rec.check_commit_open(voter)?;
            rec.proposal().rules.clone()
        };

        let balances = self.ledger.balances(voter).await?;
        let snapshot = self.evaluator.evaluate(&rules, voter, balances, pledge).await?;

        // The phase may have moved, or a concurrent call may have committed,
        // while the lock was released.
        let mut rec = record.lock().await;
        let now = self.clock.now();
        self.settle(&mut rec, now);
        let accepted = rec.submit_commitment(voter.clone(), commitment, snapshot.weight, pledge, now)?;
        debug!(weight = %accepted.weight, "commitment accepted");
        Ok(())
    }

    async fn reveal_outer(
        &self,
        id: &ProposalId,
        voter: &VoterId,
        choice: VoteChoice,
        secret: Secret,
        proof: Option<ZkProof>,
    ) -> Result<(), GovernanceError> {
        async {
            let outcome = self.reveal_inner(id, voter, choice, secret, proof).await;
            match &outcome {
                Ok(()) => self.stats.increment("reveals_accepted"),
                Err(e) => self.note_rejection("reveals_rejected", e),
            }
            outcome
        }
        .instrument(spans::reveal_span(id, voter))
        .await
    }

    async fn reveal_inner(
        &self,
        id: &ProposalId,
        voter: &VoterId,
        choice: VoteChoice,
        secret: Secret,
        proof: Option<ZkProof>,
    ) -> Result<(), GovernanceError> {
        let record = self.record(id).await?;
        let (mode, stored) = {
            let mut rec = record.lock().await;
            self.settle(&mut rec, self.clock.now());
            let stored = rec.check_reveal_open(voter)?.commitment;
            (rec.proposal().rules.anonymity, stored)
        };

        if mode.is_private() {
            match &proof {
                Some(proof) => {
                    if !self.proofs.verify(proof, &stored).await? {
                        return Err(GovernanceError::ProofRejected(voter.to_string()));
                    }
                    debug!(backend = self.proofs.name(), "proof verified");
                }
                None if self.config.require_proofs_in_private_modes => {
                    return Err(GovernanceError::MissingProof);
                }
                None => {}
            }
        }

        let mut rec = record.lock().await;
        let now = self.clock.now();
        self.settle(&mut rec, now);
        let accepted = rec.submit_reveal(voter, choice, secret, now)?;
        debug!(weight = %accepted.weight, "reveal accepted");
        Ok(())
    }

    /// Apply overdue deadlines to one record. Must be called with its lock held.
    fn settle(&self, rec: &mut ProposalRecord, now: Timestamp) -> Option<ProposalPhase> {
        let moved = rec.apply_deadlines(now)?;
        info!(proposal = %rec.proposal().id, phase = %moved, "deadline reached");
        if moved == ProposalPhase::Closed {
            self.record_close(rec);
        }
        Some(moved)
    }

    fn record_close(&self, rec: &ProposalRecord) {
        let _span = spans::tally_span(&rec.proposal().id).entered();
        self.stats.increment("proposals_closed");
        if let Some(result) = rec.result() {
            info!(
                approved = result.approved,
                yes = %result.weights.yes,
                no = %result.weights.no,
                abstain = %result.weights.abstain,
                participation_bps = result.participation_bps,
                quorum_met = result.quorum_met,
                "proposal closed"
            );
        }
    }

    fn note_rejection(&self, counter: &'static str, err: &GovernanceError) {
        self.stats.increment(counter);
        match err.kind() {
            ErrorKind::External => error!(error = %err, "collaborator failed"),
            kind => warn!(error = %err, ?kind, "rejected"),
        }
    }

    /// Total weight the electorate could bring, fixed at activation.
    async fn eligible_weight(&self, rules: &ProposalRules) -> Result<TokenAmount, GovernanceError> {
        let primary = rules.primary_token();
        match &rules.policy {
            EligibilityPolicy::Whitelist(members) => {
                let Some(kind) = primary else {
                    return Ok(TokenAmount::new(members.len() as u128));
                };
                let lookups = members.iter().map(|m| self.ledger.balances(m));
                let mut total = TokenAmount::ZERO;
                for lookup in join_all(lookups).await {
                    let weight = match lookup {
                        Ok(balances) if EligibilityEvaluator::check_tokens(rules, balances).is_ok() => {
                            balances.get(kind)
                        }
                        Ok(_) | Err(LedgerError::UnknownAccount(_)) => TokenAmount::ZERO,
                        Err(e) => return Err(e.into()),
                    };
                    total = total.saturating_add(weight);
                }
                Ok(total)
            }
            EligibilityPolicy::NamedGroup(group) => {
                let count = self
                    .groups
                    .member_count(group)
                    .await
                    .map_err(group_failure)?;
                match primary {
                    None => Ok(TokenAmount::new(count as u128)),
                    Some(kind) => Ok(self.ledger.circulating_supply(kind).await?),
                }
            }
            EligibilityPolicy::TokenHolders => match primary {
                Some(kind) => Ok(self.ledger.circulating_supply(kind).await?),
                None => Ok(TokenAmount::ZERO),
            },
        }
    }
}

fn authorize(rec: &ProposalRecord, actor: &VoterId) -> Result<(), GovernanceError> {
    if rec.proposal().creator == *actor {
        Ok(())
    } else {
        Err(GovernanceError::NotProposer)
    }
}
