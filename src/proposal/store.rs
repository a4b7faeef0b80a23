//! Proposal storage
//!
//! In-memory store for proposals and per-session voting records.

use crate::config::VotingConfig;
use crate::error::AppError;
use crate::proposal::ledger::{Ballot, SimulatedLedger, VoteReceipt};
use crate::proposal::tally::{compute_winner, WinnerResult};
use crate::proposal::{NewProposal, Proposal, ProposalStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// A vote a session has had accepted
#[derive(Debug, Clone)]
struct CastVote {
    option_index: usize,
    cast_at: DateTime<Utc>,
    signature: String,
}

/// Voting record of one session
#[derive(Debug, Default)]
struct SessionBallots {
    cast: HashMap<String, CastVote>,
    /// Proposals with a vote still waiting on the ledger
    pending: HashSet<String>,
}

type BallotBook = Arc<Mutex<HashMap<Uuid, SessionBallots>>>;

/// Claim on a (session, proposal) pair while its vote is in flight.
/// Dropping it without `commit` releases the claim.
struct Reservation {
    book: BallotBook,
    session_id: Uuid,
    proposal_id: String,
    settled: bool,
}

impl Reservation {
    fn commit(mut self, option_index: usize, receipt: &VoteReceipt) {
        if let Ok(mut book) = self.book.lock() {
            // A session that disconnected mid-vote keeps no record
            if let Some(ballots) = book.get_mut(&self.session_id) {
                ballots.pending.remove(&self.proposal_id);
                ballots.cast.insert(
                    self.proposal_id.clone(),
                    CastVote {
                        option_index,
                        cast_at: receipt.recorded_at,
                        signature: receipt.signature.clone(),
                    },
                );
            }
        }
        self.settled = true;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Ok(mut book) = self.book.lock() {
            if let Some(ballots) = book.get_mut(&self.session_id) {
                ballots.pending.remove(&self.proposal_id);
            }
        }
    }
}

/// Result of an accepted vote
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub proposal: Proposal,
    pub receipt: VoteReceipt,
}

/// How a session's choice fared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteResult {
    Won,
    Lost,
    Tie,
    /// Proposal still active
    Pending,
}

/// One line of a session's voting history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteHistoryEntry {
    pub proposal_id: String,
    pub proposal_title: String,
    pub option_index: usize,
    pub choice: String,
    pub cast_at: DateTime<Utc>,
    pub signature: String,
    pub result: VoteResult,
}

/// Aggregate counts over all proposals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalStats {
    pub total_proposals: usize,
    pub active_proposals: usize,
    pub ended_proposals: usize,
    pub total_votes: u64,
}

/// Thread-safe proposal store
pub struct ProposalStore {
    /// Most recent first
    proposals: Arc<RwLock<Vec<Proposal>>>,
    ballots: BallotBook,
    ledger: SimulatedLedger,
    next_id: AtomicU64,
}

impl ProposalStore {
    pub fn new(config: &VotingConfig) -> Self {
        Self::with_proposals(config, Vec::new())
    }

    /// Create a store pre-populated with `proposals` (most recent first)
    pub fn with_proposals(config: &VotingConfig, proposals: Vec<Proposal>) -> Self {
        let highest = proposals
            .iter()
            .filter_map(|p| p.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let next_id = highest.max(proposals.len() as u64) + 1;

        Self {
            proposals: Arc::new(RwLock::new(proposals)),
            ballots: Arc::new(Mutex::new(HashMap::new())),
            ledger: SimulatedLedger::new(config),
            next_id: AtomicU64::new(next_id),
        }
    }

    /// Create a new proposal and put it at the head of the list
    pub async fn create(&self, input: NewProposal) -> Result<Proposal, AppError> {
        let valid = input.validate_input()?;

        let mut proposals = self.proposals.write().await;
        let id = loop {
            let candidate = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
            if !proposals.iter().any(|p| p.id == candidate) {
                break candidate;
            }
        };

        let proposal = Proposal::new(id, valid);
        proposals.insert(0, proposal.clone());

        info!(
            "Created proposal {} '{}' with {} options",
            proposal.id,
            proposal.title,
            proposal.options.len()
        );
        Ok(proposal)
    }

    /// Get a proposal by ID
    pub async fn get(&self, id: &str) -> Result<Proposal, AppError> {
        let proposals = self.proposals.read().await;
        proposals
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", id)))
    }

    /// List proposals, most recent first (optionally filtered by status)
    pub async fn list(&self, status: Option<ProposalStatus>) -> Vec<Proposal> {
        let proposals = self.proposals.read().await;
        proposals
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect()
    }

    /// Cast a vote for `option_index` on behalf of a connected session.
    ///
    /// The (session, proposal) pair is claimed before the ledger round-trip and
    /// only released by commit, failure or cancellation, so a duplicate attempt
    /// issued while the first is in flight is rejected as already voted.
    pub async fn cast_vote(
        &self,
        session_id: Option<Uuid>,
        proposal_id: &str,
        option_index: usize,
    ) -> Result<VoteOutcome, AppError> {
        let session_id = session_id.ok_or_else(|| {
            AppError::NotConnected("Please connect your wallet to vote.".to_string())
        })?;

        {
            let proposals = self.proposals.read().await;
            let proposal = proposals
                .iter()
                .find(|p| p.id == proposal_id)
                .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", proposal_id)))?;

            if !proposal.is_active() {
                return Err(AppError::BadRequest(format!(
                    "Voting on proposal {} has ended",
                    proposal_id
                )));
            }

            if proposal.option_label(option_index).is_none() {
                return Err(AppError::BadRequest(format!(
                    "Option {} does not exist on proposal {}",
                    option_index, proposal_id
                )));
            }
        }

        let reservation = self.reserve(session_id, proposal_id)?;

        let ballot = Ballot {
            session_id,
            proposal_id: proposal_id.to_string(),
            option_index,
        };
        let receipt = match self.ledger.submit(&ballot).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("Vote on proposal {} was not recorded: {}", proposal_id, e);
                return Err(e);
            }
        };

        let proposal = {
            let mut proposals = self.proposals.write().await;
            let proposal = proposals
                .iter_mut()
                .find(|p| p.id == proposal_id)
                .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", proposal_id)))?;
            proposal.record_vote(option_index)?;
            proposal.clone()
        };

        reservation.commit(option_index, &receipt);

        info!(
            "Vote recorded on proposal {} (option {}), tx {}",
            proposal_id, option_index, receipt.signature
        );
        Ok(VoteOutcome { proposal, receipt })
    }

    /// Start an empty voting record for a newly connected session.
    /// Votes are only accepted for sessions opened here.
    pub fn open_session(&self, session_id: Uuid) -> Result<(), AppError> {
        let mut book = self.lock_book()?;
        book.entry(session_id).or_default();
        Ok(())
    }

    /// Whether the session has an accepted vote on the proposal
    pub fn has_voted(&self, session_id: Uuid, proposal_id: &str) -> Result<bool, AppError> {
        let book = self.lock_book()?;
        Ok(book
            .get(&session_id)
            .map_or(false, |ballots| ballots.cast.contains_key(proposal_id)))
    }

    /// IDs of the proposals the session has voted on
    pub fn voted_proposals(&self, session_id: Uuid) -> Result<Vec<String>, AppError> {
        let book = self.lock_book()?;
        let mut ids: Vec<String> = book
            .get(&session_id)
            .map(|ballots| ballots.cast.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    /// Forget everything the session voted on (wallet disconnect)
    pub fn clear_session(&self, session_id: Uuid) -> Result<usize, AppError> {
        let mut book = self.lock_book()?;
        Ok(book
            .remove(&session_id)
            .map_or(0, |ballots| ballots.cast.len()))
    }

    /// The session's votes, newest first, with how each choice fared
    pub async fn history(&self, session_id: Uuid) -> Result<Vec<VoteHistoryEntry>, AppError> {
        let cast: Vec<(String, CastVote)> = {
            let book = self.lock_book()?;
            book.get(&session_id)
                .map(|ballots| {
                    ballots
                        .cast
                        .iter()
                        .map(|(id, vote)| (id.clone(), vote.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        let proposals = self.proposals.read().await;
        let mut entries: Vec<VoteHistoryEntry> = cast
            .into_iter()
            .filter_map(|(proposal_id, vote)| {
                let proposal = proposals.iter().find(|p| p.id == proposal_id)?;
                Some(VoteHistoryEntry {
                    proposal_title: proposal.title.clone(),
                    choice: proposal.option_label(vote.option_index)?.to_string(),
                    result: Self::vote_result(proposal, vote.option_index),
                    proposal_id,
                    option_index: vote.option_index,
                    cast_at: vote.cast_at,
                    signature: vote.signature,
                })
            })
            .collect();

        entries.sort_by(|a, b| b.cast_at.cmp(&a.cast_at));
        Ok(entries)
    }

    /// Aggregate counts across all proposals
    pub async fn stats(&self) -> ProposalStats {
        let proposals = self.proposals.read().await;
        let active = proposals.iter().filter(|p| p.is_active()).count();
        ProposalStats {
            total_proposals: proposals.len(),
            active_proposals: active,
            ended_proposals: proposals.len() - active,
            total_votes: proposals.iter().map(|p| p.total_votes).sum(),
        }
    }

    /// Get proposal count
    pub async fn count(&self) -> usize {
        let proposals = self.proposals.read().await;
        proposals.len()
    }

    fn vote_result(proposal: &Proposal, option_index: usize) -> VoteResult {
        if proposal.is_active() {
            return VoteResult::Pending;
        }
        match compute_winner(proposal) {
            Some(WinnerResult::Winner { index, .. }) if index == option_index => VoteResult::Won,
            Some(WinnerResult::Tie { tied_indices, .. }) if tied_indices.contains(&option_index) => {
                VoteResult::Tie
            }
            _ => VoteResult::Lost,
        }
    }

    fn reserve(&self, session_id: Uuid, proposal_id: &str) -> Result<Reservation, AppError> {
        let mut book = self.lock_book()?;
        // Cleared on disconnect; never re-created for a dead session
        let ballots = book.get_mut(&session_id).ok_or_else(|| {
            AppError::NotConnected("Please connect your wallet to vote.".to_string())
        })?;

        if ballots.cast.contains_key(proposal_id) || ballots.pending.contains(proposal_id) {
            return Err(AppError::AlreadyVoted(
                "You have already voted on this proposal.".to_string(),
            ));
        }
        ballots.pending.insert(proposal_id.to_string());

        Ok(Reservation {
            book: Arc::clone(&self.ballots),
            session_id,
            proposal_id: proposal_id.to_string(),
            settled: false,
        })
    }

    fn lock_book(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionBallots>>, AppError> {
        self.ballots
            .lock()
            .map_err(|_| AppError::Internal("Voting record lock poisoned".to_string()))
    }
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new(&VotingConfig::default())
    }
}
