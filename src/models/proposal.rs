//! Proposal-related models and DTOs

use crate::proposal::tally::{compute_winner, round_to_tenth, vote_percentage, WinnerResult};
use crate::proposal::{NewProposal, Proposal, ProposalStatus, VoteReceipt};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a new proposal
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "A proposal can have at most 20 options"))]
    pub options: Vec<String>,
    #[serde(default)]
    pub end_date: String,
}

impl From<CreateProposalRequest> for NewProposal {
    fn from(req: CreateProposalRequest) -> Self {
        NewProposal {
            title: req.title,
            description: req.description,
            options: req.options,
            end_date: req.end_date,
        }
    }
}

/// Request to cast a vote
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub option_index: usize,
}

/// Query parameters for listing proposals
#[derive(Debug, Deserialize)]
pub struct ProposalListQuery {
    pub status: Option<String>,
}

/// One option with its tally
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub index: usize,
    pub label: String,
    pub votes: u64,
    /// Percent of all votes, one decimal place
    pub percentage: f64,
    /// Marked only once the proposal has ended
    pub is_winning: bool,
}

/// Proposal as shown to a client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub options: Vec<OptionTally>,
    pub total_votes: u64,
    pub end_date: NaiveDate,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub has_voted: bool,
    pub can_vote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<WinnerResult>,
}

impl ProposalView {
    pub fn new(proposal: Proposal, has_voted: bool, connected: bool) -> Self {
        let winner = compute_winner(&proposal);
        let ended = !proposal.is_active();
        let winning_index = match &winner {
            Some(WinnerResult::Winner { index, .. }) if ended => Some(*index),
            _ => None,
        };

        let options = proposal
            .options
            .iter()
            .zip(proposal.votes.iter())
            .enumerate()
            .map(|(index, (label, &votes))| OptionTally {
                index,
                label: label.clone(),
                votes,
                percentage: round_to_tenth(vote_percentage(votes, proposal.total_votes)),
                is_winning: winning_index == Some(index),
            })
            .collect();

        Self {
            can_vote: connected && !ended && !has_voted,
            id: proposal.id,
            title: proposal.title,
            description: proposal.description,
            options,
            total_votes: proposal.total_votes,
            end_date: proposal.end_date,
            status: proposal.status,
            created_at: proposal.created_at,
            has_voted,
            winner,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub proposal: ProposalView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalListResponse {
    pub proposals: Vec<ProposalView>,
    pub active_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub proposal: ProposalView,
    pub receipt: VoteReceipt,
}

/// Final or running result of a proposal
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub proposal_id: String,
    pub status: ProposalStatus,
    pub total_votes: u64,
    pub is_final: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<WinnerResult>,
    /// Rounded share of the leading option(s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading_percentage: Option<f64>,
    pub summary: String,
}

impl ResultsResponse {
    pub fn new(proposal: &Proposal) -> Self {
        let result = compute_winner(proposal);
        let summary = result
            .as_ref()
            .map(WinnerResult::summary)
            .unwrap_or_else(|| "No votes recorded for this proposal".to_string());

        Self {
            proposal_id: proposal.id.clone(),
            status: proposal.status,
            total_votes: proposal.total_votes,
            is_final: !proposal.is_active(),
            leading_percentage: result.as_ref().map(|r| round_to_tenth(r.percentage())),
            result,
            summary,
        }
    }
}
