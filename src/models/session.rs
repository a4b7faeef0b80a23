//! Session and platform-stat DTOs

use crate::proposal::{ProposalStats, VoteHistoryEntry};
use crate::session::Session;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session: Session,
    pub voted_proposals: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectResponse {
    pub session_id: String,
    /// Voting-record entries dropped with the session
    pub cleared_votes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub votes: Vec<VoteHistoryEntry>,
    pub total_votes: usize,
    /// Percent of decided votes that backed the winner
    pub success_rate: f64,
}

impl HistoryResponse {
    pub fn new(votes: Vec<VoteHistoryEntry>) -> Self {
        use crate::proposal::VoteResult;

        let decided = votes
            .iter()
            .filter(|v| v.result != VoteResult::Pending)
            .count();
        let won = votes.iter().filter(|v| v.result == VoteResult::Won).count();
        let success_rate = if decided == 0 {
            0.0
        } else {
            (won as f64 / decided as f64 * 100.0).round()
        };

        Self {
            total_votes: votes.len(),
            votes,
            success_rate,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub proposals: ProposalStats,
    pub connected_sessions: usize,
}
