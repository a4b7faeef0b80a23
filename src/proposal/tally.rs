//! Vote tallying
//!
//! Percentages and winner/tie detection over a proposal's vote counts.

use crate::proposal::Proposal;
use serde::Serialize;

/// Outcome of a proposal's vote counts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WinnerResult {
    /// Exactly one option holds the most votes
    #[serde(rename_all = "camelCase")]
    Winner {
        option: String,
        index: usize,
        votes: u64,
        percentage: f64,
    },
    /// Two or more options share the most votes
    #[serde(rename_all = "camelCase")]
    Tie {
        votes: u64,
        percentage: f64,
        tied_indices: Vec<usize>,
    },
}

impl WinnerResult {
    pub fn percentage(&self) -> f64 {
        match self {
            WinnerResult::Winner { percentage, .. } | WinnerResult::Tie { percentage, .. } => {
                *percentage
            }
        }
    }

    /// Human-readable result line
    pub fn summary(&self) -> String {
        match self {
            WinnerResult::Winner { option, votes, percentage, .. } => format!(
                "Winner: \"{}\" with {} votes ({:.1}%)",
                option, votes, round_to_tenth(*percentage)
            ),
            WinnerResult::Tie { votes, percentage, .. } => format!(
                "Result: Tie with {} votes each ({:.1}%)",
                votes, round_to_tenth(*percentage)
            ),
        }
    }
}

/// Share of `total` held by `votes`, in percent. Zero when nobody voted.
pub fn vote_percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    votes as f64 / total as f64 * 100.0
}

/// Round to one decimal place, halves away from zero
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Winner or tie for a proposal, `None` when no votes were cast
pub fn compute_winner(proposal: &Proposal) -> Option<WinnerResult> {
    if proposal.total_votes == 0 {
        return None;
    }

    let max_votes = proposal.votes.iter().copied().max()?;
    let leaders: Vec<usize> = proposal
        .votes
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == max_votes)
        .map(|(index, _)| index)
        .collect();

    let percentage = vote_percentage(max_votes, proposal.total_votes);

    if leaders.len() > 1 {
        return Some(WinnerResult::Tie {
            votes: max_votes,
            percentage,
            tied_indices: leaders,
        });
    }

    let index = leaders[0];
    Some(WinnerResult::Winner {
        option: proposal.options.get(index)?.clone(),
        index,
        votes: max_votes,
        percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ProposalStatus;
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    fn proposal_with(votes: &[u64]) -> Proposal {
        Proposal {
            id: "1".to_string(),
            title: "Campus Sustainability Initiative".to_string(),
            description: "Which project first?".to_string(),
            options: (0..votes.len()).map(|i| format!("Option {}", i + 1)).collect(),
            votes: votes.to_vec(),
            total_votes: votes.iter().sum(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 25).unwrap(),
            status: ProposalStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(vote_percentage(0, 0), 0.0);
        assert_eq!(vote_percentage(5, 0), 0.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(vote_percentage(1, 4), 25.0);
        assert_eq!(round_to_tenth(vote_percentage(5, 9)), 55.6);
        assert_eq!(round_to_tenth(vote_percentage(1, 3)), 33.3);
    }

    #[test]
    fn test_no_votes_no_winner() {
        assert_eq!(compute_winner(&proposal_with(&[0, 0, 0])), None);
    }

    #[test]
    fn test_tie_detected() {
        let result = compute_winner(&proposal_with(&[3, 3, 1])).unwrap();
        match result {
            WinnerResult::Tie { votes, tied_indices, .. } => {
                assert_eq!(votes, 3);
                assert_eq!(tied_indices, vec![0, 1]);
            }
            other => panic!("expected tie, got {:?}", other),
        }
    }

    #[test]
    fn test_tie_independent_of_position() {
        let result = compute_winner(&proposal_with(&[1, 4, 2, 4])).unwrap();
        assert!(matches!(result, WinnerResult::Tie { votes: 4, .. }));
    }

    #[test]
    fn test_single_winner() {
        let result = compute_winner(&proposal_with(&[5, 3, 1])).unwrap();
        match &result {
            WinnerResult::Winner { option, index, votes, percentage } => {
                assert_eq!(option, "Option 1");
                assert_eq!(*index, 0);
                assert_eq!(*votes, 5);
                assert_eq!(round_to_tenth(*percentage), 55.6);
            }
            other => panic!("expected winner, got {:?}", other),
        }
        assert_eq!(result.summary(), "Winner: \"Option 1\" with 5 votes (55.6%)");
    }

    #[test]
    fn test_winner_not_first() {
        let result = compute_winner(&proposal_with(&[1, 2, 7])).unwrap();
        assert!(matches!(result, WinnerResult::Winner { index: 2, votes: 7, .. }));
    }
}
