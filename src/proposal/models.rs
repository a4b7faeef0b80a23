//! Proposal data models
//!
//! Defines the structure of campus voting proposals and their inputs.

use crate::error::{validation_error, AppError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Proposal lifecycle. `Active -> Ended` is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Open for voting
    Active,
    /// Closed; results are final
    Ended,
}

impl Default for ProposalStatus {
    fn default() -> Self {
        ProposalStatus::Active
    }
}

impl std::str::FromStr for ProposalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ProposalStatus::Active),
            "ended" => Ok(ProposalStatus::Ended),
            other => Err(AppError::BadRequest(format!(
                "Unknown proposal status '{}' (expected 'active' or 'ended')",
                other
            ))),
        }
    }
}

/// A single question with mutually exclusive options open for voting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Options in display order
    pub options: Vec<String>,
    /// Vote counts, positionally aligned with `options`
    pub votes: Vec<u64>,
    /// Always equal to the sum of `votes`
    pub total_votes: u64,
    pub end_date: NaiveDate,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

impl Proposal {
    pub fn new(id: String, input: ValidProposal) -> Self {
        let votes = vec![0; input.options.len()];
        Self {
            id,
            title: input.title,
            description: input.description,
            options: input.options,
            votes,
            total_votes: 0,
            end_date: input.end_date,
            status: ProposalStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProposalStatus::Active
    }

    /// Close voting. Closing an ended proposal is a no-op.
    pub fn close(&mut self) {
        self.status = ProposalStatus::Ended;
    }

    pub fn option_label(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    /// Count one vote for `option_index`. Either both counters move or neither does.
    pub fn record_vote(&mut self, option_index: usize) -> Result<(), AppError> {
        let slot = self.votes.get_mut(option_index).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Option {} does not exist on proposal {}",
                option_index, self.id
            ))
        })?;

        *slot += 1;
        self.total_votes += 1;
        Ok(())
    }
}

/// Raw proposal input as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    /// Calendar date in `YYYY-MM-DD` form
    pub end_date: String,
}

/// Proposal input that passed validation
#[derive(Debug, Clone)]
pub struct ValidProposal {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    pub end_date: NaiveDate,
}

impl NewProposal {
    /// Check required fields first, then options, then the date format
    pub fn validate_input(self) -> Result<ValidProposal, AppError> {
        if self.title.is_empty() || self.description.is_empty() || self.end_date.is_empty() {
            return Err(validation_error("Please fill in all required fields."));
        }

        if self.options.iter().any(|option| option.trim().is_empty()) {
            return Err(validation_error("All voting options must be filled in."));
        }

        if self.options.len() < 2 {
            return Err(validation_error("A proposal needs at least two voting options."));
        }

        let end_date = NaiveDate::parse_from_str(self.end_date.trim(), "%Y-%m-%d").map_err(|_| {
            validation_error(format!(
                "Invalid end date '{}' (expected YYYY-MM-DD)",
                self.end_date
            ))
        })?;

        Ok(ValidProposal {
            title: self.title,
            description: self.description,
            options: self.options,
            end_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(options: &[&str]) -> NewProposal {
        NewProposal {
            title: "Library Operating Hours".to_string(),
            description: "Extend hours during finals week?".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            end_date: "2025-06-20".to_string(),
        }
    }

    #[test]
    fn test_valid_input() {
        let valid = input(&["Yes", "No"]).validate_input().unwrap();
        assert_eq!(valid.options.len(), 2);
        assert_eq!(valid.end_date, NaiveDate::from_ymd_opt(2025, 6, 20).unwrap());
    }

    #[test]
    fn test_missing_required_field() {
        let mut missing_title = input(&["Yes", "No"]);
        missing_title.title.clear();
        let err = missing_title.validate_input().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("required fields")));

        let mut missing_date = input(&["Yes", "No"]);
        missing_date.end_date.clear();
        assert!(missing_date.validate_input().is_err());
    }

    #[test]
    fn test_blank_option_rejected() {
        let err = input(&["Yes", "   "]).validate_input().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("voting options")));
    }

    #[test]
    fn test_single_option_rejected() {
        assert!(input(&["Only"]).validate_input().is_err());
        assert!(input(&[]).validate_input().is_err());
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut bad = input(&["Yes", "No"]);
        bad.end_date = "next friday".to_string();
        assert!(bad.validate_input().is_err());
    }

    #[test]
    fn test_record_vote_out_of_range_leaves_counts() {
        let mut proposal = Proposal::new("1".into(), input(&["A", "B"]).validate_input().unwrap());
        assert!(proposal.record_vote(5).is_err());
        assert_eq!(proposal.votes, vec![0, 0]);
        assert_eq!(proposal.total_votes, 0);

        proposal.record_vote(1).unwrap();
        assert_eq!(proposal.votes, vec![0, 1]);
        assert_eq!(proposal.total_votes, 1);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Active".parse::<ProposalStatus>().unwrap(), ProposalStatus::Active);
        assert_eq!("ended".parse::<ProposalStatus>().unwrap(), ProposalStatus::Ended);
        assert!("closed".parse::<ProposalStatus>().is_err());
    }
}
