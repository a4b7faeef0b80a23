//! Sample proposals loaded at startup for demos

use crate::proposal::{Proposal, ProposalStatus};
use chrono::{NaiveDate, Utc};

struct SampleProposal {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    options: &'static [&'static str],
    votes: &'static [u64],
    end_date: (i32, u32, u32),
    status: ProposalStatus,
}

const SAMPLES: &[SampleProposal] = &[
    SampleProposal {
        id: "1",
        title: "Student Union Budget Allocation",
        description: "How should we allocate the $50,000 student union budget for the upcoming semester?",
        options: &[
            "Events & Activities (40%)",
            "Facility Improvements (35%)",
            "Emergency Fund (25%)",
        ],
        votes: &[156, 134, 89],
        end_date: (2025, 7, 1),
        status: ProposalStatus::Active,
    },
    SampleProposal {
        id: "2",
        title: "Campus Sustainability Initiative",
        description: "Which sustainability project should be prioritized this year?",
        options: &[
            "Solar Panel Installation",
            "Bike Sharing Program",
            "Waste Reduction Campaign",
        ],
        votes: &[203, 167, 145],
        end_date: (2025, 6, 25),
        status: ProposalStatus::Active,
    },
    SampleProposal {
        id: "3",
        title: "Library Operating Hours",
        description: "Should the library extend its operating hours during finals week?",
        options: &["Yes, 24/7 access", "Yes, until 2 AM", "Keep current hours"],
        votes: &[289, 156, 67],
        end_date: (2025, 6, 20),
        status: ProposalStatus::Ended,
    },
];

/// Sample proposals, most recent first
pub fn sample_proposals() -> Vec<Proposal> {
    SAMPLES
        .iter()
        .filter_map(|sample| {
            let (year, month, day) = sample.end_date;
            let mut proposal = Proposal {
                id: sample.id.to_string(),
                title: sample.title.to_string(),
                description: sample.description.to_string(),
                options: sample.options.iter().map(|o| o.to_string()).collect(),
                votes: sample.votes.to_vec(),
                total_votes: sample.votes.iter().sum(),
                end_date: NaiveDate::from_ymd_opt(year, month, day)?,
                status: ProposalStatus::Active,
                created_at: Utc::now(),
            };
            if sample.status == ProposalStatus::Ended {
                proposal.close();
            }
            Some(proposal)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_hold_invariants() {
        let proposals = sample_proposals();
        assert_eq!(proposals.len(), 3);

        for proposal in &proposals {
            assert_eq!(proposal.votes.len(), proposal.options.len());
            assert_eq!(proposal.total_votes, proposal.votes.iter().sum::<u64>());
        }
    }

    #[test]
    fn test_library_hours_is_ended() {
        let proposals = sample_proposals();
        let library = proposals.iter().find(|p| p.id == "3").unwrap();
        assert_eq!(library.status, ProposalStatus::Ended);
        assert_eq!(library.total_votes, 512);
    }
}
