//! Simulated vote ledger
//!
//! Stands in for the on-chain transaction that records a vote: waits for a
//! configurable confirmation delay and hands back a synthetic receipt.

use crate::config::VotingConfig;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// A vote about to be recorded
#[derive(Debug, Clone)]
pub struct Ballot {
    pub session_id: Uuid,
    pub proposal_id: String,
    pub option_index: usize,
}

/// Confirmation returned once a ballot is recorded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub signature: String,
    pub network: String,
    pub recorded_at: DateTime<Utc>,
}

pub struct SimulatedLedger {
    delay: Duration,
    failure_rate: f64,
    network: String,
}

impl SimulatedLedger {
    pub fn new(config: &VotingConfig) -> Self {
        Self {
            delay: config.vote_delay,
            failure_rate: config.failure_rate,
            network: config.network.clone(),
        }
    }

    /// Record a ballot. The returned future may be dropped at any point before
    /// it resolves; nothing is committed by the ledger itself.
    pub async fn submit(&self, ballot: &Ballot) -> Result<VoteReceipt, AppError> {
        debug!(
            "Submitting ballot for proposal {} to {} ({:?} confirmation)",
            ballot.proposal_id, self.network, self.delay
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failure_rate > 0.0 && rand::thread_rng().gen::<f64>() < self.failure_rate {
            return Err(AppError::VoteFailed(format!(
                "{} rejected the transaction for proposal {}",
                self.network, ballot.proposal_id
            )));
        }

        let recorded_at = Utc::now();
        Ok(VoteReceipt {
            signature: Self::sign(ballot, recorded_at),
            network: self.network.clone(),
            recorded_at,
        })
    }

    fn sign(ballot: &Ballot, recorded_at: DateTime<Utc>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(ballot.session_id.as_bytes());
        hasher.update(ballot.proposal_id.as_bytes());
        hasher.update(ballot.option_index.to_le_bytes());
        hasher.update(recorded_at.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
        format!("{:x}", hasher.finalize())
    }
}
