//! Application state management
//!
//! Contains shared state accessible across all handlers.
//! IN-MEMORY ONLY: everything is lost when the process exits.

use crate::config::VotingConfig;
use crate::error::AppError;
use crate::proposal::{seed, ProposalStore};
use crate::session::{ConnectRequest, Session, SessionManager};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Application state shared across all handlers
pub struct AppState {
    /// Connected wallet sessions
    pub sessions: SessionManager,

    /// Proposals and voting records (has internal locking)
    pub proposals: ProposalStore,
}

impl AppState {
    pub fn new(config: &VotingConfig) -> Self {
        let proposals = if config.seed_mock_proposals {
            let samples = seed::sample_proposals();
            info!("Seeded {} sample proposals", samples.len());
            ProposalStore::with_proposals(config, samples)
        } else {
            ProposalStore::new(config)
        };

        Self {
            sessions: SessionManager::new(),
            proposals,
        }
    }

    /// Connect a wallet and open its (empty) voting record
    pub async fn connect_wallet(&self, request: ConnectRequest) -> Result<Session, AppError> {
        let session = self.sessions.connect(request).await?;
        self.proposals.open_session(session.id)?;
        Ok(session)
    }

    /// Disconnect a wallet and forget what it voted on.
    /// Returns the number of voting-record entries cleared.
    pub async fn disconnect_wallet(&self, session_id: Uuid) -> Result<usize, AppError> {
        self.sessions.disconnect(session_id).await?;
        self.proposals.clear_session(session_id)
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::NewProposal;
    use std::time::Duration;

    const ADDRESS: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";

    fn parking_policy() -> NewProposal {
        NewProposal {
            title: "Campus Parking Policy".to_string(),
            description: "How should parking change?".to_string(),
            options: vec!["More student spots".to_string(), "Keep as is".to_string()],
            end_date: "2030-01-01".to_string(),
        }
    }

    async fn connect(state: &AppState) -> Session {
        state
            .connect_wallet(ConnectRequest {
                address: ADDRESS.to_string(),
            })
            .await
            .unwrap()
    }

    fn config(seed: bool) -> VotingConfig {
        VotingConfig {
            vote_delay: Duration::ZERO,
            failure_rate: 0.0,
            network: "test-net".to_string(),
            seed_mock_proposals: seed,
        }
    }

    #[tokio::test]
    async fn test_seeding_follows_config() {
        assert_eq!(AppState::new(&config(true)).proposals.count().await, 3);
        assert_eq!(AppState::new(&config(false)).proposals.count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_clears_voting_record() {
        let state = AppState::new(&config(false));
        let session = connect(&state).await;
        let proposal = state.proposals.create(parking_policy()).await.unwrap();

        state.proposals.cast_vote(Some(session.id), &proposal.id, 0).await.unwrap();
        assert_eq!(state.disconnect_wallet(session.id).await.unwrap(), 1);
        assert!(state.proposals.voted_proposals(session.id).unwrap().is_empty());
        assert!(state.sessions.get(session.id).await.is_none());
    }

    #[tokio::test]
    async fn test_vote_after_disconnect_leaves_no_record() {
        let state = AppState::new(&config(false));
        let session = connect(&state).await;
        let proposal = state.proposals.create(parking_policy()).await.unwrap();

        // Handler resolved the session, then the wallet disconnected
        let resolved = state.sessions.get(session.id).await.map(|s| s.id);
        assert_eq!(resolved, Some(session.id));
        assert_eq!(state.disconnect_wallet(session.id).await.unwrap(), 0);

        let err = state
            .proposals
            .cast_vote(resolved, &proposal.id, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotConnected(_)));
        assert!(state.proposals.voted_proposals(session.id).unwrap().is_empty());
        assert_eq!(state.proposals.get(&proposal.id).await.unwrap().total_votes, 0);
    }
}
