//! Proposal and voting route handlers

use crate::error::{validation_error, ApiResult};
use crate::models::{
    CreateProposalRequest, ProposalListQuery, ProposalListResponse, ProposalResponse,
    ProposalView, ResultsResponse, StatsResponse, SuccessResponse, VoteRequest, VoteResponse,
};
use crate::proposal::ProposalStatus;
use crate::session::Session;
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::collections::HashSet;
use tracing::{debug, info};
use validator::Validate;

/// Proposal IDs the caller has voted on (empty when not connected)
fn voted_set(state: &SharedState, session: Option<&Session>) -> ApiResult<HashSet<String>> {
    match session {
        Some(session) => Ok(state
            .proposals
            .voted_proposals(session.id)?
            .into_iter()
            .collect()),
        None => Ok(HashSet::new()),
    }
}

/// List proposals, most recent first
pub async fn list_proposals(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<ProposalListQuery>,
) -> ApiResult<Json<SuccessResponse<ProposalListResponse>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ProposalStatus>)
        .transpose()?;

    let session = state.sessions.from_headers(&headers).await;
    let voted = voted_set(&state, session.as_ref())?;
    let connected = session.is_some();

    let proposals: Vec<ProposalView> = state
        .proposals
        .list(status)
        .await
        .into_iter()
        .map(|p| {
            let has_voted = voted.contains(&p.id);
            ProposalView::new(p, has_voted, connected)
        })
        .collect();
    let active_count = proposals
        .iter()
        .filter(|p| p.status == ProposalStatus::Active)
        .count();

    Ok(Json(SuccessResponse::with_data(
        format!("{} proposals", proposals.len()),
        ProposalListResponse {
            proposals,
            active_count,
        },
    )))
}

/// Create a new proposal
pub async fn create_proposal(
    State(state): State<SharedState>,
    Json(payload): Json<CreateProposalRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<ProposalResponse>>)> {
    // Validate input
    payload
        .validate()
        .map_err(|e| validation_error(e.to_string()))?;

    debug!("Creating proposal '{}'", payload.title);
    let proposal = state.proposals.create(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            "Your proposal has been created successfully.",
            ProposalResponse {
                proposal: ProposalView::new(proposal, false, false),
            },
        )),
    ))
}

/// Get a single proposal with its tallies
pub async fn get_proposal(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    let proposal = state.proposals.get(&id).await?;
    let session = state.sessions.from_headers(&headers).await;
    let has_voted = match &session {
        Some(session) => state.proposals.has_voted(session.id, &id)?,
        None => false,
    };

    Ok(Json(SuccessResponse::with_data(
        "Proposal retrieved",
        ProposalResponse {
            proposal: ProposalView::new(proposal, has_voted, session.is_some()),
        },
    )))
}

/// Cast a vote for the connected session
pub async fn cast_vote(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> ApiResult<Json<SuccessResponse<VoteResponse>>> {
    let session = state.sessions.from_headers(&headers).await;
    let session_id = session.as_ref().map(|s| s.id);

    let outcome = state
        .proposals
        .cast_vote(session_id, &id, payload.option_index)
        .await?;

    if let Some(session) = &session {
        info!("{} voted on proposal {}", session.short_address, id);
    }

    Ok(Json(SuccessResponse::with_data(
        format!("Your vote has been recorded on {}.", outcome.receipt.network),
        VoteResponse {
            proposal: ProposalView::new(outcome.proposal, true, true),
            receipt: outcome.receipt,
        },
    )))
}

/// Winner/tie for a proposal
pub async fn proposal_results(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse<ResultsResponse>>> {
    let proposal = state.proposals.get(&id).await?;
    let results = ResultsResponse::new(&proposal);

    Ok(Json(SuccessResponse::with_data(results.summary.clone(), results)))
}

/// Platform-wide counts
pub async fn platform_stats(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<StatsResponse>>> {
    let stats = StatsResponse {
        proposals: state.proposals.stats().await,
        connected_sessions: state.sessions.count().await,
    };

    Ok(Json(SuccessResponse::with_data("Platform statistics", stats)))
}
