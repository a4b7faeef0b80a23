//! Wallet session route handlers

use crate::error::{ApiResult, AppError};
use crate::models::{DisconnectResponse, HistoryResponse, SessionResponse, SuccessResponse};
use crate::session::{session_id_from_headers, ConnectRequest, Session};
use crate::state::SharedState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

fn not_connected() -> AppError {
    AppError::NotConnected("Please connect your wallet first.".to_string())
}

async fn require_session(state: &SharedState, headers: &HeaderMap) -> ApiResult<Session> {
    state
        .sessions
        .from_headers(headers)
        .await
        .ok_or_else(not_connected)
}

/// Connect a wallet and open a session
pub async fn connect_wallet(
    State(state): State<SharedState>,
    Json(payload): Json<ConnectRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<SessionResponse>>)> {
    let session = state.connect_wallet(payload).await?;
    let message = format!("Connected to {}", session.short_address);

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            message,
            SessionResponse {
                session,
                voted_proposals: Vec::new(),
            },
        )),
    ))
}

/// Disconnect the wallet; its voting record is cleared
pub async fn disconnect_wallet(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<SuccessResponse<DisconnectResponse>>> {
    let session_id = session_id_from_headers(&headers).ok_or_else(not_connected)?;
    let cleared_votes = state.disconnect_wallet(session_id).await?;

    Ok(Json(SuccessResponse::with_data(
        "Your wallet has been disconnected.",
        DisconnectResponse {
            session_id: session_id.to_string(),
            cleared_votes,
        },
    )))
}

/// Current session and the proposals it voted on
pub async fn current_session(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<SuccessResponse<SessionResponse>>> {
    let session = require_session(&state, &headers).await?;
    let voted_proposals = state.proposals.voted_proposals(session.id)?;

    Ok(Json(SuccessResponse::with_data(
        "Session active",
        SessionResponse {
            session,
            voted_proposals,
        },
    )))
}

/// Votes cast by the current session
pub async fn voting_history(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<SuccessResponse<HistoryResponse>>> {
    let session = require_session(&state, &headers).await?;
    let votes = state.proposals.history(session.id).await?;

    Ok(Json(SuccessResponse::with_data(
        "Voting history",
        HistoryResponse::new(votes),
    )))
}
