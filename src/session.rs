//! Wallet session management
//!
//! Tracks connected wallets. A session is not a durable account: it lives
//! from connect to disconnect and is identified by a random token.

use crate::error::{not_found_error, validation_error, AppError};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Header carrying the session token
pub const SESSION_HEADER: &str = "x-session-id";

static WALLET_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("wallet address pattern is valid")
});

/// A connected wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub address: String,
    pub short_address: String,
    pub connected_at: DateTime<Utc>,
}

/// Request to connect a wallet
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    #[validate(custom(function = "validate_wallet_address"))]
    pub address: String,
}

/// Accept Ethereum-style addresses only
fn validate_wallet_address(address: &str) -> Result<(), validator::ValidationError> {
    if !WALLET_ADDRESS.is_match(address.trim()) {
        let mut err = validator::ValidationError::new("invalid_wallet_address");
        err.message = Some("Wallet address must be 0x followed by 40 hex characters".into());
        return Err(err);
    }
    Ok(())
}

/// `0x12ab...cdef` form of an address
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Read the session token from request headers
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

/// In-memory session store
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a new session for a wallet address
    pub async fn connect(&self, request: ConnectRequest) -> Result<Session, AppError> {
        request
            .validate()
            .map_err(|e| validation_error(e.to_string()))?;

        let address = request.address.trim().to_string();
        let session = Session {
            id: Uuid::new_v4(),
            short_address: shorten_address(&address),
            address,
            connected_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());

        info!("Wallet {} connected (session {})", session.short_address, session.id);
        Ok(session)
    }

    /// Find a connected session
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).cloned()
    }

    /// Resolve the session named by the request headers, if still connected
    pub async fn from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        match session_id_from_headers(headers) {
            Some(id) => self.get(id).await,
            None => None,
        }
    }

    /// Close a session
    pub async fn disconnect(&self, id: Uuid) -> Result<Session, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .remove(&id)
            .ok_or_else(|| not_found_error(format!("Session {} not found", id)))?;

        info!("Wallet {} disconnected (session {})", session.short_address, session.id);
        Ok(session)
    }

    /// Number of connected sessions
    pub async fn count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const ADDRESS: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";

    fn request(address: &str) -> ConnectRequest {
        ConnectRequest {
            address: address.to_string(),
        }
    }

    #[test]
    fn test_shorten_address() {
        assert_eq!(shorten_address(ADDRESS), "0x71C7...976F");
        assert_eq!(shorten_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_session_header_parsing() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(SESSION_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(SESSION_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let manager = SessionManager::new();
        let session = manager.connect(request(ADDRESS)).await.unwrap();

        assert_eq!(session.short_address, "0x71C7...976F");
        assert_eq!(manager.count().await, 1);
        assert!(manager.get(session.id).await.is_some());

        manager.disconnect(session.id).await.unwrap();
        assert!(manager.get(session.id).await.is_none());
        assert!(matches!(
            manager.disconnect(session.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reconnect_gets_fresh_session() {
        let manager = SessionManager::new();
        let first = manager.connect(request(ADDRESS)).await.unwrap();
        manager.disconnect(first.id).await.unwrap();
        let second = manager.connect(request(ADDRESS)).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let manager = SessionManager::new();
        for bad in ["", "0x123", "71C7656EC7ab88b098defB751B7401B5f6d8976F00"] {
            let err = manager.connect(request(bad)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(manager.count().await, 0);
    }
}
