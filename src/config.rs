//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(dead_code)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

/// Voting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Simulated ledger confirmation time for each vote
    pub vote_delay: Duration,
    /// Probability (0.0..=1.0) that the simulated ledger rejects a vote
    pub failure_rate: f64,
    /// Network name stamped on vote receipts
    pub network: String,
    /// Load the campus sample proposals at startup
    pub seed_mock_proposals: bool,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            vote_delay: Duration::from_millis(2000),
            failure_rate: 0.0,
            network: "solana-devnet".to_string(),
            seed_mock_proposals: true,
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub voting: VotingConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (the process environment in production)
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: lookup("HOST")
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let cors = CorsConfig {
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        let defaults = VotingConfig::default();

        let vote_delay = match lookup("VOTE_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!("VOTE_DELAY_MS must be a whole number, got '{}'", raw))
            })?),
            None => defaults.vote_delay,
        };

        let failure_rate = match lookup("VOTE_FAILURE_RATE") {
            Some(raw) => Self::parse_failure_rate(&raw)?,
            None => defaults.failure_rate,
        };

        let seed_mock_proposals = match lookup("SEED_MOCK_PROPOSALS") {
            Some(raw) => Self::parse_bool("SEED_MOCK_PROPOSALS", &raw)?,
            None => defaults.seed_mock_proposals,
        };

        let voting = VotingConfig {
            vote_delay,
            failure_rate,
            network: lookup("LEDGER_NETWORK").unwrap_or(defaults.network),
            seed_mock_proposals,
        };

        Ok(Self { server, cors, voting })
    }

    fn parse_failure_rate(raw: &str) -> Result<f64, ConfigError> {
        let rate: f64 = raw.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(format!("VOTE_FAILURE_RATE must be a number, got '{}'", raw))
        })?;

        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidValue(format!(
                "VOTE_FAILURE_RATE must be between 0 and 1, got {}",
                rate
            )));
        }

        Ok(rate)
    }

    fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
        match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidValue(format!(
                "{} must be a boolean, got '{}'",
                key, other
            ))),
        }
    }
}
