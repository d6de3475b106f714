use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::consensus::{VotingConfig, VotingStrategy};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub voting: VotingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub log_level: String,
}

impl AppConfig {
    /// Reads `.env` (if present) and the `VOTING_*` variables. Absent or
    /// unparsable numbers fall back to the engine defaults; an unknown
    /// strategy name is an error.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = VotingConfig::default();

        let strategy = match env::var("VOTING_STRATEGY") {
            Ok(name) => VotingStrategy::from_str(&name)
                .context("VOTING_STRATEGY is not a supported voting strategy")?,
            Err(_) => defaults.strategy,
        };

        let voting = VotingConfig {
            strategy,
            min_voters: env_or("VOTING_MIN_VOTERS", defaults.min_voters),
            required_agreement: env_or("VOTING_REQUIRED_AGREEMENT", defaults.required_agreement),
            confidence_weight: env_or("VOTING_CONFIDENCE_WEIGHT", defaults.confidence_weight),
            consistency_weight: env_or("VOTING_CONSISTENCY_WEIGHT", defaults.consistency_weight),
            diversity_weight: env_or("VOTING_DIVERSITY_WEIGHT", defaults.diversity_weight),
            enable_tie_breaking: env_or("VOTING_ENABLE_TIE_BREAKING", defaults.enable_tie_breaking),
            enable_outlier_filtering: env_or(
                "VOTING_ENABLE_OUTLIER_FILTERING",
                defaults.enable_outlier_filtering,
            ),
            outlier_threshold: env_or("VOTING_OUTLIER_THRESHOLD", defaults.outlier_threshold),
        };

        voting
            .validate()
            .context("voting configuration from environment is invalid")?;

        Ok(AppConfig {
            voting,
            monitoring: MonitoringConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
