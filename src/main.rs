use anyhow::{Context, Result};
use industry_voting_engine::consensus::{StrategyVote, VotingContext, VotingEngine};
use industry_voting_engine::core::{logging, AppConfig};
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize logging
    logging::init_logging(&config.monitoring.log_level)?;

    tracing::info!("Industry voting engine v{}", env!("CARGO_PKG_VERSION"));

    let input = read_input(std::env::args().nth(1)).await?;
    let ballots: Vec<Option<StrategyVote>> =
        serde_json::from_str(&input).context("ballot input is not a JSON array of votes")?;

    tracing::info!("📥 Loaded {} ballots", ballots.len());

    let engine = VotingEngine::new(config.voting);
    let result = engine.conduct_ballots(&VotingContext::new(), &ballots)?;

    if let Some(top) = result.top_code() {
        tracing::info!(
            "🏆 Top code: {} ({}) score {:.3}",
            top.code.code,
            top.code.code_type,
            top.score
        );
    } else {
        tracing::warn!("No code reached the final ranking");
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Reads the ballot batch from `path`, or from stdin when no path is given.
async fn read_input(path: Option<String>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read ballots from {}", path)),
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("failed to read ballots from stdin")?;
            Ok(input)
        }
    }
}
