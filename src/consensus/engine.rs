use chrono::Utc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::aggregator::aggregate_votes_by_code;
use super::outlier::OutlierFilter;
use super::quality::QualityScorer;
use super::strategies;
use super::validator::VoteValidator;
use super::{StrategyVote, VotingConfig, VotingError, VotingMetadata, VotingResult};

/// Per-call context: a request id for log correlation and an optional
/// deadline. The computation is bounded, so an exceeded deadline is only
/// reported, never enforced.
#[derive(Debug, Clone)]
pub struct VotingContext {
    pub request_id: Uuid,
    pub deadline: Option<Instant>,
}

impl VotingContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            deadline: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}

impl Default for VotingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Fuses strategy ballots into one ranked, quality-scored result.
///
/// Holds nothing but its configuration, so a single instance can be shared
/// across threads and tasks.
#[derive(Debug, Clone)]
pub struct VotingEngine {
    config: VotingConfig,
}

impl VotingEngine {
    pub fn new(config: VotingConfig) -> Self {
        tracing::info!("🗳️ Voting engine configured");
        tracing::info!("   • Strategy: {}", config.strategy);
        tracing::info!(
            "   • Min voters: {}, required agreement: {:.0}%",
            config.min_voters,
            config.required_agreement * 100.0
        );
        tracing::info!(
            "   • Quality weights: agreement {:.2} / consistency {:.2} / diversity {:.2}",
            config.confidence_weight,
            config.consistency_weight,
            config.diversity_weight
        );
        tracing::info!(
            "   • Outlier filtering: {} (threshold {:.2}), tie-breaking: {}",
            config.enable_outlier_filtering,
            config.outlier_threshold,
            config.enable_tie_breaking
        );

        if let Err(e) = config.validate() {
            tracing::warn!("Voting config accepted with warning: {}", e);
        }

        Self { config }
    }

    pub fn config(&self) -> &VotingConfig {
        &self.config
    }

    pub fn conduct_voting(
        &self,
        ctx: &VotingContext,
        votes: &[StrategyVote],
    ) -> Result<VotingResult, VotingError> {
        let ballots: Vec<Option<&StrategyVote>> = votes.iter().map(Some).collect();
        self.conduct(ctx, &ballots)
    }

    /// Same as [`conduct_voting`](Self::conduct_voting) for batches that may
    /// contain missing ballots, e.g. a JSON array with `null` entries.
    pub fn conduct_ballots(
        &self,
        ctx: &VotingContext,
        ballots: &[Option<StrategyVote>],
    ) -> Result<VotingResult, VotingError> {
        let ballots: Vec<Option<&StrategyVote>> = ballots.iter().map(Option::as_ref).collect();
        self.conduct(ctx, &ballots)
    }

    fn conduct(
        &self,
        ctx: &VotingContext,
        ballots: &[Option<&StrategyVote>],
    ) -> Result<VotingResult, VotingError> {
        let span = tracing::info_span!(
            "conduct_voting",
            request_id = %ctx.request_id,
            strategy = %self.config.strategy
        );
        let _enter = span.enter();
        let start = Instant::now();

        let votes = VoteValidator::new(self.config.min_voters)
            .validate_votes(ballots)
            .map_err(|e| {
                tracing::warn!("❌ Vote batch rejected: {}", e);
                e
            })?;

        let outcome = OutlierFilter::new(
            self.config.enable_outlier_filtering,
            self.config.outlier_threshold,
        )
        .filter_outliers(&votes);

        let aggregations = aggregate_votes_by_code(&outcome.kept);
        let resolution = strategies::resolve(&self.config, &aggregations, &outcome.kept);
        let quality = QualityScorer::new(&self.config).score(&aggregations, &resolution.ranked);

        if ctx.is_expired() {
            tracing::warn!(
                "⏱️ Voting round finished past its deadline ({:?} elapsed)",
                start.elapsed()
            );
        }

        let processing_time = start.elapsed();

        tracing::info!(
            "✅ Voting complete: {} codes from {}/{} votes, score {:.3} (agreement {:.3}, consistency {:.3}, diversity {:.3}) in {:?}",
            resolution.ranked.len(),
            outcome.kept.len(),
            ballots.len(),
            quality.overall,
            quality.agreement,
            quality.consistency,
            quality.diversity,
            processing_time
        );

        Ok(VotingResult {
            final_results: resolution.ranked,
            voting_strategy: self.config.strategy,
            voting_score: quality.overall,
            agreement: quality.agreement,
            consistency: quality.consistency,
            diversity: quality.diversity,
            metadata: VotingMetadata {
                request_id: ctx.request_id,
                processing_time,
                conducted_at: Utc::now(),
                total_votes: ballots.len(),
                valid_votes: outcome.kept.len(),
                outliers_removed: outcome.removed.len(),
                filtered_strategies: outcome
                    .removed
                    .iter()
                    .map(|v| v.strategy_name.clone())
                    .collect(),
                distinct_codes: aggregations.len(),
                tie_breaks_applied: resolution.tie_breaks_applied,
            },
        })
    }
}
