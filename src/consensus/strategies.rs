//! The five ballot-resolution algorithms.
//!
//! Each resolver maps the per-code aggregations (plus the post-filter batch)
//! to a score per qualifying code. Ranking is shared: score descending, an
//! optional strategy-specific secondary key, then the tie-break chain.

use std::cmp::Ordering;

use super::aggregator::{AggregationMap, CodeVoteAggregation};
use super::{CodeKey, RankedCode, StrategyVote, VotingConfig, VotingStrategy};

/// Absorbs float noise in threshold products such as `0.7 * 10.0`.
const THRESHOLD_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub ranked: Vec<RankedCode>,
    /// Adjacent pairs whose strategy keys were equal and needed the tie-break chain.
    pub tie_breaks_applied: usize,
}

struct Candidate<'m, 'a> {
    key: &'m CodeKey,
    agg: &'m CodeVoteAggregation<'a>,
    score: f64,
    secondary: f64,
}

impl<'m, 'a> Candidate<'m, 'a> {
    fn new(key: &'m CodeKey, agg: &'m CodeVoteAggregation<'a>, score: f64) -> Self {
        Self {
            key,
            agg,
            score,
            secondary: 0.0,
        }
    }

    fn same_strategy_key(&self, other: &Self) -> bool {
        self.score == other.score && self.secondary == other.secondary
    }
}

pub fn resolve(
    config: &VotingConfig,
    aggregations: &AggregationMap<'_>,
    votes: &[&StrategyVote],
) -> Resolution {
    let candidates = match config.strategy {
        VotingStrategy::WeightedAverage => weighted_average(aggregations),
        VotingStrategy::Majority => majority(aggregations, votes.len(), config.required_agreement),
        VotingStrategy::BordaCount => borda_count(aggregations),
        VotingStrategy::Consensus => consensus(aggregations, votes, config.required_agreement),
        VotingStrategy::RankAggregation => rank_aggregation(aggregations),
    };

    tracing::debug!(
        "Strategy {} qualified {}/{} codes",
        config.strategy,
        candidates.len(),
        aggregations.len()
    );

    rank_candidates(candidates, config.enable_tie_breaking)
}

/// Σ `vote.weight × result.confidence`; every proposed code qualifies.
fn weighted_average<'m, 'a>(aggregations: &'m AggregationMap<'a>) -> Vec<Candidate<'m, 'a>> {
    aggregations
        .iter()
        .map(|(key, agg)| {
            let score = agg
                .mentions
                .iter()
                .map(|m| m.vote.weight * m.result.confidence)
                .sum();
            Candidate::new(key, agg, score)
        })
        .collect()
}

/// Codes named by at least `floor(required_agreement × voters)` distinct
/// voters (never fewer than one). Score is the share of voters.
///
/// The threshold truncates rather than rounds up, so 0.5 over three voters
/// needs a single voter and keeps every proposed code.
fn majority<'m, 'a>(
    aggregations: &'m AggregationMap<'a>,
    vote_count: usize,
    required_agreement: f64,
) -> Vec<Candidate<'m, 'a>> {
    if vote_count == 0 {
        return Vec::new();
    }

    let needed = ((required_agreement * vote_count as f64) + THRESHOLD_EPSILON)
        .floor()
        .max(1.0) as usize;

    aggregations
        .iter()
        .filter_map(|(key, agg)| {
            let voters = agg.voter_count();
            (voters >= needed).then(|| Candidate::new(key, agg, voters as f64 / vote_count as f64))
        })
        .collect()
}

/// Rank `i` in a ballot of `n` candidates earns `(n − i) × vote.weight`.
fn borda_count<'m, 'a>(aggregations: &'m AggregationMap<'a>) -> Vec<Candidate<'m, 'a>> {
    aggregations
        .iter()
        .map(|(key, agg)| {
            let points = agg
                .mentions
                .iter()
                .map(|m| (m.vote.results.len() - m.rank) as f64 * m.vote.weight)
                .sum();
            Candidate::new(key, agg, points)
        })
        .collect()
}

/// Confidence-weighted share of voters naming the code must reach
/// `required_agreement`.
///
/// When every voter reports zero confidence the share falls back to a plain
/// head count so the strategy stays defined.
fn consensus<'m, 'a>(
    aggregations: &'m AggregationMap<'a>,
    votes: &[&StrategyVote],
    required_agreement: f64,
) -> Vec<Candidate<'m, 'a>> {
    if votes.is_empty() {
        return Vec::new();
    }

    let total_confidence: f64 = votes.iter().map(|v| v.confidence).sum();

    aggregations
        .iter()
        .filter_map(|(key, agg)| {
            let supporters = agg.distinct_mentions();
            let support = if total_confidence > 0.0 {
                supporters.iter().map(|m| m.vote.confidence).sum::<f64>() / total_confidence
            } else {
                supporters.len() as f64 / votes.len() as f64
            };

            (support + THRESHOLD_EPSILON >= required_agreement)
                .then(|| Candidate::new(key, agg, support))
        })
        .collect()
}

/// Average 0-based rank over the voters that named the code; silent voters
/// do not count against it. Reported score is `1 / (1 + average_rank)`.
fn rank_aggregation<'m, 'a>(aggregations: &'m AggregationMap<'a>) -> Vec<Candidate<'m, 'a>> {
    aggregations
        .iter()
        .map(|(key, agg)| {
            let ranks: Vec<f64> = agg
                .distinct_mentions()
                .iter()
                .map(|m| m.rank as f64)
                .collect();
            let average_rank = ranks.iter().sum::<f64>() / ranks.len().max(1) as f64;

            Candidate {
                secondary: agg.total_votes as f64,
                ..Candidate::new(key, agg, 1.0 / (1.0 + average_rank))
            }
        })
        .collect()
}

/// Orders candidates by score, then secondary key, then (when enabled) higher
/// average confidence, then code string and code type.
///
/// With tie-breaking disabled the confidence step is skipped but the
/// code/type fallback still applies, so output order never depends on map
/// iteration.
fn rank_candidates(mut candidates: Vec<Candidate<'_, '_>>, tie_breaking: bool) -> Resolution {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.secondary.total_cmp(&a.secondary))
            .then_with(|| {
                if tie_breaking {
                    b.agg.average_confidence.total_cmp(&a.agg.average_confidence)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| a.key.cmp(b.key))
    });

    let tie_breaks_applied = candidates
        .windows(2)
        .filter(|pair| pair[0].same_strategy_key(&pair[1]))
        .count();

    let ranked = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let agg = candidate.agg;
            RankedCode {
                rank: index + 1,
                code: agg.code.clone(),
                score: candidate.score,
                total_votes: agg.total_votes,
                voter_count: agg.voter_count(),
                average_confidence: agg.average_confidence,
                confidence_variance: agg.confidence_variance,
                agreement_score: agg.agreement_score,
                voters: agg.voters().into_iter().map(str::to_string).collect(),
            }
        })
        .collect();

    Resolution {
        ranked,
        tie_breaks_applied,
    }
}
