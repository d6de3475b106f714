use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::aggregator::AggregationMap;
use super::stats::calculate_mean;
use super::{CodeType, RankedCode, VotingConfig};

/// Largest possible population variance of samples drawn from [0, 1].
const MAX_UNIT_VARIANCE: f64 = 0.25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub agreement: f64,
    pub consistency: f64,
    pub diversity: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct QualityScorer {
    confidence_weight: f64,
    consistency_weight: f64,
    diversity_weight: f64,
}

impl QualityScorer {
    pub fn new(config: &VotingConfig) -> Self {
        Self {
            confidence_weight: config.confidence_weight,
            consistency_weight: config.consistency_weight,
            diversity_weight: config.diversity_weight,
        }
    }

    /// Agreement and consistency look at every aggregated code; diversity only
    /// at the codes that made the final ranking.
    pub fn score(&self, aggregations: &AggregationMap<'_>, final_results: &[RankedCode]) -> QualityScores {
        if aggregations.is_empty() {
            return QualityScores::default();
        }

        let agreement = calculate_agreement(aggregations);
        let consistency = calculate_consistency(aggregations);
        let diversity = calculate_diversity(final_results.iter().map(|r| r.code.code_type));

        QualityScores {
            agreement,
            consistency,
            diversity,
            overall: self.get_overall_score(agreement, consistency, diversity),
        }
    }

    pub fn get_overall_score(&self, agreement: f64, consistency: f64, diversity: f64) -> f64 {
        let weighted = self.confidence_weight * clamp_unit(agreement)
            + self.consistency_weight * clamp_unit(consistency)
            + self.diversity_weight * clamp_unit(diversity);

        clamp_unit(weighted)
    }
}

/// Mean of the per-code agreement scores.
pub fn calculate_agreement(aggregations: &AggregationMap<'_>) -> f64 {
    let scores: Vec<f64> = aggregations.values().map(|a| a.agreement_score).collect();
    clamp_unit(calculate_mean(&scores))
}

/// `1 − mean variance / 0.25`: identical confidences everywhere score 1.
pub fn calculate_consistency(aggregations: &AggregationMap<'_>) -> f64 {
    if aggregations.is_empty() {
        return 0.0;
    }

    let variances: Vec<f64> = aggregations.values().map(|a| a.confidence_variance).collect();
    clamp_unit(1.0 - calculate_mean(&variances) / MAX_UNIT_VARIANCE)
}

/// Share of the recognised code schemes present among `code_types`.
pub fn calculate_diversity<I>(code_types: I) -> f64
where
    I: IntoIterator<Item = CodeType>,
{
    let present: BTreeSet<CodeType> = code_types.into_iter().collect();
    present.len() as f64 / CodeType::ALL.len() as f64
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
