use super::stats::{calculate_mean, calculate_variance};
use super::StrategyVote;

/// Fewer ballots than this cannot be told apart statistically.
const MIN_VOTES_FOR_FILTERING: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct OutlierFilter {
    enabled: bool,
    threshold: f64,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome<'a> {
    pub kept: Vec<&'a StrategyVote>,
    pub removed: Vec<&'a StrategyVote>,
}

impl OutlierFilter {
    pub fn new(enabled: bool, threshold: f64) -> Self {
        Self { enabled, threshold }
    }

    /// Drops ballots whose own confidence sits more than `threshold` standard
    /// deviations from the batch mean. Order of the kept ballots is preserved.
    pub fn filter_outliers<'a>(&self, votes: &[&'a StrategyVote]) -> FilterOutcome<'a> {
        if !self.enabled || votes.len() < MIN_VOTES_FOR_FILTERING {
            return FilterOutcome {
                kept: votes.to_vec(),
                removed: Vec::new(),
            };
        }

        let confidences: Vec<f64> = votes.iter().map(|v| v.confidence).collect();
        let mean = calculate_mean(&confidences);
        let std_dev = calculate_variance(&confidences, mean).sqrt();

        if std_dev == 0.0 {
            return FilterOutcome {
                kept: votes.to_vec(),
                removed: Vec::new(),
            };
        }

        let (kept, removed): (Vec<&StrategyVote>, Vec<&StrategyVote>) = votes
            .iter()
            .copied()
            .partition(|v| (v.confidence - mean).abs() / std_dev <= self.threshold);

        for vote in &removed {
            tracing::warn!(
                "🚫 Outlier vote dropped: {} (confidence {:.3}, batch mean {:.3}, std {:.3})",
                vote.strategy_name,
                vote.confidence,
                mean,
                std_dev
            );
        }

        FilterOutcome { kept, removed }
    }
}
