use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::VotingError;

const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingStrategy {
    WeightedAverage,
    Majority,
    BordaCount,
    Consensus,
    RankAggregation,
}

impl VotingStrategy {
    pub const ALL: [VotingStrategy; 5] = [
        VotingStrategy::WeightedAverage,
        VotingStrategy::Majority,
        VotingStrategy::BordaCount,
        VotingStrategy::Consensus,
        VotingStrategy::RankAggregation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VotingStrategy::WeightedAverage => "weighted_average",
            VotingStrategy::Majority => "majority",
            VotingStrategy::BordaCount => "borda_count",
            VotingStrategy::Consensus => "consensus",
            VotingStrategy::RankAggregation => "rank_aggregation",
        }
    }
}

impl fmt::Display for VotingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VotingStrategy {
    type Err = VotingError;

    /// Accepts `weighted_average`, `weighted-average` and `WeightedAverage` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "weightedaverage" => Ok(VotingStrategy::WeightedAverage),
            "majority" => Ok(VotingStrategy::Majority),
            "bordacount" | "borda" => Ok(VotingStrategy::BordaCount),
            "consensus" => Ok(VotingStrategy::Consensus),
            "rankaggregation" => Ok(VotingStrategy::RankAggregation),
            _ => Err(VotingError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    pub strategy: VotingStrategy,
    pub min_voters: usize,
    pub required_agreement: f64,
    pub confidence_weight: f64,  // weight of the agreement axis
    pub consistency_weight: f64,
    pub diversity_weight: f64,
    pub enable_tie_breaking: bool,
    pub enable_outlier_filtering: bool,
    pub outlier_threshold: f64, // z-score; lower filters harder
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            strategy: VotingStrategy::WeightedAverage,
            min_voters: 1,
            required_agreement: 0.5,
            confidence_weight: 0.4,
            consistency_weight: 0.4,
            diversity_weight: 0.2,
            enable_tie_breaking: true,
            enable_outlier_filtering: true,
            outlier_threshold: 2.0,
        }
    }
}

impl VotingConfig {
    pub fn with_strategy(mut self, strategy: VotingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<(), VotingError> {
        if !(0.0..=1.0).contains(&self.required_agreement) {
            return Err(VotingError::InvalidConfig {
                reason: format!(
                    "required_agreement {} outside [0, 1]",
                    self.required_agreement
                ),
            });
        }

        let weights = [
            ("confidence_weight", self.confidence_weight),
            ("consistency_weight", self.consistency_weight),
            ("diversity_weight", self.diversity_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(VotingError::InvalidConfig {
                    reason: format!("{} must be a non-negative number, got {}", name, value),
                });
            }
        }

        let sum = self.confidence_weight + self.consistency_weight + self.diversity_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(VotingError::InvalidConfig {
                reason: format!("quality weights sum to {:.3}, expected 1.0", sum),
            });
        }

        if !self.outlier_threshold.is_finite() || self.outlier_threshold <= 0.0 {
            return Err(VotingError::InvalidConfig {
                reason: format!(
                    "outlier_threshold must be positive, got {}",
                    self.outlier_threshold
                ),
            });
        }

        Ok(())
    }
}
