pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod outlier;
pub mod quality;
pub mod stats;
pub mod strategies;
pub mod validator;

pub use aggregator::{CodeMention, CodeVoteAggregation};
pub use config::{VotingConfig, VotingStrategy};
pub use engine::{VotingContext, VotingEngine};
pub use error::VotingError;
pub use quality::QualityScores;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Industry classification schemes the engine recognises.
///
/// Declaration order is the tie-break order for codes sharing a code string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CodeType {
    Sic,
    Naics,
    Mcc,
}

impl CodeType {
    pub const ALL: [CodeType; 3] = [CodeType::Sic, CodeType::Naics, CodeType::Mcc];
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeType::Sic => write!(f, "SIC"),
            CodeType::Naics => write!(f, "NAICS"),
            CodeType::Mcc => write!(f, "MCC"),
        }
    }
}

impl FromStr for CodeType {
    type Err = VotingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SIC" => Ok(CodeType::Sic),
            "NAICS" => Ok(CodeType::Naics),
            "MCC" => Ok(CodeType::Mcc),
            _ => Err(VotingError::UnknownCodeType {
                name: s.to_string(),
            }),
        }
    }
}

/// Identity of an industry code: the code string within its scheme.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CodeKey {
    pub code: String,
    pub code_type: CodeType,
}

impl fmt::Display for CodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.code, self.code_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryCode {
    pub code: String,
    pub code_type: CodeType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    /// Static baseline confidence carried by the code table.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl IndustryCode {
    pub fn new(code: impl Into<String>, code_type: CodeType, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            code_type,
            description: description.into(),
            category: String::new(),
            subcategory: String::new(),
            keywords: BTreeSet::new(),
            confidence: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> CodeKey {
        CodeKey {
            code: self.code.clone(),
            code_type: self.code_type,
        }
    }
}

/// One strategy's claim about one code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub code: IndustryCode,
    pub confidence: f64,
    #[serde(default)]
    pub match_type: String,
    #[serde(default)]
    pub matched_on: Vec<String>,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default = "default_result_weight")]
    pub weight: f64,
}

fn default_result_weight() -> f64 {
    1.0
}

impl ClassificationResult {
    pub fn new(code: IndustryCode, confidence: f64) -> Self {
        Self {
            code,
            confidence,
            match_type: String::new(),
            matched_on: Vec::new(),
            reasons: Vec::new(),
            weight: default_result_weight(),
        }
    }

    pub fn with_match(mut self, match_type: impl Into<String>, matched_on: Vec<String>) -> Self {
        self.match_type = match_type.into();
        self.matched_on = matched_on;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }
}

/// A full ballot: one strategy's ranked candidates, index 0 being its top choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyVote {
    pub strategy_name: String,
    pub results: Vec<ClassificationResult>,
    pub weight: f64,
    pub confidence: f64,
    #[serde(default = "Utc::now")]
    pub vote_time: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StrategyVote {
    pub fn new(
        strategy_name: impl Into<String>,
        weight: f64,
        confidence: f64,
        results: Vec<ClassificationResult>,
    ) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            results,
            weight,
            confidence,
            vote_time: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// One entry of the final ranking, derived from a code's aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCode {
    /// 1-based position in the final ranking.
    pub rank: usize,
    pub code: IndustryCode,
    /// Strategy-specific score; higher is always better.
    pub score: f64,
    pub total_votes: usize,
    pub voter_count: usize,
    pub average_confidence: f64,
    pub confidence_variance: f64,
    pub agreement_score: f64,
    pub voters: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingMetadata {
    pub request_id: Uuid,
    pub processing_time: Duration,
    pub conducted_at: DateTime<Utc>,
    pub total_votes: usize,
    pub valid_votes: usize,
    pub outliers_removed: usize,
    pub filtered_strategies: Vec<String>,
    pub distinct_codes: usize,
    pub tie_breaks_applied: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingResult {
    pub final_results: Vec<RankedCode>,
    pub voting_strategy: VotingStrategy,
    pub voting_score: f64,
    pub agreement: f64,
    pub consistency: f64,
    pub diversity: f64,
    pub metadata: VotingMetadata,
}

impl VotingResult {
    pub fn top_code(&self) -> Option<&RankedCode> {
        self.final_results.first()
    }

    pub fn is_empty(&self) -> bool {
        self.final_results.is_empty()
    }
}
