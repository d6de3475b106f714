use thiserror::Error;

/// Request-level failures raised before any aggregation runs.
///
/// None of these are retried internally: resubmitting the same malformed
/// batch cannot succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VotingError {
    #[error("insufficient votes: need at least {required}, got {actual}")]
    InsufficientVotes { required: usize, actual: usize },

    #[error("vote at index {index} is missing")]
    NilVote { index: usize },

    #[error("vote at index {index} has no strategy name")]
    MissingStrategyName { index: usize },

    #[error("vote from strategy '{strategy}' has no results")]
    EmptyResults { strategy: String },

    #[error("vote from strategy '{strategy}' has invalid {field}: {value} (must be within [0, 1])")]
    InvalidWeight {
        strategy: String,
        field: &'static str,
        value: f64,
    },

    #[error("strategy '{strategy}' voted more than once in the same batch")]
    DuplicateStrategy { strategy: String },

    #[error("unknown voting strategy: '{name}'")]
    UnknownStrategy { name: String },

    #[error("unknown industry code type: '{name}'")]
    UnknownCodeType { name: String },

    #[error("invalid voting configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl VotingError {
    /// Short machine-readable tag, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            VotingError::InsufficientVotes { .. } => "insufficient_votes",
            VotingError::NilVote { .. } => "nil_vote",
            VotingError::MissingStrategyName { .. } => "missing_strategy_name",
            VotingError::EmptyResults { .. } => "empty_results",
            VotingError::InvalidWeight { .. } => "invalid_weight",
            VotingError::DuplicateStrategy { .. } => "duplicate_strategy",
            VotingError::UnknownStrategy { .. } => "unknown_strategy",
            VotingError::UnknownCodeType { .. } => "unknown_code_type",
            VotingError::InvalidConfig { .. } => "invalid_config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = VotingError::InsufficientVotes { required: 3, actual: 1 };
        assert_eq!(err.to_string(), "insufficient votes: need at least 3, got 1");
        assert_eq!(err.kind(), "insufficient_votes");

        let err = VotingError::InvalidWeight {
            strategy: "keyword".to_string(),
            field: "weight",
            value: 1.5,
        };
        assert!(err.to_string().contains("invalid weight: 1.5"));
    }
}
