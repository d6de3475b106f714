use std::collections::HashSet;

use super::{StrategyVote, VotingError};

/// Structural checks on a ballot batch. Pure; every check always runs.
#[derive(Debug, Clone)]
pub struct VoteValidator {
    min_voters: usize,
}

impl VoteValidator {
    pub fn new(min_voters: usize) -> Self {
        Self { min_voters }
    }

    /// Returns the batch with missing entries resolved to references, or the
    /// first failure in ballot order.
    pub fn validate_votes<'a>(
        &self,
        ballots: &[Option<&'a StrategyVote>],
    ) -> Result<Vec<&'a StrategyVote>, VotingError> {
        if ballots.len() < self.min_voters {
            return Err(VotingError::InsufficientVotes {
                required: self.min_voters,
                actual: ballots.len(),
            });
        }

        let mut seen = HashSet::with_capacity(ballots.len());
        let mut votes = Vec::with_capacity(ballots.len());

        for (index, ballot) in ballots.iter().copied().enumerate() {
            let vote = ballot.ok_or(VotingError::NilVote { index })?;
            self.validate_vote(index, vote)?;

            if !seen.insert(vote.strategy_name.as_str()) {
                return Err(VotingError::DuplicateStrategy {
                    strategy: vote.strategy_name.clone(),
                });
            }

            votes.push(vote);
        }

        Ok(votes)
    }

    fn validate_vote(&self, index: usize, vote: &StrategyVote) -> Result<(), VotingError> {
        if vote.strategy_name.trim().is_empty() {
            return Err(VotingError::MissingStrategyName { index });
        }

        if vote.results.is_empty() {
            return Err(VotingError::EmptyResults {
                strategy: vote.strategy_name.clone(),
            });
        }

        check_unit_interval(&vote.strategy_name, "weight", vote.weight)?;
        check_unit_interval(&vote.strategy_name, "confidence", vote.confidence)?;

        for result in &vote.results {
            check_unit_interval(&vote.strategy_name, "result confidence", result.confidence)?;
        }

        Ok(())
    }
}

fn check_unit_interval(strategy: &str, field: &'static str, value: f64) -> Result<(), VotingError> {
    // NaN fails the range check as well
    if !(0.0..=1.0).contains(&value) {
        return Err(VotingError::InvalidWeight {
            strategy: strategy.to_string(),
            field,
            value,
        });
    }
    Ok(())
}
