use rayon::prelude::*;
use std::collections::BTreeMap;

use super::stats::{calculate_mean, calculate_variance, coefficient_of_variation};
use super::{ClassificationResult, CodeKey, IndustryCode, StrategyVote};

/// Above this many distinct codes the per-code statistics run on the rayon pool.
const PARALLEL_STATS_THRESHOLD: usize = 256;

/// A single ballot naming a code, with the position it gave the code.
#[derive(Debug, Clone, Copy)]
pub struct CodeMention<'a> {
    pub vote: &'a StrategyVote,
    pub result: &'a ClassificationResult,
    /// 0-based index within the ballot's ranked results.
    pub rank: usize,
}

/// Every mention of one `(code, code_type)` across the batch.
#[derive(Debug, Clone)]
pub struct CodeVoteAggregation<'a> {
    pub code: &'a IndustryCode,
    pub mentions: Vec<CodeMention<'a>>,
    pub total_votes: usize,
    pub average_confidence: f64,
    pub confidence_variance: f64,
    pub agreement_score: f64,
}

pub type AggregationMap<'a> = BTreeMap<CodeKey, CodeVoteAggregation<'a>>;

impl<'a> CodeVoteAggregation<'a> {
    fn new(code: &'a IndustryCode) -> Self {
        Self {
            code,
            mentions: Vec::new(),
            total_votes: 0,
            average_confidence: 0.0,
            confidence_variance: 0.0,
            agreement_score: 0.0,
        }
    }

    fn compute_statistics(&mut self) {
        let confidences: Vec<f64> = self.mentions.iter().map(|m| m.result.confidence).collect();

        self.average_confidence = calculate_mean(&confidences);
        self.confidence_variance = calculate_variance(&confidences, self.average_confidence);
        self.agreement_score = if self.confidence_variance == 0.0 {
            1.0
        } else {
            coefficient_of_variation(&confidences)
                .map(|cv| (1.0 / (1.0 + cv)).clamp(0.0, 1.0))
                .unwrap_or(0.0)
        };
    }

    /// Distinct strategies that named this code, in first-mention order.
    pub fn voters(&self) -> Vec<&'a str> {
        let mut names: Vec<&'a str> = Vec::with_capacity(self.mentions.len());
        for mention in &self.mentions {
            let name = mention.vote.strategy_name.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn voter_count(&self) -> usize {
        self.voters().len()
    }

    /// One mention per voter: the best (lowest) rank that voter gave the code.
    pub fn distinct_mentions(&self) -> Vec<CodeMention<'a>> {
        let mut best: Vec<CodeMention<'a>> = Vec::with_capacity(self.mentions.len());
        for mention in &self.mentions {
            match best
                .iter_mut()
                .find(|m| m.vote.strategy_name == mention.vote.strategy_name)
            {
                Some(existing) if mention.rank < existing.rank => *existing = *mention,
                Some(_) => {}
                None => best.push(*mention),
            }
        }
        best
    }
}

/// Groups every ballot's candidates by code identity.
///
/// A ballot listing the same code twice contributes two mentions.
pub fn aggregate_votes_by_code<'a>(votes: &[&'a StrategyVote]) -> AggregationMap<'a> {
    let mut aggregations: AggregationMap<'a> = BTreeMap::new();

    for vote in votes.iter().copied() {
        for (rank, result) in vote.results.iter().enumerate() {
            let entry = aggregations
                .entry(result.code.key())
                .or_insert_with(|| CodeVoteAggregation::new(&result.code));

            entry.mentions.push(CodeMention { vote, result, rank });
            entry.total_votes += 1;
        }
    }

    if aggregations.len() >= PARALLEL_STATS_THRESHOLD {
        tracing::debug!(
            "Computing statistics for {} codes in parallel",
            aggregations.len()
        );
        aggregations
            .par_iter_mut()
            .for_each(|(_, agg)| agg.compute_statistics());
    } else {
        aggregations
            .values_mut()
            .for_each(|agg| agg.compute_statistics());
    }

    aggregations
}
